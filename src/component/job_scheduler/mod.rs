//! 工作排程元件
//!
//! 固定數量的工作槽位、依序派工、單一收集者合併結果

mod collector;
mod scheduler;
mod slot_table;

pub use collector::CollectorReport;
pub use scheduler::{Accumulate, JobOutcome, JobScheduler, SchedulerReport};
pub use slot_table::SlotTable;
