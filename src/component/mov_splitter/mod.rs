//! 容器檔拆分流程
//!
//! 探索容器檔 → 平行擷取 → 序列驗證 → 重新排列 → 輸出最終清單

mod main;
mod report;

pub use main::MovSplitter;
pub use report::{ExtractionReport, RunReport};
