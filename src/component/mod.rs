//! 功能元件模組
//!
//! 每個子模組實現拆分流程中的一個階段

pub mod capture;
pub mod container_extractor;
pub mod job_scheduler;
pub mod mov_splitter;
pub mod rearranger;
pub mod sequence_validator;

pub use mov_splitter::MovSplitter;
