//! 序列完整性驗證元件
//!
//! 依拍攝瞬間分組，缺少任何模組的序列整組隔離

mod validator;

pub use validator::{SequenceGroup, SequenceValidator, ValidationOutcome, group_by_sequence};
