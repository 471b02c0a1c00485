//! 重新排列元件
//!
//! 將驗證後的影像移到最終輸出位置，可選擇依檔案上限切分成編號子資料夾

mod main;

pub use main::{RearrangeOutcome, Rearranger, files_per_directory, plan_directories};
