//! 錯誤類型
//!
//! 只有 `ConfigError` 會在開始工作前中止執行；其餘狀況都在發生的層級被吸收並記錄

use std::path::PathBuf;
use thiserror::Error;

/// 設定錯誤（致命，在任何工作開始前回報）
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("缺少必要路徑: {0}")]
    MissingPath(&'static str),

    #[error("輸入路徑不存在: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("輸入路徑不是資料夾: {}", .0.display())]
    InputNotDirectory(PathBuf),

    #[error("輸出資料夾與隔離資料夾不可相同: {}", .0.display())]
    OutputEqualsQuarantine(PathBuf),

    #[error("模組數量必須大於 0")]
    ZeroModules,

    #[error("工作執行緒數量必須大於 0")]
    ZeroWorkers,

    #[error("--debug 與 --quiet 不可同時使用")]
    ConflictingVerbosity,

    #[error("副檔名不可為空: {0}")]
    EmptyExtension(&'static str),

    #[error("模組資料夾 {name} 的編號 {id} 超出範圍 1..={max}")]
    ModuleOutOfRange { name: String, id: u32, max: u32 },

    #[error("模組編號 {id} 重複: {first} 與 {second}")]
    DuplicateModule {
        id: u32,
        first: String,
        second: String,
    },

    #[error("無法讀取設定檔 {}: {reason}", path.display())]
    SettingsFile { path: PathBuf, reason: String },
}

/// 管線層級的終止狀況
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("找不到任何模組或容器檔，沒有可處理的工作: {}", .0.display())]
    NothingToDo(PathBuf),

    #[error("執行已被中斷")]
    Interrupted,
}

/// 內嵌影像的拍攝資訊無法解析
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("找不到 EXIF 區段")]
    NoExifSegment,

    #[error("EXIF 結構損毀: {0}")]
    MalformedExif(String),

    #[error("缺少標籤: {0}")]
    MissingTag(&'static str),

    #[error("無法解析拍攝時間: {0}")]
    InvalidDateTime(String),

    #[error("無法解析次秒序號: {0}")]
    InvalidSubsecond(String),
}
