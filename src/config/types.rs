use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_WORKERS: usize = 1;
pub const DEFAULT_MODULES: u32 = 9;
pub const DEFAULT_EXTENSION: &str = "jp4";
pub const DEFAULT_CONTAINER_EXTENSION: &str = "mov";
pub const DEFAULT_LANGUAGE: &str = "zh-TW";

/// 擷取中的影像先放在輸出資料夾下的這個工作目錄
pub const WORKING_DIR_NAME: &str = "extracted";

/// 執行模式（每次執行只能擇一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Extract,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Debug,
}

/// 設定檔內容，所有欄位皆可省略
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub quarantine_dir: Option<PathBuf>,
    pub workers: Option<usize>,
    pub modules: Option<u32>,
    pub mode: Option<RunMode>,
    pub max_files_per_dir: Option<usize>,
    pub geo_index_base_url: Option<String>,
    pub file_list: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub debug: Option<bool>,
    pub quiet: Option<bool>,
    pub no_color: Option<bool>,
    pub skip_filtering: Option<bool>,
    pub extension: Option<String>,
    pub container_extension: Option<String>,
    pub language: Option<String>,
}

/// 驗證後的執行設定
#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub quarantine_dir: PathBuf,
    pub workers: usize,
    pub modules: u32,
    pub mode: RunMode,
    /// `None` 表示每個資料夾不限檔案數
    pub max_files_per_dir: Option<usize>,
    pub geo_index_base_url: Option<String>,
    pub file_list: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub verbosity: Verbosity,
    pub no_color: bool,
    pub skip_filtering: bool,
    pub extension: String,
    pub container_extension: String,
    /// 終端輸出的語系（對應 `locales/` 下的檔名）
    pub language: String,
}

impl Config {
    /// 以預設值建立設定，其餘欄位可直接修改
    #[must_use]
    pub fn new(input_dir: &Path, output_dir: &Path, quarantine_dir: &Path) -> Self {
        Self {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            quarantine_dir: quarantine_dir.to_path_buf(),
            workers: DEFAULT_WORKERS,
            modules: DEFAULT_MODULES,
            mode: RunMode::default(),
            max_files_per_dir: None,
            geo_index_base_url: None,
            file_list: None,
            log_file: None,
            verbosity: Verbosity::default(),
            no_color: false,
            skip_filtering: false,
            extension: DEFAULT_EXTENSION.to_string(),
            container_extension: DEFAULT_CONTAINER_EXTENSION.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    #[must_use]
    pub fn working_dir(&self) -> PathBuf {
        self.output_dir.join(WORKING_DIR_NAME)
    }
}
