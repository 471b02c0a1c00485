use clap::Parser;
use std::path::PathBuf;

/// 從多模組相機的容器檔拆出內嵌影像，驗證序列完整性並重新排列
#[derive(Parser, Debug, Default)]
#[command(name = "mov_splitter")]
#[command(version)]
pub struct Cli {
    /// 輸入資料夾（每個模組一個子資料夾）
    pub input: Option<PathBuf>,

    /// 輸出資料夾
    pub output: Option<PathBuf>,

    /// 隔離資料夾（不完整序列與無法解析的影像）
    pub quarantine: Option<PathBuf>,

    /// 設定檔（JSON），命令列參數優先
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 同時執行的工作數量
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// 相機模組數量
    #[arg(short, long)]
    pub modules: Option<u32>,

    /// 只統計內嵌影像數量與大小，不擷取
    #[arg(long)]
    pub count: bool,

    /// 每個輸出子資料夾的檔案上限（0 表示不限制）
    #[arg(short = 'l', long)]
    pub max_files_per_dir: Option<usize>,

    /// 產生索引清單時使用的基礎 URL
    #[arg(long)]
    pub geo_index_base_url: Option<String>,

    /// 輸出最終檔案路徑清單
    #[arg(long)]
    pub file_list: Option<PathBuf>,

    /// 日誌檔路徑
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// 顯示除錯訊息
    #[arg(short, long)]
    pub debug: bool,

    /// 只顯示警告與錯誤
    #[arg(short, long)]
    pub quiet: bool,

    /// 停用色彩輸出
    #[arg(long)]
    pub no_color: bool,

    /// 跳過序列完整性檢查
    #[arg(long)]
    pub skip_filtering: bool,

    /// 輸出影像副檔名
    #[arg(long)]
    pub extension: Option<String>,

    /// 容器檔副檔名
    #[arg(long)]
    pub container_extension: Option<String>,

    /// 終端輸出語系（zh-TW、en-US）
    #[arg(long)]
    pub language: Option<String>,
}
