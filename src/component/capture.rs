//! 拍攝資料模型
//!
//! 容器檔、擷取出的影像，以及用來把同一拍攝瞬間的影像分組的序列鍵

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

/// 單一模組的容器檔（啟動時探索一次，之後不再變動）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerFile {
    pub path: PathBuf,
    pub module: u32,
}

impl ContainerFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, module: u32) -> Self {
        Self {
            path: path.into(),
            module,
        }
    }

    /// 檔名（不含副檔名），用於組合隔離檔名
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// 檔名連同副檔名（以 `_` 取代 `.`），`a.mov` 與 `a.MOV` 不會撞名
    #[must_use]
    pub fn label(&self) -> String {
        match self.path.extension() {
            Some(ext) => format!("{}_{}", self.stem(), ext.to_string_lossy()),
            None => self.stem(),
        }
    }
}

/// 拍攝瞬間：epoch 秒 + 次秒序號
///
/// 次秒序號保留原始數字字串（前導零有意義），比較時視為小數部分
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceKey {
    pub timestamp: i64,
    pub subsecond: String,
}

impl SequenceKey {
    #[must_use]
    pub fn new(timestamp: i64, subsecond: impl Into<String>) -> Self {
        Self {
            timestamp,
            subsecond: subsecond.into(),
        }
    }
}

impl Ord for SequenceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| compare_fraction(&self.subsecond, &other.subsecond))
    }
}

impl PartialOrd for SequenceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.timestamp, self.subsecond)
    }
}

/// "5" 與 "50" 同為 0.5 秒，補零後相等時再以原字串排序
fn compare_fraction(a: &str, b: &str) -> Ordering {
    let width = a.len().max(b.len());
    format!("{a:0<width$}")
        .cmp(&format!("{b:0<width$}"))
        .then_with(|| a.cmp(b))
}

/// 編號子資料夾名稱
#[must_use]
pub fn directory_name(index: usize) -> String {
    format!("{index:04}")
}

/// 擷取出的單張影像
///
/// 位置一律由 `(root, directory_index, file_name)` 推導，
/// 同一個 `(key, module)` 在整個流程中只會存在一份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    pub key: SequenceKey,
    pub module: u32,
    /// 所在的編號子資料夾，`None` 表示直接位於根目錄
    pub directory_index: Option<usize>,
    /// 產生此影像的工作槽位
    pub worker_slot: Option<usize>,
    pub extension: String,
}

impl ExtractedImage {
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.{}",
            self.key.timestamp, self.key.subsecond, self.module, self.extension
        )
    }

    /// 相對於根目錄的路徑，一律以 `/` 分隔
    #[must_use]
    pub fn relative_path(&self) -> String {
        match self.directory_index {
            Some(index) => format!("{}/{}", directory_name(index), self.file_name()),
            None => self.file_name(),
        }
    }

    #[must_use]
    pub fn path_in(&self, root: &Path) -> PathBuf {
        match self.directory_index {
            Some(index) => root.join(directory_name(index)).join(self.file_name()),
            None => root.join(self.file_name()),
        }
    }

    /// 時間優先、模組其次的排序
    pub fn sort_chronologically(images: &mut [Self]) {
        images.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.module.cmp(&b.module)));
    }
}
