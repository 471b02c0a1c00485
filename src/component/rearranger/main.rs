use crate::component::capture::{ExtractedImage, directory_name};
use crate::error::PipelineError;
use crate::tools::{ensure_directory_exists, move_replacing};
use anyhow::Result;
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 把上限進位到模組數的倍數，同一拍攝瞬間的影像不會被拆到兩個資料夾
#[must_use]
pub fn files_per_directory(limit: Option<usize>, module_count: u32) -> Option<usize> {
    let modules = (module_count as usize).max(1);
    limit
        .filter(|&l| l > 0)
        .map(|l| l.div_ceil(modules) * modules)
}

/// 計算每張影像的目標資料夾編號
///
/// 影像需已依時間排序。只在序列邊界換資料夾：
/// 目前資料夾放不下下一整組時才換到新資料夾
#[must_use]
pub fn plan_directories(
    images: &[ExtractedImage],
    files_per_dir: Option<usize>,
) -> Vec<Option<usize>> {
    let Some(limit) = files_per_dir else {
        return vec![None; images.len()];
    };

    let mut plan = Vec::with_capacity(images.len());
    let mut index = 0;
    let mut in_directory = 0;

    for group in images.chunk_by(|a, b| a.key == b.key) {
        if in_directory > 0 && in_directory + group.len() > limit {
            index += 1;
            in_directory = 0;
        }
        in_directory += group.len();
        plan.extend(std::iter::repeat_n(Some(index), group.len()));
    }

    plan
}

#[derive(Debug, Default)]
pub struct RearrangeOutcome {
    /// 最終位置的影像，依時間排序
    pub images: Vec<ExtractedImage>,
    /// 建立的編號子資料夾數量
    pub directories: usize,
    pub errors: usize,
}

pub struct Rearranger {
    source_root: PathBuf,
    output_root: PathBuf,
    files_per_dir: Option<usize>,
    shutdown_signal: Arc<AtomicBool>,
}

impl Rearranger {
    #[must_use]
    pub fn new(
        source_root: &Path,
        output_root: &Path,
        max_files_per_dir: Option<usize>,
        module_count: u32,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source_root: source_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            files_per_dir: files_per_directory(max_files_per_dir, module_count),
            shutdown_signal,
        }
    }

    #[must_use]
    pub const fn files_per_dir(&self) -> Option<usize> {
        self.files_per_dir
    }

    pub fn rearrange(&self, images: Vec<ExtractedImage>) -> Result<RearrangeOutcome> {
        ensure_directory_exists(&self.output_root)?;

        let plan = plan_directories(&images, self.files_per_dir);
        let mut created = BTreeSet::new();
        let mut outcome = RearrangeOutcome::default();

        for (image, directory_index) in images.into_iter().zip(plan) {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                return Err(PipelineError::Interrupted.into());
            }

            if let Some(index) = directory_index
                && created.insert(index)
            {
                ensure_directory_exists(&self.output_root.join(directory_name(index)))?;
            }

            let source = image.path_in(&self.source_root);
            let placed = ExtractedImage {
                directory_index,
                ..image
            };
            let destination = placed.path_in(&self.output_root);

            match move_replacing(&source, &destination) {
                Ok(()) => {
                    debug!("{} -> {}", source.display(), destination.display());
                    outcome.images.push(placed);
                }
                Err(e) => {
                    error!("移動失敗 {}: {e:#}", source.display());
                    outcome.errors += 1;
                }
            }
        }

        outcome.directories = created.len();

        info!(
            "重新排列完成 - 檔案: {}, 子資料夾: {}, 錯誤: {}",
            outcome.images.len(),
            outcome.directories,
            outcome.errors
        );

        Ok(outcome)
    }
}
