use super::result::ContainerCount;
use super::scanner::{IMAGE_MARKER, find_markers, split_spans};
use crate::component::capture::ContainerFile;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;

/// 統計容器檔內嵌影像的數量與總大小，不寫入任何檔案
pub fn count_container(container: &ContainerFile, _worker_slot: usize) -> Result<ContainerCount> {
    let buffer = fs::read(&container.path)
        .with_context(|| format!("無法讀取容器檔: {}", container.path.display()))?;

    let offsets = find_markers(&buffer, &IMAGE_MARKER);
    if offsets.is_empty() {
        warn!("容器檔中找不到任何內嵌影像: {}", container.path.display());
    }

    let bytes: u64 = split_spans(buffer.len(), &offsets)
        .iter()
        .map(|span| span.len() as u64)
        .sum();

    debug!(
        "{}: {} 張影像, {} bytes",
        container.path.display(),
        offsets.len(),
        bytes
    );

    Ok(ContainerCount {
        module: container.module,
        images: offsets.len(),
        bytes,
    })
}
