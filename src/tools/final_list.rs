//! 最終清單輸出
//!
//! 路徑清單（每行一個相對路徑）與交給地理索引使用的 JSON 清單

use super::file_tools::write_atomically;
use crate::component::capture::ExtractedImage;
use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const INDEX_MANIFEST_NAME: &str = "index.json";

#[derive(Debug, Serialize)]
struct IndexEntry<'a> {
    path: String,
    url: String,
    timestamp: i64,
    subsecond: &'a str,
    module: u32,
    directory: Option<usize>,
}

#[derive(Debug, Serialize)]
struct IndexManifest<'a> {
    base_url: &'a str,
    generated_at: String,
    images: Vec<IndexEntry<'a>>,
}

/// 寫出路徑清單，路徑相對於輸出根目錄
pub fn write_path_list(path: &Path, images: &[ExtractedImage]) -> Result<()> {
    let mut content = String::new();
    for image in images {
        content.push_str(&image.relative_path());
        content.push('\n');
    }

    write_atomically(path, content.as_bytes())?;
    info!("已寫出路徑清單 ({} 筆): {}", images.len(), path.display());
    Ok(())
}

/// 寫出索引清單，依傳入順序列出每張影像及其 URL
pub fn write_index_manifest(
    output_root: &Path,
    base_url: &str,
    images: &[ExtractedImage],
) -> Result<PathBuf> {
    let base = base_url.trim_end_matches('/');
    let manifest = IndexManifest {
        base_url: base,
        generated_at: Utc::now().to_rfc3339(),
        images: images
            .iter()
            .map(|image| {
                let path = image.relative_path();
                IndexEntry {
                    url: format!("{base}/{path}"),
                    path,
                    timestamp: image.key.timestamp,
                    subsecond: &image.key.subsecond,
                    module: image.module,
                    directory: image.directory_index,
                }
            })
            .collect(),
    };

    let content = serde_json::to_string_pretty(&manifest).context("無法序列化索引清單")?;
    let destination = output_root.join(INDEX_MANIFEST_NAME);
    write_atomically(&destination, content.as_bytes())?;

    info!("已寫出索引清單: {}", destination.display());
    Ok(destination)
}
