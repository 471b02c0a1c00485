use crate::component::capture::ContainerFile;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use log::{debug, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 單一模組的輸入資料夾
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDirectory {
    pub module: u32,
    pub name: String,
    pub path: PathBuf,
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// 列出輸入資料夾下的模組子資料夾（依名稱排序）
///
/// 模組編號取資料夾名稱結尾的數字，沒有數字時使用排序後的位置（從 1 起算），
/// 編號必須落在 `1..=module_count` 且不可重複
pub fn scan_module_directories(
    input_dir: &Path,
    module_count: u32,
) -> Result<Vec<ModuleDirectory>> {
    let trailing_number = Regex::new(r"(\d+)$").context("無效的模組編號規則")?;

    let entries: Vec<(String, PathBuf)> = WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| {
            (
                entry.file_name().to_string_lossy().to_string(),
                entry.into_path(),
            )
        })
        .filter(|(name, _)| !is_hidden(name))
        .collect();

    let mut seen: BTreeMap<u32, String> = BTreeMap::new();
    let mut modules = Vec::with_capacity(entries.len());

    for (position, (name, path)) in entries.into_iter().enumerate() {
        let module = trailing_number
            .captures(&name)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .unwrap_or_else(|| u32::try_from(position + 1).unwrap_or(u32::MAX));

        if module == 0 || module > module_count {
            return Err(ConfigError::ModuleOutOfRange {
                name,
                id: module,
                max: module_count,
            }
            .into());
        }

        if let Some(first) = seen.insert(module, name.clone()) {
            return Err(ConfigError::DuplicateModule {
                id: module,
                first,
                second: name,
            }
            .into());
        }

        debug!("模組 {module}: {}", path.display());
        modules.push(ModuleDirectory { module, name, path });
    }

    if modules.len() < module_count as usize && !modules.is_empty() {
        warn!(
            "只找到 {} 個模組資料夾，預期 {module_count} 個；缺少的模組會讓所有序列被隔離",
            modules.len()
        );
    }

    Ok(modules)
}

/// 依模組順序、模組內檔名順序列出所有容器檔
pub fn scan_container_files(
    modules: &[ModuleDirectory],
    container_extension: &str,
) -> Vec<ContainerFile> {
    let wanted = container_extension.to_lowercase();

    modules
        .iter()
        .flat_map(|module| {
            WalkDir::new(&module.path)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .filter(|entry| !is_hidden(&entry.file_name().to_string_lossy()))
                .filter(|entry| {
                    entry
                        .path()
                        .extension()
                        .is_some_and(|ext| ext.to_string_lossy().to_lowercase() == wanted)
                })
                .map(|entry| ContainerFile::new(entry.into_path(), module.module))
        })
        .collect()
}
