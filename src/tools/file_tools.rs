//! 檔案寫入與搬移
//!
//! 寫入一律先寫暫存檔再 rename，中斷時不會留下截斷的影像

use anyhow::{Context, Result, bail};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const PARTIAL_SUFFIX: &str = "part";

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    destination.with_file_name(name)
}

/// 整塊寫入：先寫到 `<name>.part`，完成後 rename 成目標檔名
pub fn write_atomically(destination: &Path, bytes: &[u8]) -> Result<()> {
    let partial = partial_path(destination);

    fs::write(&partial, bytes)
        .with_context(|| format!("無法寫入檔案: {}", partial.display()))?;

    if let Err(e) = fs::rename(&partial, destination) {
        let _ = fs::remove_file(&partial);
        return Err(e).with_context(|| format!("無法完成寫入: {}", destination.display()));
    }

    Ok(())
}

/// 搬移檔案，目標已存在時以來源取代（重複執行結果相同）
///
/// 來源不存在時直接回傳錯誤，不會動到目標檔。
/// rename 無法覆蓋既有目標時才先移除目標；仍失敗（例如跨檔案系統）則改用複製後刪除
pub fn move_replacing(source: &Path, destination: &Path) -> Result<()> {
    if !source.is_file() {
        bail!("來源檔案不存在: {}", source.display());
    }

    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }

    match fs::remove_file(destination) {
        Ok(()) => debug!("移除既有目標檔: {}", destination.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e)
                .with_context(|| format!("無法移除既有檔案: {}", destination.display()));
        }
    }

    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }

    copy_and_delete(source, destination)
}

fn copy_and_delete(source: &Path, destination: &Path) -> Result<()> {
    let bytes =
        fs::read(source).with_context(|| format!("無法讀取檔案: {}", source.display()))?;
    write_atomically(destination, &bytes)?;
    fs::remove_file(source).with_context(|| format!("刪除原檔案失敗: {}", source.display()))?;
    Ok(())
}

/// 由深到淺刪除空資料夾（含根目錄），非空的資料夾保留
pub fn remove_empty_directories(root: &Path) {
    for entry in WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_dir())
    {
        if fs::remove_dir(entry.path()).is_ok() {
            debug!("移除空資料夾: {}", entry.path().display());
        }
    }
}
