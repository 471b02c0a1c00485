//! 測試用的容器檔產生器
//!
//! 產生帶有最小 EXIF 區段的 JPEG，再串接成容器檔

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const ENTRY_SIZE: u32 = 12;

fn push_entry(tiff: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: [u8; 4]) {
    tiff.extend_from_slice(&tag.to_be_bytes());
    tiff.extend_from_slice(&kind.to_be_bytes());
    tiff.extend_from_slice(&count.to_be_bytes());
    tiff.extend_from_slice(&value);
}

/// 大端序 TIFF，DateTime 與次秒序號都放在資料區
fn tiff_block(date_time: &str, subsecond: &str) -> Vec<u8> {
    let date = format!("{date_time}\0");
    let sub = format!("{subsecond:<4}\0").replace(' ', "\0");
    let date_len = u32::try_from(date.len()).unwrap();
    let sub_len = u32::try_from(sub.len()).unwrap();

    let ifd0: u32 = 8;
    let date_offset = ifd0 + 2 + 2 * ENTRY_SIZE + 4;
    let exif_ifd = date_offset + date_len;
    let sub_offset = exif_ifd + 2 + ENTRY_SIZE + 4;

    let mut tiff = b"MM\0\x2A".to_vec();
    tiff.extend_from_slice(&ifd0.to_be_bytes());

    tiff.extend_from_slice(&2u16.to_be_bytes());
    push_entry(&mut tiff, 0x0132, 2, date_len, date_offset.to_be_bytes());
    push_entry(&mut tiff, 0x8769, 4, 1, exif_ifd.to_be_bytes());
    tiff.extend_from_slice(&0u32.to_be_bytes());
    tiff.extend_from_slice(date.as_bytes());

    tiff.extend_from_slice(&1u16.to_be_bytes());
    push_entry(&mut tiff, 0x9291, 2, sub_len, sub_offset.to_be_bytes());
    tiff.extend_from_slice(&0u32.to_be_bytes());
    tiff.extend_from_slice(sub.as_bytes());
    tiff
}

/// 以 epoch 秒產生 EXIF 日期字串（UTC）
pub fn exif_date(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .unwrap()
        .naive_utc()
        .format("%Y:%m:%d %H:%M:%S")
        .to_string()
}

/// 帶 EXIF 的內嵌影像
pub fn exif_image(timestamp: i64, subsecond: &str) -> Vec<u8> {
    let tiff = tiff_block(&exif_date(timestamp), subsecond);

    let mut image = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let length = u16::try_from(2 + EXIF_HEADER.len() + tiff.len()).unwrap();
    image.extend_from_slice(&length.to_be_bytes());
    image.extend_from_slice(EXIF_HEADER);
    image.extend(tiff);
    image.extend_from_slice(&[0x11; 64]);
    image.extend_from_slice(&[0xFF, 0xD9]);
    image
}

/// 有起始標記但 EXIF 損毀的內嵌影像
pub fn corrupt_image() -> Vec<u8> {
    let mut image = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x08];
    image.extend_from_slice(b"broken");
    image.extend_from_slice(&[0x22; 32]);
    image
}

/// 容器檔內容：前置資料 + 依序串接的影像
pub fn container(images: &[Vec<u8>]) -> Vec<u8> {
    let mut buffer = b"\0\0\0\x14ftypqt  header".to_vec();
    for image in images {
        buffer.extend_from_slice(image);
    }
    buffer
}

/// 在 `input/<module>/<name>` 寫出容器檔
pub fn write_container(input: &Path, module: u32, name: &str, images: &[Vec<u8>]) -> PathBuf {
    let module_dir = input.join(module.to_string());
    fs::create_dir_all(&module_dir).unwrap();
    let path = module_dir.join(name);
    fs::write(&path, container(images)).unwrap();
    path
}

/// 所有模組都拍到相同的瞬間
pub fn write_synchronized_rig(input: &Path, modules: u32, moments: &[(i64, &str)]) {
    for module in 1..=modules {
        let images: Vec<Vec<u8>> = moments
            .iter()
            .map(|(timestamp, subsecond)| exif_image(*timestamp, subsecond))
            .collect();
        write_container(input, module, "clip_0001.mov", &images);
    }
}

/// 遞迴列出資料夾下的檔案（相對路徑，以 `/` 分隔並排序）
pub fn list_files(root: &Path) -> Vec<String> {
    if !root.exists() {
        return Vec::new();
    }

    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    files.sort();
    files
}
