//! 拍攝資訊讀取
//!
//! 從內嵌 JPEG 的 EXIF 區段取出拍攝時間與次秒序號。
//! 只讀取命名所需的標籤，不解碼影像內容

use crate::error::MetadataError;
use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use std::io::Cursor;

const DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// 單張影像的拍攝資訊
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureMetadata {
    /// UTC epoch 秒
    pub timestamp: i64,
    pub subsecond: String,
}

/// 拍攝資訊讀取器
///
/// 需可跨執行緒共用，每個工作都會呼叫
pub trait MetadataReader: Send + Sync {
    fn read(&self, image: &[u8]) -> Result<CaptureMetadata, MetadataError>;
}

/// 預設的 EXIF 讀取器
///
/// 拍攝時間取 `DateTime`（沒有時改用 `DateTimeOriginal`），
/// 次秒序號取 `SubSecTimeOriginal`（沒有時改用 `SubSecTime`）
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifReader;

impl MetadataReader for ExifReader {
    fn read(&self, image: &[u8]) -> Result<CaptureMetadata, MetadataError> {
        let exif = Reader::new()
            .read_from_container(&mut Cursor::new(image))
            .map_err(|e| match e {
                exif::Error::NotFound(_) => MetadataError::NoExifSegment,
                other => MetadataError::MalformedExif(other.to_string()),
            })?;

        let date_time = first_ascii(&exif, &[Tag::DateTime, Tag::DateTimeOriginal])
            .ok_or(MetadataError::MissingTag("DateTime"))?;
        let subsecond = first_ascii(&exif, &[Tag::SubSecTimeOriginal, Tag::SubSecTime])
            .ok_or(MetadataError::MissingTag("SubSecTimeOriginal"))?;

        if subsecond.is_empty() || !subsecond.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MetadataError::InvalidSubsecond(subsecond));
        }

        let timestamp = NaiveDateTime::parse_from_str(&date_time, DATE_FORMAT)
            .map_err(|_| MetadataError::InvalidDateTime(date_time.clone()))?
            .and_utc()
            .timestamp();

        Ok(CaptureMetadata {
            timestamp,
            subsecond,
        })
    }
}

/// 依序找第一個存在的 ASCII 標籤
fn first_ascii(exif: &Exif, tags: &[Tag]) -> Option<String> {
    tags.iter().find_map(|&tag| {
        let field = exif.get_field(tag, In::PRIMARY)?;
        match &field.value {
            Value::Ascii(strings) => strings
                .first()
                .map(|text| String::from_utf8_lossy(text).trim().to_string()),
            _ => None,
        }
    })
}
