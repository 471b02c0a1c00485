use super::metadata_reader::{CaptureMetadata, MetadataReader};
use super::result::ExtractionJobResult;
use super::rollover::{DirectoryRollover, SharedRollover};
use super::scanner::{IMAGE_MARKER, find_markers, split_spans};
use crate::component::capture::{ContainerFile, ExtractedImage, SequenceKey, directory_name};
use crate::tools::{ensure_directory_exists, write_atomically};
use anyhow::{Context, Result};
use log::{debug, error, warn};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// 隔離檔名前綴：拍攝資訊無法解析
const UNPARSED_PREFIX: &str = "unparsed";
/// 隔離檔名前綴：同一模組、同一拍攝瞬間已有影像
const DUPLICATE_PREFIX: &str = "duplicate";
/// 隔離檔名前綴：無法寫入工作目錄
const UNWRITABLE_PREFIX: &str = "unwritable";

/// 從容器檔拆出內嵌影像並寫入工作目錄
///
/// 拍攝資訊無法解析、重複或寫不進工作目錄的影像以流水號命名後放進隔離資料夾，
/// 不會讓工作失敗。每個 `(拍攝瞬間, 模組)` 只有第一個取得的影像會寫入工作目錄
pub struct ImageExtractor {
    working_dir: PathBuf,
    quarantine_dir: PathBuf,
    extension: String,
    reader: Arc<dyn MetadataReader>,
    rollover: Option<SharedRollover>,
    claimed: Mutex<HashSet<(SequenceKey, u32)>>,
}

impl ImageExtractor {
    #[must_use]
    pub fn new(
        working_dir: PathBuf,
        quarantine_dir: PathBuf,
        extension: impl Into<String>,
        reader: Arc<dyn MetadataReader>,
    ) -> Self {
        Self {
            working_dir,
            quarantine_dir,
            extension: extension.into(),
            reader,
            rollover: None,
            claimed: Mutex::new(HashSet::new()),
        }
    }

    /// 設定每個工作子資料夾的檔案上限
    #[must_use]
    pub fn with_directory_limit(mut self, limit: Option<usize>) -> Self {
        self.rollover = limit.filter(|&l| l > 0).map(SharedRollover::new);
        self
    }

    #[must_use]
    pub fn rollover(&self) -> Option<DirectoryRollover> {
        self.rollover.as_ref().map(SharedRollover::snapshot)
    }

    /// 處理一個容器檔
    ///
    /// 只有讀取容器檔失敗會回傳錯誤；單一區段寫入失敗只計入失敗數，
    /// 已寫出的影像一律留在結果中
    pub fn extract(
        &self,
        container: &ContainerFile,
        worker_slot: usize,
    ) -> Result<ExtractionJobResult> {
        let buffer = fs::read(&container.path)
            .with_context(|| format!("無法讀取容器檔: {}", container.path.display()))?;

        let mut result = ExtractionJobResult::for_worker(worker_slot);
        let offsets = find_markers(&buffer, &IMAGE_MARKER);

        if offsets.is_empty() {
            warn!("容器檔中找不到任何內嵌影像: {}", container.path.display());
            return Ok(result);
        }

        for (index, span) in split_spans(buffer.len(), &offsets).into_iter().enumerate() {
            let bytes = &buffer[span];
            let stored = match self.reader.read(bytes) {
                Ok(metadata) => {
                    self.store_image(container, metadata, bytes, worker_slot, &mut result)
                }
                Err(reason) => {
                    warn!(
                        "無法解析拍攝資訊 ({reason})，區段 #{index}: {}",
                        container.path.display()
                    );
                    self.quarantine_span(container, UNPARSED_PREFIX, bytes, &mut result)
                }
            };

            if let Err(e) = stored {
                error!(
                    "無法寫出區段 #{index} ({}): {e:#}",
                    container.path.display()
                );
                if let Err(e) =
                    self.quarantine_span(container, UNWRITABLE_PREFIX, bytes, &mut result)
                {
                    error!("隔離也失敗，捨棄區段 #{index}: {e:#}");
                    result.failure_count += 1;
                }
            }
        }

        debug!(
            "擷取完成 [槽位 {worker_slot}] {}: 成功 {}, 失敗 {}",
            container.path.display(),
            result.success_count,
            result.failure_count
        );

        Ok(result)
    }

    /// 登記 `(拍攝瞬間, 模組)`，已被其他區段取得時回傳 `false`
    fn claim(&self, key: &SequenceKey, module: u32) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((key.clone(), module))
    }

    fn store_image(
        &self,
        container: &ContainerFile,
        metadata: CaptureMetadata,
        bytes: &[u8],
        worker_slot: usize,
        result: &mut ExtractionJobResult,
    ) -> Result<()> {
        let key = SequenceKey::new(metadata.timestamp, metadata.subsecond);
        if !self.claim(&key, container.module) {
            warn!(
                "重複的影像 {key} (模組 {}): {}",
                container.module,
                container.path.display()
            );
            return self.quarantine_span(container, DUPLICATE_PREFIX, bytes, result);
        }

        let directory_index = self.rollover.as_ref().map(|shared| {
            let state = shared.place();
            result.rollover = Some(state);
            state.index()
        });

        if let Some(index) = directory_index {
            ensure_directory_exists(&self.working_dir.join(directory_name(index)))?;
        }

        let image = ExtractedImage {
            key,
            module: container.module,
            directory_index,
            worker_slot: Some(worker_slot),
            extension: self.extension.clone(),
        };

        write_atomically(&image.path_in(&self.working_dir), bytes)?;
        result.images.push(image);
        result.success_count += 1;
        Ok(())
    }

    /// 以 `<前綴>_m<模組>_<容器檔>_<流水號>` 寫進隔離資料夾，成功才計入失敗數
    fn quarantine_span(
        &self,
        container: &ContainerFile,
        prefix: &str,
        bytes: &[u8],
        result: &mut ExtractionJobResult,
    ) -> Result<()> {
        let name = format!(
            "{prefix}_m{}_{}_{:04}.{}",
            container.module,
            container.label(),
            result.failure_count,
            self.extension
        );
        let destination = self.quarantine_dir.join(&name);

        write_atomically(&destination, bytes)?;
        debug!("隔離為 {name}: {}", container.path.display());
        result.failure_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;
    use tempfile::TempDir;

    /// 測試用讀取器：標記後緊接 `timestamp;subsecond;`，開頭為 `!` 表示損毀
    struct PlainReader;

    impl MetadataReader for PlainReader {
        fn read(&self, image: &[u8]) -> Result<CaptureMetadata, MetadataError> {
            let text = String::from_utf8_lossy(&image[IMAGE_MARKER.len()..]);
            if text.starts_with('!') {
                return Err(MetadataError::NoExifSegment);
            }
            let mut fields = text.split(';');
            let timestamp = fields
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or(MetadataError::MissingTag("DateTime"))?;
            let subsecond = fields
                .next()
                .ok_or(MetadataError::MissingTag("SubSecTimeOriginal"))?;
            Ok(CaptureMetadata {
                timestamp,
                subsecond: subsecond.to_string(),
            })
        }
    }

    fn container_bytes(payloads: &[&str]) -> Vec<u8> {
        let mut buffer = Vec::new();
        for payload in payloads {
            buffer.extend_from_slice(&IMAGE_MARKER);
            buffer.extend_from_slice(payload.as_bytes());
        }
        buffer
    }

    fn setup(temp_dir: &TempDir, payloads: &[&str]) -> (ImageExtractor, ContainerFile) {
        let working = temp_dir.path().join("extracted");
        let quarantine = temp_dir.path().join("trash");
        fs::create_dir_all(&working).unwrap();
        fs::create_dir_all(&quarantine).unwrap();

        let container_path = temp_dir.path().join("cam.mov");
        fs::write(&container_path, container_bytes(payloads)).unwrap();

        let extractor = ImageExtractor::new(working, quarantine, "jp4", Arc::new(PlainReader));
        (extractor, ContainerFile::new(container_path, 3))
    }

    #[test]
    fn test_extracts_named_images() {
        let temp_dir = TempDir::new().unwrap();
        let (extractor, container) = setup(&temp_dir, &["1000;123;", "1001;5;"]);

        let result = extractor.extract(&container, 0).unwrap();

        assert_eq!(result.success_count, 2);
        assert_eq!(result.failure_count, 0);
        assert_eq!(result.worker_slot, Some(0));
        let first = temp_dir.path().join("extracted/1000_123_3.jp4");
        assert!(first.exists());
        assert!(temp_dir.path().join("extracted/1001_5_3.jp4").exists());

        // 區段從標記開始，到下一個標記前結束
        let mut expected = IMAGE_MARKER.to_vec();
        expected.extend_from_slice(b"1000;123;");
        assert_eq!(fs::read(first).unwrap(), expected);
    }

    #[test]
    fn test_unparsed_image_quarantined_with_synthetic_name() {
        let temp_dir = TempDir::new().unwrap();
        let (extractor, container) = setup(&temp_dir, &["1000;123;", "!bad", "!bad again"]);

        let result = extractor.extract(&container, 1).unwrap();

        assert_eq!(result.success_count, 1);
        assert_eq!(result.failure_count, 2);
        assert_eq!(result.images.len(), 1);
        assert!(temp_dir.path().join("trash/unparsed_m3_cam_mov_0000.jp4").exists());
        assert!(temp_dir.path().join("trash/unparsed_m3_cam_mov_0001.jp4").exists());
    }

    #[test]
    fn test_container_without_markers_is_not_failure() {
        let temp_dir = TempDir::new().unwrap();
        let (extractor, container) = setup(&temp_dir, &[]);
        fs::write(&container.path, b"just a header").unwrap();

        let result = extractor.extract(&container, 0).unwrap();
        assert_eq!(result.success_count, 0);
        assert_eq!(result.failure_count, 0);
        assert!(result.images.is_empty());
    }

    #[test]
    fn test_unreadable_container_fails_job() {
        let temp_dir = TempDir::new().unwrap();
        let (extractor, _) = setup(&temp_dir, &[]);
        let missing = ContainerFile::new(temp_dir.path().join("missing.mov"), 1);

        assert!(extractor.extract(&missing, 0).is_err());
    }

    #[test]
    fn test_directory_limit_rolls_over() {
        let temp_dir = TempDir::new().unwrap();
        let (extractor, container) =
            setup(&temp_dir, &["1;0;", "2;0;", "3;0;", "4;0;", "5;0;"]);
        let extractor = extractor.with_directory_limit(Some(2));

        let result = extractor.extract(&container, 0).unwrap();

        let indexes: Vec<Option<usize>> =
            result.images.iter().map(|i| i.directory_index).collect();
        assert_eq!(indexes, vec![Some(0), Some(0), Some(1), Some(1), Some(2)]);
        assert!(temp_dir.path().join("extracted/0002/5_0_3.jp4").exists());

        let state = result.rollover.unwrap();
        assert_eq!(state.limit(), 2);
        assert_eq!(state.index(), 2);
        assert_eq!(extractor.rollover(), Some(state));
    }

    #[test]
    fn test_duplicate_capture_quarantined_once_claimed() {
        let temp_dir = TempDir::new().unwrap();
        let (extractor, first) = setup(&temp_dir, &["1000;1;"]);
        let second_path = temp_dir.path().join("cam2.mov");
        fs::write(&second_path, container_bytes(&["1000;1;", "1001;1;"])).unwrap();
        let second = ContainerFile::new(second_path, 3);

        let kept = extractor.extract(&first, 0).unwrap();
        let result = extractor.extract(&second, 0).unwrap();

        assert_eq!(kept.success_count, 1);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.failure_count, 1);
        assert_eq!(result.images[0].key, SequenceKey::new(1001, "1"));
        assert!(temp_dir.path().join("trash/duplicate_m3_cam2_mov_0000.jp4").exists());

        // 先取得的影像內容不會被覆蓋
        let mut expected = IMAGE_MARKER.to_vec();
        expected.extend_from_slice(b"1000;1;");
        let written = fs::read(temp_dir.path().join("extracted/1000_1_3.jp4")).unwrap();
        assert_eq!(written, expected);
    }

    #[test]
    fn test_duplicate_does_not_consume_directory_slot() {
        let temp_dir = TempDir::new().unwrap();
        let (extractor, container) = setup(&temp_dir, &["1;0;", "1;0;", "2;0;"]);
        let extractor = extractor.with_directory_limit(Some(1));

        let result = extractor.extract(&container, 0).unwrap();

        let indexes: Vec<Option<usize>> =
            result.images.iter().map(|i| i.directory_index).collect();
        assert_eq!(indexes, vec![Some(0), Some(1)]);
        assert_eq!(result.rollover.unwrap().placed(), 2);
    }

    #[test]
    fn test_unwritable_span_keeps_earlier_images() {
        let temp_dir = TempDir::new().unwrap();
        let (extractor, container) = setup(&temp_dir, &["999;1;", "1000;1;", "1001;1;"]);
        fs::create_dir_all(temp_dir.path().join("extracted/1000_1_3.jp4")).unwrap();

        let result = extractor.extract(&container, 0).unwrap();

        assert_eq!(result.success_count, 2);
        assert_eq!(result.failure_count, 1);
        let keys: Vec<i64> = result.images.iter().map(|i| i.key.timestamp).collect();
        assert_eq!(keys, vec![999, 1001]);
        assert!(temp_dir.path().join("trash/unwritable_m3_cam_mov_0000.jp4").exists());
    }
}
