use crate::component::capture::{ExtractedImage, SequenceKey};
use crate::error::PipelineError;
use crate::tools::{ensure_directory_exists, move_replacing};
use anyhow::Result;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// 同一拍攝瞬間的影像，以模組編號為鍵
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceGroup {
    pub key: SequenceKey,
    pub images: BTreeMap<u32, ExtractedImage>,
}

impl SequenceGroup {
    /// `1..=module_count` 中缺少的模組，與到達順序無關
    #[must_use]
    pub fn missing_modules(&self, module_count: u32) -> Vec<u32> {
        (1..=module_count)
            .filter(|module| !self.images.contains_key(module))
            .collect()
    }

    #[must_use]
    pub fn is_complete(&self, module_count: u32) -> bool {
        self.missing_modules(module_count).is_empty()
    }
}

/// 依拍攝瞬間分組（依時間排序）
///
/// 同一個 `(key, module)` 重複出現時只保留第一個
#[must_use]
pub fn group_by_sequence(images: Vec<ExtractedImage>) -> Vec<SequenceGroup> {
    let mut groups: BTreeMap<SequenceKey, BTreeMap<u32, ExtractedImage>> = BTreeMap::new();

    for image in images {
        let members = groups.entry(image.key.clone()).or_default();
        if members.contains_key(&image.module) {
            warn!("重複的影像，忽略: {}", image.file_name());
            continue;
        }
        members.insert(image.module, image);
    }

    groups
        .into_iter()
        .map(|(key, images)| SequenceGroup { key, images })
        .collect()
}

/// 驗證結果
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    /// 完整序列的影像，依時間、模組排序
    pub validated: Vec<ExtractedImage>,
    /// 已移到隔離資料夾的影像（位於隔離資料夾根目錄）
    pub quarantined: Vec<ExtractedImage>,
    pub complete_groups: usize,
    pub incomplete_groups: usize,
    pub errors: usize,
}

/// 序列驗證器
pub struct SequenceValidator {
    module_count: u32,
    working_dir: PathBuf,
    quarantine_dir: PathBuf,
    shutdown_signal: Arc<AtomicBool>,
}

impl SequenceValidator {
    #[must_use]
    pub fn new(
        module_count: u32,
        working_dir: &Path,
        quarantine_dir: &Path,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            module_count,
            working_dir: working_dir.to_path_buf(),
            quarantine_dir: quarantine_dir.to_path_buf(),
            shutdown_signal,
        }
    }

    /// 將彙總的影像分成完整與不完整兩組，不完整的整組移到隔離資料夾
    pub fn validate(&self, images: Vec<ExtractedImage>) -> Result<ValidationOutcome> {
        ensure_directory_exists(&self.quarantine_dir)?;

        let mut outcome = ValidationOutcome::default();
        let mut to_quarantine = Vec::new();

        for group in group_by_sequence(images) {
            let missing = group.missing_modules(self.module_count);

            if missing.is_empty() {
                outcome.complete_groups += 1;
                outcome.validated.extend(group.images.into_values());
            } else {
                warn!(
                    "序列不完整 {}: 缺少模組 {:?}，隔離 {} 個檔案",
                    group.key,
                    missing,
                    group.images.len()
                );
                outcome.incomplete_groups += 1;
                to_quarantine.extend(group.images.into_values());
            }
        }

        if self.shutdown_signal.load(Ordering::SeqCst) {
            return Err(PipelineError::Interrupted.into());
        }

        let errors = AtomicUsize::new(0);
        let moved: Vec<ExtractedImage> = to_quarantine
            .par_iter()
            .filter_map(|image| match self.quarantine(image) {
                Ok(moved) => Some(moved),
                Err(e) => {
                    error!("隔離失敗 {}: {e:#}", image.file_name());
                    errors.fetch_add(1, Ordering::SeqCst);
                    None
                }
            })
            .collect();

        outcome.quarantined = moved;
        outcome.errors = errors.load(Ordering::SeqCst);
        ExtractedImage::sort_chronologically(&mut outcome.validated);

        info!(
            "序列驗證完成 - 完整: {}, 不完整: {}, 隔離檔案: {}, 錯誤: {}",
            outcome.complete_groups,
            outcome.incomplete_groups,
            outcome.quarantined.len(),
            outcome.errors
        );

        Ok(outcome)
    }

    /// 移到隔離資料夾；來源已不存在但目標存在時視為已隔離
    fn quarantine(&self, image: &ExtractedImage) -> Result<ExtractedImage> {
        let source = image.path_in(&self.working_dir);
        let moved = ExtractedImage {
            directory_index: None,
            ..image.clone()
        };
        let destination = moved.path_in(&self.quarantine_dir);

        if !source.exists() && destination.exists() {
            debug!("已在隔離資料夾: {}", destination.display());
            return Ok(moved);
        }

        move_replacing(&source, &destination)?;
        debug!("隔離 {} -> {}", source.display(), destination.display());
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn image(timestamp: i64, subsecond: &str, module: u32) -> ExtractedImage {
        ExtractedImage {
            key: SequenceKey::new(timestamp, subsecond),
            module,
            directory_index: None,
            worker_slot: None,
            extension: "jp4".to_string(),
        }
    }

    struct Fixture {
        _temp_dir: TempDir,
        working: PathBuf,
        quarantine: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let working = temp_dir.path().join("extracted");
            let quarantine = temp_dir.path().join("trash");
            fs::create_dir_all(&working).unwrap();
            Self {
                _temp_dir: temp_dir,
                working,
                quarantine,
            }
        }

        fn place(&self, images: &[ExtractedImage]) {
            for img in images {
                let path = img.path_in(&self.working);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, img.file_name()).unwrap();
            }
        }

        fn validator(&self, modules: u32) -> SequenceValidator {
            SequenceValidator::new(
                modules,
                &self.working,
                &self.quarantine,
                Arc::new(AtomicBool::new(false)),
            )
        }
    }

    #[test]
    fn test_group_completeness_ignores_arrival_order() {
        let groups =
            group_by_sequence(vec![image(1, "0", 3), image(1, "0", 1), image(1, "0", 2)]);

        assert_eq!(groups.len(), 1);
        assert!(groups[0].is_complete(3));
        assert_eq!(groups[0].missing_modules(4), vec![4]);
    }

    #[test]
    fn test_duplicate_module_kept_once() {
        let groups = group_by_sequence(vec![image(1, "0", 1), image(1, "0", 1)]);
        assert_eq!(groups[0].images.len(), 1);
    }

    #[test]
    fn test_complete_group_validated() {
        let fixture = Fixture::new();
        let images: Vec<_> = (1..=3).rev().map(|m| image(1000, "123", m)).collect();
        fixture.place(&images);

        let outcome = fixture.validator(3).validate(images).unwrap();

        assert_eq!(outcome.complete_groups, 1);
        assert_eq!(outcome.incomplete_groups, 0);
        let modules: Vec<u32> = outcome.validated.iter().map(|i| i.module).collect();
        assert_eq!(modules, vec![1, 2, 3]);
        assert!(outcome.quarantined.is_empty());
        assert!(fixture.working.join("1000_123_2.jp4").exists());
    }

    #[test]
    fn test_incomplete_group_quarantined() {
        let fixture = Fixture::new();
        let images = vec![
            image(1000, "1", 1),
            image(1000, "1", 3),
            image(2000, "1", 1),
            image(2000, "1", 2),
            image(2000, "1", 3),
        ];
        fixture.place(&images);

        let outcome = fixture.validator(3).validate(images).unwrap();

        assert_eq!(outcome.incomplete_groups, 1);
        assert_eq!(outcome.quarantined.len(), 2);
        assert_eq!(outcome.validated.len(), 3);
        assert!(outcome.validated.iter().all(|i| i.key.timestamp == 2000));
        assert!(fixture.quarantine.join("1000_1_1.jp4").exists());
        assert!(fixture.quarantine.join("1000_1_3.jp4").exists());
        assert!(!fixture.working.join("1000_1_1.jp4").exists());
    }

    #[test]
    fn test_quarantine_from_numbered_directory() {
        let fixture = Fixture::new();
        let mut lone = image(500, "9", 2);
        lone.directory_index = Some(1);
        fixture.place(std::slice::from_ref(&lone));

        let outcome = fixture.validator(2).validate(vec![lone]).unwrap();

        assert_eq!(outcome.quarantined[0].directory_index, None);
        assert!(fixture.quarantine.join("500_9_2.jp4").exists());
        assert!(!fixture.working.join("0001/500_9_2.jp4").exists());
    }

    #[test]
    fn test_existing_quarantine_file_replaced() {
        let fixture = Fixture::new();
        let lone = image(500, "9", 1);
        fixture.place(std::slice::from_ref(&lone));
        fs::create_dir_all(&fixture.quarantine).unwrap();
        fs::write(fixture.quarantine.join("500_9_1.jp4"), "stale").unwrap();

        fixture.validator(2).validate(vec![lone]).unwrap();

        assert_eq!(
            fs::read_to_string(fixture.quarantine.join("500_9_1.jp4")).unwrap(),
            "500_9_1.jp4"
        );
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let fixture = Fixture::new();
        let images = vec![image(1, "0", 1), image(1, "0", 2), image(2, "0", 1)];
        fixture.place(&images);
        let validator = fixture.validator(2);

        let first = validator.validate(images.clone()).unwrap();
        let second = validator.validate(images).unwrap();

        assert_eq!(first.validated, second.validated);
        assert_eq!(first.quarantined.len(), second.quarantined.len());
        assert_eq!(second.errors, 0);
        assert!(fixture.quarantine.join("2_0_1.jp4").exists());
        assert!(fixture.working.join("1_0_1.jp4").exists());
        assert_eq!(fs::read_dir(&fixture.quarantine).unwrap().count(), 1);
    }

    #[test]
    fn test_validated_sorted_by_time() {
        let fixture = Fixture::new();
        let images = vec![image(30, "0", 1), image(10, "5", 1), image(10, "25", 1)];
        fixture.place(&images);

        let outcome = fixture.validator(1).validate(images).unwrap();

        let names: Vec<String> = outcome
            .validated
            .iter()
            .map(ExtractedImage::file_name)
            .collect();
        assert_eq!(names, vec!["10_25_1.jp4", "10_5_1.jp4", "30_0_1.jp4"]);
    }
}
