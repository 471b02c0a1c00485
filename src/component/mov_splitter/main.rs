use super::report::{ExtractionReport, RunReport};
use crate::component::capture::{ContainerFile, ExtractedImage};
use crate::component::container_extractor::{
    CountSummary, ExifReader, ExtractionJobResult, ImageExtractor, MetadataReader,
    count_container,
};
use crate::component::job_scheduler::{JobScheduler, SchedulerReport};
use crate::component::rearranger::Rearranger;
use crate::component::sequence_validator::{SequenceValidator, ValidationOutcome};
use crate::config::{Config, RunMode, Verbosity};
use crate::error::PipelineError;
use crate::tools::{
    ensure_directory_exists, remove_empty_directories, scan_container_files,
    scan_module_directories, validate_directory_exists, write_index_manifest, write_path_list,
};
use anyhow::Result;
use log::{error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 整個拆分流程的執行環境
///
/// 設定、中斷旗標與拍攝資訊讀取器都由這裡持有，沒有任何全域狀態
pub struct MovSplitter {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
    reader: Arc<dyn MetadataReader>,
    show_progress: bool,
}

impl MovSplitter {
    #[must_use]
    pub fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        let show_progress = config.verbosity != Verbosity::Quiet;
        Self {
            config,
            shutdown_signal,
            reader: Arc::new(ExifReader),
            show_progress,
        }
    }

    /// 替換拍攝資訊讀取器
    #[must_use]
    pub fn with_metadata_reader(mut self, reader: Arc<dyn MetadataReader>) -> Self {
        self.reader = reader;
        self
    }

    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn run(&self) -> Result<RunReport> {
        validate_directory_exists(&self.config.input_dir)?;

        let modules = scan_module_directories(&self.config.input_dir, self.config.modules)?;
        let containers = scan_container_files(&modules, &self.config.container_extension);

        info!(
            "找到 {} 個模組資料夾、{} 個容器檔: {}",
            modules.len(),
            containers.len(),
            self.config.input_dir.display()
        );

        match self.config.mode {
            RunMode::Count => self.run_count(containers).map(RunReport::Count),
            RunMode::Extract => {
                if containers.is_empty() {
                    return Err(PipelineError::NothingToDo(self.config.input_dir.clone()).into());
                }
                self.run_extract(containers).map(RunReport::Extract)
            }
        }
    }

    fn scheduler(&self) -> JobScheduler {
        JobScheduler::new(self.config.workers, Arc::clone(&self.shutdown_signal))
            .with_progress(self.show_progress)
    }

    fn check_interrupted(&self) -> Result<()> {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            return Err(PipelineError::Interrupted.into());
        }
        Ok(())
    }

    fn run_count(&self, containers: Vec<ContainerFile>) -> Result<CountSummary> {
        if containers.is_empty() {
            warn!(
                "找不到任何容器檔: {}",
                self.config.input_dir.display()
            );
            return Ok(CountSummary::default());
        }

        let report: SchedulerReport<CountSummary> =
            self.scheduler().run(containers, count_container)?;

        if report.interrupted {
            return Err(PipelineError::Interrupted.into());
        }

        info!(
            "統計完成 - 容器檔: {}, 影像: {}, 大小: {} bytes",
            report.aggregate.containers, report.aggregate.images, report.aggregate.bytes
        );
        Ok(report.aggregate)
    }

    fn run_extract(&self, containers: Vec<ContainerFile>) -> Result<ExtractionReport> {
        let working_dir = self.config.working_dir();
        ensure_directory_exists(&self.config.output_dir)?;
        ensure_directory_exists(&working_dir)?;
        ensure_directory_exists(&self.config.quarantine_dir)?;

        let extractor = Arc::new(
            ImageExtractor::new(
                working_dir.clone(),
                self.config.quarantine_dir.clone(),
                self.config.extension.clone(),
                Arc::clone(&self.reader),
            )
            .with_directory_limit(self.config.max_files_per_dir),
        );

        let worker = Arc::clone(&extractor);
        let scheduled: SchedulerReport<ExtractionJobResult> = self
            .scheduler()
            .run(containers, move |container: &ContainerFile, slot| {
                worker.extract(container, slot)
            })?;

        if scheduled.interrupted {
            return Err(PipelineError::Interrupted.into());
        }

        let aggregate = scheduled.aggregate;
        info!(
            "擷取完成 - 成功: {}, 擷取時隔離: {}, 失敗工作: {}",
            aggregate.success_count, aggregate.failure_count, scheduled.failed_jobs
        );

        let validation = self.validate(aggregate.images)?;
        self.check_interrupted()?;

        let rearranger = Rearranger::new(
            &working_dir,
            &self.config.output_dir,
            self.config.max_files_per_dir,
            self.config.modules,
            Arc::clone(&self.shutdown_signal),
        );
        let arranged = rearranger.rearrange(validation.validated)?;
        remove_empty_directories(&working_dir);

        self.publish_final_list(&arranged.images);

        Ok(ExtractionReport {
            containers: scheduled.total_jobs,
            failed_jobs: scheduled.failed_jobs,
            peak_workers: scheduled.peak_busy,
            extracted: aggregate.success_count,
            rejected: aggregate.failure_count,
            rollover: aggregate.rollover,
            complete_groups: validation.complete_groups,
            incomplete_groups: validation.incomplete_groups,
            quarantined: validation.quarantined.len(),
            files_per_dir: rearranger.files_per_dir(),
            directories: arranged.directories,
            errors: validation.errors + arranged.errors,
            final_images: arranged.images,
        })
    }

    fn validate(&self, images: Vec<ExtractedImage>) -> Result<ValidationOutcome> {
        if self.config.skip_filtering {
            info!("略過序列完整性檢查");
            let mut validated = images;
            ExtractedImage::sort_chronologically(&mut validated);
            return Ok(ValidationOutcome {
                validated,
                ..ValidationOutcome::default()
            });
        }

        SequenceValidator::new(
            self.config.modules,
            &self.config.working_dir(),
            &self.config.quarantine_dir,
            Arc::clone(&self.shutdown_signal),
        )
        .validate(images)
    }

    /// 交給下游的最終清單；寫出失敗只記錄，不影響已完成的搬移
    fn publish_final_list(&self, images: &[ExtractedImage]) {
        if let Some(list_path) = &self.config.file_list
            && let Err(e) = write_path_list(list_path, images)
        {
            error!("無法寫出路徑清單 {}: {e:#}", list_path.display());
        }

        if let Some(base_url) = &self.config.geo_index_base_url
            && let Err(e) = write_index_manifest(&self.config.output_dir, base_url, images)
        {
            error!("無法寫出索引清單: {e:#}");
        }
    }
}
