use super::rollover::DirectoryRollover;
use crate::component::capture::ExtractedImage;
use crate::component::job_scheduler::Accumulate;
use std::collections::BTreeMap;

/// 單一擷取工作的結果，合併前只屬於該工作
///
/// 收集者也用同一個結構作為彙總
#[derive(Debug, Default, Clone)]
pub struct ExtractionJobResult {
    pub failure_count: usize,
    pub images: Vec<ExtractedImage>,
    pub success_count: usize,
    /// 資料夾上限、門檻與目前編號；未設定上限時為 `None`
    pub rollover: Option<DirectoryRollover>,
    pub worker_slot: Option<usize>,
}

impl ExtractionJobResult {
    #[must_use]
    pub fn for_worker(worker_slot: usize) -> Self {
        Self {
            worker_slot: Some(worker_slot),
            ..Self::default()
        }
    }
}

impl Accumulate<ExtractionJobResult> for ExtractionJobResult {
    /// 計數與影像列表相加；輪替狀態不相加，保留放置數最多（最新）的快照
    fn accumulate(&mut self, job: ExtractionJobResult) {
        self.failure_count += job.failure_count;
        self.success_count += job.success_count;
        self.images.extend(job.images);

        if let Some(latest) = job.rollover
            && self
                .rollover
                .is_none_or(|current| latest.placed() >= current.placed())
        {
            self.rollover = Some(latest);
        }

        self.worker_slot = job.worker_slot;
    }
}

/// 統計模式下單一容器檔的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerCount {
    pub module: u32,
    pub images: usize,
    pub bytes: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ModuleTally {
    pub containers: usize,
    pub images: usize,
    pub bytes: u64,
}

/// 統計模式的彙總
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CountSummary {
    pub containers: usize,
    pub images: usize,
    pub bytes: u64,
    pub per_module: BTreeMap<u32, ModuleTally>,
}

impl Accumulate<ContainerCount> for CountSummary {
    fn accumulate(&mut self, count: ContainerCount) {
        self.containers += 1;
        self.images += count.images;
        self.bytes += count.bytes;

        let tally = self.per_module.entry(count.module).or_default();
        tally.containers += 1;
        tally.images += count.images;
        tally.bytes += count.bytes;
    }
}
