use super::collector::spawn_collector;
use super::slot_table::SlotTable;
use crate::component::capture::ContainerFile;
use anyhow::{Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

/// 單一工作結果併入彙總的方式
pub trait Accumulate<R>: Default + Send + 'static {
    fn accumulate(&mut self, result: R);
}

/// 工作執行緒送往收集者的結果，附上來源槽位
#[derive(Debug)]
pub struct JobOutcome<R> {
    pub slot: usize,
    pub job_index: usize,
    pub container: ContainerFile,
    pub result: Result<R>,
}

#[derive(Debug)]
pub struct SchedulerReport<A> {
    pub aggregate: A,
    pub total_jobs: usize,
    pub dispatched: usize,
    pub completed: usize,
    pub failed_jobs: usize,
    pub completion_order: Vec<usize>,
    pub peak_busy: usize,
    pub interrupted: bool,
}

/// 有上限的工作排程器
///
/// 依輸入順序派工、允許亂序完成，結果由單一收集者合併
pub struct JobScheduler {
    worker_count: usize,
    shutdown_signal: Arc<AtomicBool>,
    show_progress: bool,
}

impl JobScheduler {
    #[must_use]
    pub fn new(worker_count: usize, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            worker_count: worker_count.max(1),
            shutdown_signal,
            show_progress: true,
        }
    }

    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn run<R, A, F>(&self, jobs: Vec<ContainerFile>, work: F) -> Result<SchedulerReport<A>>
    where
        R: Send + 'static,
        A: Accumulate<R>,
        F: Fn(&ContainerFile, usize) -> Result<R> + Send + Sync + 'static,
    {
        let total_jobs = jobs.len();
        info!(
            "開始處理 {total_jobs} 個容器檔，最多 {} 個同時執行",
            self.worker_count
        );

        let slots = Arc::new(SlotTable::new(self.worker_count));
        let progress = self.create_progress_bar(total_jobs);
        let (sender, receiver) = mpsc::channel::<JobOutcome<R>>();
        let collector = spawn_collector::<R, A>(receiver, Arc::clone(&slots), progress.clone())?;

        let work = Arc::new(work);
        let mut queue: VecDeque<(usize, ContainerFile)> = jobs.into_iter().enumerate().collect();
        let mut dispatched = 0;

        while let Some((job_index, container)) = queue.pop_front() {
            let Some(slot) = slots.claim(&self.shutdown_signal) else {
                warn!("收到中斷信號，停止派送新工作（剩餘 {} 個）", queue.len() + 1);
                break;
            };

            debug!(
                "派送工作 #{job_index} 到槽位 {slot}: {}",
                container.path.display()
            );
            Self::launch(slot, job_index, container, Arc::clone(&work), sender.clone());
            dispatched += 1;
        }

        slots.wait_for_completion(dispatched);
        drop(sender);

        let report = collector
            .join()
            .map_err(|_| anyhow!("收集執行緒異常結束"))?;

        let interrupted =
            dispatched < total_jobs || self.shutdown_signal.load(Ordering::SeqCst);
        if interrupted {
            progress.abandon_with_message(t!("progress.interrupted").to_string());
        } else {
            progress.finish_with_message(t!("progress.done").to_string());
        }

        info!(
            "工作結束 - 派送: {dispatched}/{total_jobs}, 完成: {}, 失敗: {}",
            report.completed, report.failed_jobs
        );

        Ok(SchedulerReport {
            aggregate: report.aggregate,
            total_jobs,
            dispatched,
            completed: report.completed,
            failed_jobs: report.failed_jobs,
            completion_order: report.completion_order,
            peak_busy: slots.peak_busy(),
            interrupted,
        })
    }

    /// 在指定槽位啟動工作執行緒；執行緒結束時一定會送出結果
    fn launch<R, F>(
        slot: usize,
        job_index: usize,
        container: ContainerFile,
        work: Arc<F>,
        sender: Sender<JobOutcome<R>>,
    ) where
        R: Send + 'static,
        F: Fn(&ContainerFile, usize) -> Result<R> + Send + Sync + 'static,
    {
        let fallback_container = container.clone();
        let fallback_sender = sender.clone();

        let spawned = thread::Builder::new()
            .name(format!("worker-{slot}"))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| work(&container, slot)))
                    .unwrap_or_else(|_| Err(anyhow!("工作執行緒崩潰")));
                let _ = sender.send(JobOutcome {
                    slot,
                    job_index,
                    container,
                    result,
                });
            });

        if let Err(e) = spawned {
            let _ = fallback_sender.send(JobOutcome {
                slot,
                job_index,
                container: fallback_container,
                result: Err(anyhow!("無法啟動工作執行緒: {e}")),
            });
        }
    }

    fn create_progress_bar(&self, total_jobs: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(total_jobs as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            progress_bar.set_style(style.progress_chars("#>-"));
        }
        progress_bar.set_message(t!("progress.processing").to_string());
        progress_bar
    }
}
