use super::scheduler::{Accumulate, JobOutcome};
use super::slot_table::SlotTable;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use log::{debug, error};
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

/// 收集者的最終結果
#[derive(Debug)]
pub struct CollectorReport<A> {
    pub aggregate: A,
    pub completed: usize,
    pub failed_jobs: usize,
    /// 依完成順序排列的工作編號
    pub completion_order: Vec<usize>,
}

/// 啟動唯一的收集執行緒
///
/// 彙總結果只由這個執行緒寫入。所有傳送端關閉且通道清空後結束
pub fn spawn_collector<R, A>(
    receiver: Receiver<JobOutcome<R>>,
    slots: Arc<SlotTable>,
    progress: ProgressBar,
) -> Result<JoinHandle<CollectorReport<A>>>
where
    R: Send + 'static,
    A: Accumulate<R>,
{
    thread::Builder::new()
        .name("collector".to_string())
        .spawn(move || {
            let mut report = CollectorReport {
                aggregate: A::default(),
                completed: 0,
                failed_jobs: 0,
                completion_order: Vec::new(),
            };

            for outcome in receiver {
                slots.release(outcome.slot);

                match outcome.result {
                    Ok(result) => {
                        debug!(
                            "工作完成 [槽位 {}]: {}",
                            outcome.slot,
                            outcome.container.path.display()
                        );
                        report.aggregate.accumulate(result);
                    }
                    Err(e) => {
                        error!(
                            "工作失敗 [槽位 {}]: {}: {e:#}",
                            outcome.slot,
                            outcome.container.path.display()
                        );
                        report.failed_jobs += 1;
                    }
                }

                report.completion_order.push(outcome.job_index);
                report.completed += 1;
                progress.inc(1);
                slots.mark_completed();
            }

            report
        })
        .context("無法啟動收集執行緒")
}
