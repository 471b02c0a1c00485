use crate::component::capture::ExtractedImage;
use crate::component::container_extractor::{CountSummary, DirectoryRollover};
use console::style;
use log::info;

/// 擷取模式的執行結果
#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub containers: usize,
    pub failed_jobs: usize,
    pub peak_workers: usize,
    pub extracted: usize,
    /// 擷取時直接隔離的區段（無法解析、重複、無法寫入）
    pub rejected: usize,
    /// 收集者合併後的最終資料夾狀態
    pub rollover: Option<DirectoryRollover>,
    pub complete_groups: usize,
    pub incomplete_groups: usize,
    pub quarantined: usize,
    pub files_per_dir: Option<usize>,
    pub directories: usize,
    pub errors: usize,
    /// 依時間排序的最終影像
    pub final_images: Vec<ExtractedImage>,
}

#[derive(Debug)]
pub enum RunReport {
    Extract(ExtractionReport),
    Count(CountSummary),
}

impl RunReport {
    pub fn print(&self) {
        match self {
            Self::Extract(report) => print_extraction(report),
            Self::Count(summary) => print_count(summary),
        }
    }
}

fn print_extraction(report: &ExtractionReport) {
    println!();
    println!("{}", style(t!("report.split_title")).cyan().bold());
    println!("  {}", t!("report.containers", count = report.containers));
    println!(
        "  {}",
        t!("report.extracted", count = style(report.extracted).green())
    );

    if report.rejected > 0 {
        println!(
            "  {}",
            t!("report.rejected", count = style(report.rejected).yellow())
        );
    }
    if report.failed_jobs > 0 {
        println!(
            "  {}",
            t!("report.failed_jobs", count = style(report.failed_jobs).red())
        );
    }

    println!(
        "  {}",
        t!(
            "report.groups",
            complete = style(report.complete_groups).green(),
            incomplete = report.incomplete_groups
        )
    );
    if report.quarantined > 0 {
        println!(
            "  {}",
            t!("report.quarantined", count = style(report.quarantined).yellow())
        );
    }

    println!(
        "  {}",
        t!(
            "report.final_images",
            count = style(report.final_images.len()).green()
        )
    );
    if let Some(limit) = report.files_per_dir {
        println!(
            "  {}",
            t!("report.directories", count = report.directories, limit = limit)
        );
    }

    if report.errors > 0 {
        println!(
            "  {}",
            t!("report.move_errors", count = style(report.errors).red())
        );
    }

    info!(
        "拆分完成 - 最終影像: {}, 隔離: {}, 失敗: {}",
        report.final_images.len(),
        report.quarantined,
        report.errors
    );
}

fn print_count(summary: &CountSummary) {
    println!();
    println!("{}", style(t!("report.count_title")).cyan().bold());
    println!("  {}", t!("report.containers", count = summary.containers));
    println!(
        "  {}",
        t!("report.images", count = style(summary.images).green())
    );
    println!("  {}", t!("report.bytes", bytes = summary.bytes));

    if !summary.per_module.is_empty() {
        println!();
        println!("{}", style(t!("report.per_module_title")).dim());
        for (module, tally) in &summary.per_module {
            println!(
                "  {} {}",
                style("•").dim(),
                t!(
                    "report.module_line",
                    module = module,
                    containers = tally.containers,
                    images = tally.images,
                    bytes = tally.bytes
                )
            );
        }
    }
}
