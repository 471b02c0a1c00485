use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 安裝 Ctrl-C 處理器，回傳共用的中斷旗標
///
/// 旗標只會停止新的派工；執行中的工作會完整寫完後才結束
pub fn setup_shutdown_signal() -> Result<Arc<AtomicBool>> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    ctrlc::set_handler(move || {
        signal_clone.store(true, Ordering::SeqCst);
        eprintln!("\n{}", t!("signal.received"));
    })
    .context("無法設定 Ctrl-C 處理器")?;

    Ok(shutdown_signal)
}
