use crate::config::{Config, Verbosity};
use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target, WriteStyle};
use log::LevelFilter;
use std::fs::OpenOptions;

/// 初始化語系、日誌與終端色彩
///
/// 未指定 `--debug`/`--quiet` 時沿用 `RUST_LOG`，預設為 info
pub fn init(config: &Config) -> Result<()> {
    rust_i18n::set_locale(&config.language);

    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    match config.verbosity {
        Verbosity::Debug => {
            builder.filter_level(LevelFilter::Debug);
        }
        Verbosity::Quiet => {
            builder.filter_level(LevelFilter::Warn);
        }
        Verbosity::Normal => {}
    }

    if config.no_color {
        builder.write_style(WriteStyle::Never);
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    if let Some(log_file) = &config.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("無法開啟日誌檔: {}", log_file.display()))?;
        builder.write_style(WriteStyle::Never);
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("無法初始化日誌系統")?;
    Ok(())
}
