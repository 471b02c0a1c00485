use crate::cli::Cli;
use crate::config::types::{
    Config, DEFAULT_CONTAINER_EXTENSION, DEFAULT_EXTENSION, DEFAULT_LANGUAGE, DEFAULT_MODULES,
    DEFAULT_WORKERS, FileSettings, RunMode, Verbosity,
};
use crate::error::ConfigError;
use std::fs;
use std::path::Path;

impl Config {
    /// 合併命令列與設定檔，並在任何工作開始前驗證
    ///
    /// 優先順序：命令列 > 設定檔 > 預設值
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let settings = match &cli.config {
            Some(path) => Self::load_settings(path)?,
            None => FileSettings::default(),
        };

        let config = Self::merge(cli, settings)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_settings(path: &Path) -> Result<FileSettings, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::SettingsFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::SettingsFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn merge(cli: &Cli, settings: FileSettings) -> Result<Self, ConfigError> {
        let input_dir = cli
            .input
            .clone()
            .or(settings.input_dir)
            .ok_or(ConfigError::MissingPath("input"))?;
        let output_dir = cli
            .output
            .clone()
            .or(settings.output_dir)
            .ok_or(ConfigError::MissingPath("output"))?;
        let quarantine_dir = cli
            .quarantine
            .clone()
            .or(settings.quarantine_dir)
            .ok_or(ConfigError::MissingPath("quarantine"))?;

        let debug = cli.debug || settings.debug.unwrap_or(false);
        let quiet = cli.quiet || settings.quiet.unwrap_or(false);
        let verbosity = match (debug, quiet) {
            (true, true) => return Err(ConfigError::ConflictingVerbosity),
            (true, false) => Verbosity::Debug,
            (false, true) => Verbosity::Quiet,
            (false, false) => Verbosity::Normal,
        };

        let mode = if cli.count {
            RunMode::Count
        } else {
            settings.mode.unwrap_or_default()
        };

        let max_files_per_dir = cli
            .max_files_per_dir
            .or(settings.max_files_per_dir)
            .filter(|&limit| limit > 0);

        Ok(Self {
            input_dir,
            output_dir,
            quarantine_dir,
            workers: cli.workers.or(settings.workers).unwrap_or(DEFAULT_WORKERS),
            modules: cli.modules.or(settings.modules).unwrap_or(DEFAULT_MODULES),
            mode,
            max_files_per_dir,
            geo_index_base_url: cli
                .geo_index_base_url
                .clone()
                .or(settings.geo_index_base_url),
            file_list: cli.file_list.clone().or(settings.file_list),
            log_file: cli.log_file.clone().or(settings.log_file),
            verbosity,
            no_color: cli.no_color || settings.no_color.unwrap_or(false),
            skip_filtering: cli.skip_filtering || settings.skip_filtering.unwrap_or(false),
            extension: normalize_extension(
                cli.extension.clone().or(settings.extension),
                DEFAULT_EXTENSION,
            ),
            container_extension: normalize_extension(
                cli.container_extension
                    .clone()
                    .or(settings.container_extension),
                DEFAULT_CONTAINER_EXTENSION,
            ),
            language: cli
                .language
                .clone()
                .or(settings.language)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input_dir.exists() {
            return Err(ConfigError::InputMissing(self.input_dir.clone()));
        }
        if !self.input_dir.is_dir() {
            return Err(ConfigError::InputNotDirectory(self.input_dir.clone()));
        }
        if self.output_dir == self.quarantine_dir {
            return Err(ConfigError::OutputEqualsQuarantine(self.output_dir.clone()));
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.modules == 0 {
            return Err(ConfigError::ZeroModules);
        }
        if self.extension.is_empty() {
            return Err(ConfigError::EmptyExtension("extension"));
        }
        if self.container_extension.is_empty() {
            return Err(ConfigError::EmptyExtension("container_extension"));
        }
        Ok(())
    }
}

/// 去掉開頭的 `.`，未指定時使用預設值
fn normalize_extension(value: Option<String>, default: &str) -> String {
    value
        .map(|ext| ext.trim().trim_start_matches('.').to_string())
        .unwrap_or_else(|| default.to_string())
}
