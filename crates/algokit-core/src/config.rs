use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config as cfg;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AlgoError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    Sequential,
    ForkJoin,
    Structured,
}

impl Default for SchedulerKind {
    fn default() -> Self {
        Self::ForkJoin
    }
}

impl SchedulerKind {
    pub fn description(&self) -> &str {
        match self {
            Self::Sequential => "Single-threaded merge sort",
            Self::ForkJoin => "Fork the left half, compute the right half inline, join",
            Self::Structured => "Both halves in a cancelling scope, fail fast",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortConfig {
    /// Ranges of at most this many elements are sorted sequentially.
    #[serde(default = "SortConfig::default_threshold")]
    pub threshold: usize,
    /// Dedicated worker count; `None` runs on the global pool.
    #[serde(default)]
    pub num_threads: Option<usize>,
    #[serde(default)]
    pub scheduler: SchedulerKind,
}

impl SortConfig {
    pub const DEFAULT_THRESHOLD: usize = 1000;

    fn default_threshold() -> usize {
        Self::DEFAULT_THRESHOLD
    }

    pub fn validate(&self) -> std::result::Result<(), AlgoError> {
        if self.num_threads == Some(0) {
            return Err(AlgoError::InvalidConfig(
                "sort.num_threads must be > 0 when set".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            threshold: Self::default_threshold(),
            num_threads: None,
            scheduler: SchedulerKind::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    /// Fixed for the table's lifetime; there is no rehashing.
    #[serde(default = "TableConfig::default_bucket_count")]
    pub bucket_count: usize,
}

impl TableConfig {
    fn default_bucket_count() -> usize {
        64
    }

    pub fn validate(&self) -> std::result::Result<(), AlgoError> {
        if self.bucket_count == 0 {
            return Err(AlgoError::InvalidConfig(
                "table.bucket_count must be > 0".into(),
            ));
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            bucket_count: Self::default_bucket_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub sort: SortConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    pub fn default_env() -> String {
        env::var("ALGOKIT_ENV").unwrap_or_else(|_| "development".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        self.sort.validate()?;
        self.table.validate()?;
        anyhow::ensure!(
            !self.logging.level.trim().is_empty(),
            "logging.level cannot be empty"
        );
        Ok(())
    }

    pub fn from_toml_str(source: &str) -> crate::Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Layered load: `default.toml`, `{env}.toml`, `local.toml`, then
    /// `ALGOKIT__SECTION__KEY` environment variables. Missing files are skipped.
    pub fn load_from_sources(config_dir: &Path, env_name: &str) -> Result<Self> {
        info!("Loading configuration from {:?} (env: {})", config_dir, env_name);
        let settings: Settings = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                cfg::Environment::with_prefix("ALGOKIT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("deserializing configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// `./config` when present, the current directory otherwise.
    pub fn default_config_dir() -> PathBuf {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_config = cwd.join("config");
        if project_config.exists() {
            project_config
        } else {
            cwd
        }
    }
}
