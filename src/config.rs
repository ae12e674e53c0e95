use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::duration::parse_duration_label;
use crate::error::Result;
use crate::session::RepSchedule;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Exercise shown in the header
    pub exercise: String,
    /// Duration label used when none is given on the command line, e.g. "60 seg"
    pub duration: String,
    pub countdown_interval_ms: u64,
    pub sensor_interval_ms: u64,
    pub rep_schedule: RepSchedule,
    /// Default filter for the log file, overridden by RUST_LOG
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exercise: "Single leg stand".to_string(),
            duration: "60 seg".to_string(),
            countdown_interval_ms: 1000,
            sensor_interval_ms: 200,
            rep_schedule: RepSchedule::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Everything a session screen needs, after command line overrides are applied
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub exercise: String,
    pub duration_label: String,
    pub countdown_interval: Duration,
    pub sensor_interval: Duration,
    pub rep_schedule: RepSchedule,
    pub seed: Option<u64>,
}

impl SessionSettings {
    pub fn total_seconds(&self) -> u32 {
        parse_duration_label(&self.duration_label)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            exercise: cfg.exercise.clone(),
            duration_label: cfg.duration.clone(),
            countdown_interval: Duration::from_millis(cfg.countdown_interval_ms),
            sensor_interval: Duration::from_millis(cfg.sensor_interval_ms),
            rep_schedule: cfg.rep_schedule,
            seed: None,
        }
    }
}

pub trait ConfigStore {
    /// Read the stored config. A missing file is not an error and yields the defaults.
    fn try_load(&self) -> Result<Config>;

    /// Like `try_load`, falling back to the defaults on any error
    fn load(&self) -> Config {
        self.try_load().unwrap_or_else(|err| {
            warn!(%err, "ignoring unreadable config");
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn try_load(&self) -> Result<Config> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
