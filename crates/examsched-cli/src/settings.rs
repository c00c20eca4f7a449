//! Layered settings: built-in defaults, the user config file, an explicit
//! `--config` file, then `EXAMSCHED_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use config::{Config, Environment, File};
use exam_store::RestConfig;
use occupancy_engine::window::{parse_time_of_day, parse_timezone, DEFAULT_DAY_END, DEFAULT_DAY_START};
use occupancy_engine::DayWindow;
use serde::Deserialize;

const ENV_PREFIX: &str = "EXAMSCHED";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub store: StoreSettings,
    pub schedule: ScheduleSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSettings {
    pub timezone: String,
    pub day_start: String,
    pub day_end: String,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub bucket: String,
}

impl Settings {
    /// Load from the standard locations plus an optional explicit file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::from_sources(user_config_path(), explicit, Environment::with_prefix(ENV_PREFIX))
    }

    fn from_sources(user: Option<PathBuf>, explicit: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("store.timeout_secs", 10)?
            .set_default("schedule.timezone", "Asia/Manila")?
            .set_default("schedule.day_start", DEFAULT_DAY_START)?
            .set_default("schedule.day_end", DEFAULT_DAY_END)?
            .set_default("schedule.poll_interval_secs", 2)?
            .set_default("storage.bucket", exam_store::storage::DEFAULT_BUCKET)?;

        if let Some(path) = user {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }
        builder = builder.add_source(env.prefix_separator("_").separator("__"));

        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn timezone(&self) -> Result<Tz> {
        Ok(parse_timezone(&self.schedule.timezone)?)
    }

    /// The exam day for `date` between the configured cutoffs.
    pub fn window_for(&self, date: NaiveDate) -> Result<DayWindow> {
        let start = parse_time_of_day(&self.schedule.day_start)?;
        let end = parse_time_of_day(&self.schedule.day_end)?;
        Ok(DayWindow::on_date(date, start, end, self.timezone()?)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.poll_interval_secs.max(1))
    }

    pub fn rest_config(&self) -> Result<RestConfig> {
        let url = self.store.url.clone().context(
            "store.url is not set (set EXAMSCHED_STORE__URL, add it to the config file, or use --offline DIR)",
        )?;
        let api_key = self
            .store
            .api_key
            .clone()
            .context("store.api_key is not set (set EXAMSCHED_STORE__API_KEY)")?;
        Ok(RestConfig::new(url, api_key).with_timeout(Duration::from_secs(self.store.timeout_secs)))
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("examsched").join("config.toml"))
}
