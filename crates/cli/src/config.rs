use std::{
    fs::File,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use course_client::DEFAULT_BASE;
use course_store::{LoadingMode, StoreOptions};
use log::debug;
use serde::{Deserialize, Serialize};
use xdg::BaseDirectories;

pub const APP_PREFIX: &str = "course-catalog";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub timeout_secs: u64,
    pub loading_mode: LoadingMode,
    #[serde(flatten)]
    pub store: StoreOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE.to_string(),
            timeout_secs: 30,
            loading_mode: LoadingMode::default(),
            store: StoreOptions::default(),
        }
    }
}

impl Config {
    /// Load the config file, or the defaults if there isn't one
    pub fn load() -> Result<Self> {
        let Some(path) = BaseDirectories::with_prefix(APP_PREFIX)?.find_config_file("config.json")
        else {
            debug!("no config file, using defaults");
            return Ok(Self::default());
        };

        Self::load_from(path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref()).context("error opening config file")?;
        let config = serde_json::from_reader(&file).context("error deserialising config file")?;
        debug!("loaded config: {:?}", config);

        Ok(config)
    }

    /// Write this config to the config file, returning where it went
    pub fn save(&self) -> Result<PathBuf> {
        let path = BaseDirectories::with_prefix(APP_PREFIX)?.place_config_file("config.json")?;

        let mut file = File::create(&path).context("error opening config file")?;
        serde_json::to_writer_pretty(&mut file, &self).context("error serialising config file")?;

        Ok(path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
