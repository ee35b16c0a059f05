use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskflowError};

pub const CONFIG_FILE: &str = "config.yaml";

pub const WEATHER_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const NEWS_KEY_ENV: &str = "NEWS_API_KEY";
pub const JOBS_KEY_ENV: &str = "RAPIDAPI_KEY";

/// Workspace configuration stored in `.taskflow/config.yaml`.
///
/// Every field has a default so a partial or empty file is valid. API keys are
/// never persisted here; they are read from the environment on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub auto_archive: bool,
    pub search_limit: usize,
    pub history_page_size: usize,
    pub weather: WeatherConfig,
    pub news: NewsConfig,
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub units: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub base_url: String,
    pub country: String,
    pub category: String,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    pub base_url: String,
    pub host: String,
    pub query: String,
    pub date_posted: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: None,
            auto_archive: true,
            search_limit: 20,
            history_page_size: 10,
            weather: WeatherConfig::default(),
            news: NewsConfig::default(),
            jobs: JobsConfig::default(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org".into(),
            units: "metric".into(),
            lat: None,
            lon: None,
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org".into(),
            country: "us".into(),
            category: "technology".into(),
            page_size: 10,
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://jsearch.p.rapidapi.com".into(),
            host: "jsearch.p.rapidapi.com".into(),
            query: "high paying jobs".into(),
            date_posted: "today".into(),
        }
    }
}

impl Config {
    /// Load `config.yaml` from the workspace directory, falling back to defaults
    /// when the file does not exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let raw = serde_yaml::to_string(self)?;
        fs::write(dir.join(CONFIG_FILE), raw)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.search_limit == 0 {
            return Err(TaskflowError::InvalidArgument(
                "search_limit".into(),
                "must be at least 1".into(),
            ));
        }
        if self.history_page_size == 0 {
            return Err(TaskflowError::InvalidArgument(
                "history_page_size".into(),
                "must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Read an API key from the environment, treating blank values as unset.
pub fn api_key(var: &str) -> Result<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| TaskflowError::MissingApiKey(var.to_string()))
}
