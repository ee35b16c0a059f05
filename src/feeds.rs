//! Thin proxies for the weather, news and job-board widgets.
//!
//! Each feed attaches its API key to a public REST endpoint and hands the
//! upstream JSON back mostly untouched.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{JobsConfig, NewsConfig, WeatherConfig};
use crate::error::{Result, TaskflowError};

const TIMEOUT: Duration = Duration::from_secs(10);

pub struct FeedClient {
    http: Client,
}

impl FeedClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("taskflow/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Current conditions at a coordinate.
    pub fn weather(&self, cfg: &WeatherConfig, api_key: &str, lat: f64, lon: f64) -> Result<Value> {
        let url = weather_url(cfg, api_key, lat, lon)?;
        debug!(lat, lon, "fetching weather");
        let response = self.http.get(url).send()?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "weather upstream failed");
            return Err(TaskflowError::Feed("weather service error".into()));
        }
        Ok(response.json()?)
    }

    /// Top headlines for the configured country and category.
    pub fn news(&self, cfg: &NewsConfig, api_key: &str) -> Result<Value> {
        let url = news_url(cfg, api_key)?;
        debug!(country = %cfg.country, category = %cfg.category, "fetching news");
        let response = self.http.get(url).send()?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "news upstream failed");
            return Err(TaskflowError::Feed("news service error".into()));
        }
        check_news(response.json()?)
    }

    /// Job listings; returns the upstream `data` array.
    pub fn jobs(&self, cfg: &JobsConfig, api_key: &str) -> Result<Value> {
        let url = jobs_url(cfg)?;
        debug!(query = %cfg.query, "fetching jobs");
        let response = self
            .http
            .get(url)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", &cfg.host)
            .send()?;
        if !response.status().is_success() {
            let status = response.status();
            let message = error_message(response).unwrap_or_else(|| "failed to fetch jobs".into());
            warn!(%status, %message, "jobs upstream failed");
            return Err(TaskflowError::Feed(message));
        }
        extract_jobs(response.json()?)
    }
}

fn endpoint(base: &str, path: &str, params: &[(&str, String)]) -> Result<Url> {
    let raw = format!("{}{}", base.trim_end_matches('/'), path);
    Url::parse_with_params(&raw, params)
        .map_err(|e| TaskflowError::InvalidArgument("base_url".into(), format!("{raw}: {e}")))
}

pub fn validate_coords(lat: f64, lon: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(TaskflowError::InvalidArgument(
            "lat".into(),
            format!("{lat} is outside [-90, 90]"),
        ));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(TaskflowError::InvalidArgument(
            "lon".into(),
            format!("{lon} is outside [-180, 180]"),
        ));
    }
    Ok(())
}

pub fn weather_url(cfg: &WeatherConfig, api_key: &str, lat: f64, lon: f64) -> Result<Url> {
    validate_coords(lat, lon)?;
    endpoint(
        &cfg.base_url,
        "/data/2.5/weather",
        &[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", api_key.to_string()),
            ("units", cfg.units.clone()),
        ],
    )
}

pub fn news_url(cfg: &NewsConfig, api_key: &str) -> Result<Url> {
    endpoint(
        &cfg.base_url,
        "/v2/top-headlines",
        &[
            ("country", cfg.country.clone()),
            ("category", cfg.category.clone()),
            ("pageSize", cfg.page_size.to_string()),
            ("apiKey", api_key.to_string()),
        ],
    )
}

pub fn jobs_url(cfg: &JobsConfig) -> Result<Url> {
    endpoint(
        &cfg.base_url,
        "/search",
        &[
            ("query", cfg.query.clone()),
            ("page", "1".to_string()),
            ("num_pages", "1".to_string()),
            ("date_posted", cfg.date_posted.clone()),
        ],
    )
}

/// NewsAPI reports some failures in-band with `status: "error"`.
pub fn check_news(body: Value) -> Result<Value> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("news API error");
        return Err(TaskflowError::Feed(message.to_string()));
    }
    Ok(body)
}

pub fn extract_jobs(mut body: Value) -> Result<Value> {
    match body.get_mut("data").map(Value::take) {
        Some(data @ Value::Array(_)) => Ok(data),
        _ => Err(TaskflowError::Feed(
            "invalid response format from jobs API".into(),
        )),
    }
}

fn error_message(response: Response) -> Option<String> {
    let body: Value = response.json().ok()?;
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}
