use crate::config::{self, Config, JOBS_KEY_ENV, NEWS_KEY_ENV, WEATHER_KEY_ENV};
use crate::error::{Result, TaskflowError};
use crate::feeds::FeedClient;
use crate::output::{self, Format};

pub fn weather(settings: &Config, lat: Option<f64>, lon: Option<f64>, format: Format) -> Result<()> {
    let cfg = &settings.weather;
    let lat = lat
        .or(cfg.lat)
        .ok_or_else(|| TaskflowError::MissingArgument("lat".into()))?;
    let lon = lon
        .or(cfg.lon)
        .ok_or_else(|| TaskflowError::MissingArgument("lon".into()))?;
    let key = config::api_key(WEATHER_KEY_ENV)?;
    let body = FeedClient::new()?.weather(cfg, &key, lat, lon)?;
    output::print_feed(&body, format)
}

pub fn news(settings: &Config, format: Format) -> Result<()> {
    let key = config::api_key(NEWS_KEY_ENV)?;
    let body = FeedClient::new()?.news(&settings.news, &key)?;
    output::print_feed(&body, format)
}

pub fn jobs(settings: &Config, format: Format) -> Result<()> {
    let key = config::api_key(JOBS_KEY_ENV)?;
    let body = FeedClient::new()?.jobs(&settings.jobs, &key)?;
    output::print_feed(&body, format)
}
