//! Current conditions from OpenWeatherMap.

use crate::{http, options};
use dayboard_core::plugin::{
    FetchContext, FetchResult, Plugin, PluginError, PluginInfo, PluginMetadata, WeatherReport,
};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

pub const WEATHER_IDENTITY: &str = "openweathermap";
pub const DEFAULT_CITY: &str = "Bengaluru,IN";

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
/// Value shipped in sample configs, treated as unset
const SAMPLE_KEY: &str = "YOUR_OWM_API_KEY";

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    #[serde(default)]
    weather: Vec<Condition>,
    main: Readings,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Condition {
    id: u32,
    #[serde(default)]
    main: String,
}

#[derive(Debug, Deserialize)]
struct Readings {
    temp: f64,
}

/// Glyph for an OpenWeatherMap condition code
pub fn condition_icon(id: u32) -> &'static str {
    match id {
        200..=299 => "⛈",
        300..=399 | 500..=599 => "🌧",
        600..=699 => "❄",
        700..=799 => "🌫",
        800 => "☀",
        _ => "☁",
    }
}

pub struct WeatherPlugin {
    info: PluginInfo,
    client: Client,
    base_url: String,
    api_key: Option<String>,
    city: String,
}

impl WeatherPlugin {
    /// `city` is the fallback when the options table has none
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            info: PluginInfo::new(WEATHER_IDENTITY, "weather")
                .name("OpenWeatherMap")
                .description("Current weather from the OpenWeatherMap API"),
            client: http::client(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            city: city.into(),
        }
    }

    fn report(&self, current: CurrentWeather) -> WeatherReport {
        let (icon, condition) = current
            .weather
            .first()
            .map(|c| (condition_icon(c.id), c.main.clone()))
            .unwrap_or(("☁", "Clouds".to_string()));
        WeatherReport {
            location: if current.name.is_empty() {
                self.city.clone()
            } else {
                current.name
            },
            temperature: current.main.temp.round() as i32,
            condition,
            icon: icon.to_string(),
        }
    }
}

impl Default for WeatherPlugin {
    fn default() -> Self {
        Self::new(DEFAULT_CITY)
    }
}

impl Plugin for WeatherPlugin {
    fn identity(&self) -> &str {
        self.info.identity()
    }

    fn category(&self) -> &str {
        self.info.category()
    }

    fn configure(&mut self, options: &toml::Table) -> Result<(), PluginError> {
        if let Some(url) = options::base_url(options) {
            self.base_url = url;
        }
        if let Some(city) = options::string(options, "city") {
            self.city = city;
        }
        match options::string(options, "api_key") {
            Some(key) if key != SAMPLE_KEY => {
                self.api_key = Some(key);
                Ok(())
            }
            _ => Err(PluginError::config(
                "api_key is required for openweathermap",
            )),
        }
    }

    async fn fetch(&self, ctx: FetchContext) -> Result<FetchResult, PluginError> {
        let Some(api_key) = &self.api_key else {
            return Ok(FetchResult::NotConfigured {
                reason: "api_key is required for openweathermap".to_string(),
            });
        };

        let request = self
            .client
            .get(format!("{}/weather", self.base_url))
            .query(&[
                ("q", self.city.as_str()),
                ("units", "metric"),
                ("appid", api_key.as_str()),
            ]);
        let current: CurrentWeather = http::get_json(&ctx, request, "OpenWeatherMap").await?;
        let report = self.report(current);
        debug!(
            city = %self.city,
            temperature = report.temperature,
            condition = %report.condition,
            "Weather fetched"
        );
        Ok(FetchResult::Weather(report))
    }

    fn metadata(&self) -> PluginMetadata {
        let mut config = BTreeMap::new();
        config.insert("city".to_string(), self.city.clone());
        config.insert(
            "has_api_key".to_string(),
            self.api_key.is_some().to_string(),
        );
        self.info.metadata(config)
    }
}
