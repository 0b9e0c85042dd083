//! Driving time in both directions between two points, via OSRM.

use crate::{http, options};
use dayboard_core::plugin::{
    FetchContext, FetchResult, Plugin, PluginError, PluginInfo, PluginMetadata, RouteEstimate,
    TrafficReport,
};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use toml::Value;
use tracing::debug;

pub const TRAFFIC_IDENTITY: &str = "osrm_traffic";

const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CoordinateError {
    #[error("expected \"lat,lon\", got {0:?}")]
    Format(String),

    #[error("invalid number {0:?}")]
    Number(String),

    #[error("latitude {0} is outside -90..=90")]
    Latitude(f64),

    #[error("longitude {0} is outside -180..=180")]
    Longitude(f64),
}

/// A WGS84 point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// OSRM path segment order: `lon,lat`
    fn osrm(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

impl FromStr for Coordinates {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| CoordinateError::Format(s.to_string()))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| CoordinateError::Number(v.trim().to_string()))
        };
        Self::new(parse(lat)?, parse(lon)?)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// A configured endpoint with its display name
#[derive(Debug, Clone, PartialEq)]
struct Place {
    name: String,
    point: Coordinates,
}

/// `key = "lat,lon"` or `key = { latitude = .., longitude = .., name = ".." }`
fn place(options: &toml::Table, key: &str) -> Result<Place, PluginError> {
    let invalid = |e: CoordinateError| PluginError::config(format!("invalid {key}: {e}"));
    match options.get(key) {
        None => Err(PluginError::config(format!("{key} is required for osrm_traffic"))),
        Some(Value::String(s)) => {
            let point: Coordinates = s.parse().map_err(invalid)?;
            Ok(Place {
                name: point.to_string(),
                point,
            })
        }
        Some(Value::Table(t)) => {
            let number = |field: &str| {
                t.get(field)
                    .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
                    .ok_or_else(|| PluginError::config(format!("{key}.{field} is required")))
            };
            let point = Coordinates::new(number("latitude")?, number("longitude")?).map_err(invalid)?;
            Ok(Place {
                name: options::string(t, "name").unwrap_or_else(|| point.to_string()),
                point,
            })
        }
        Some(other) => Err(PluginError::config(format!(
            "{key} must be a \"lat,lon\" string or a table, got {}",
            other.type_str()
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    /// Seconds
    duration: f64,
    /// Meters
    distance: f64,
}

pub struct OsrmTrafficPlugin {
    info: PluginInfo,
    client: Client,
    base_url: String,
    route: Option<(Place, Place)>,
}

impl OsrmTrafficPlugin {
    pub fn new() -> Self {
        Self {
            info: PluginInfo::new(TRAFFIC_IDENTITY, "traffic")
                .name("OSRM Traffic")
                .description("Driving time between two points from OpenStreetMap routing"),
            client: http::client(),
            base_url: DEFAULT_BASE_URL.to_string(),
            route: None,
        }
    }

    async fn estimate(
        &self,
        ctx: &FetchContext,
        from: &Place,
        to: &Place,
    ) -> Result<RouteEstimate, PluginError> {
        let url = format!(
            "{}/route/v1/driving/{};{}",
            self.base_url,
            from.point.osrm(),
            to.point.osrm()
        );
        let request = self.client.get(url).query(&[
            ("overview", "false"),
            ("alternatives", "false"),
            ("steps", "false"),
        ]);
        let response: RouteResponse = http::get_json(ctx, request, "OSRM").await?;
        if response.code != "Ok" {
            return Err(PluginError::fetch(format!("OSRM error: {}", response.code)));
        }
        let route = response
            .routes
            .first()
            .ok_or_else(|| PluginError::fetch("OSRM returned no routes"))?;
        Ok(RouteEstimate {
            from: from.name.clone(),
            to: to.name.clone(),
            duration_secs: route.duration.max(0.0).round() as u64,
            distance_meters: route.distance,
        })
    }
}

impl Default for OsrmTrafficPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for OsrmTrafficPlugin {
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
        let origin = place(options, "origin")?;
        let destination = place(options, "destination")?;
        self.route = Some((origin, destination));
        Ok(())
    }

    async fn fetch(&self, ctx: FetchContext) -> Result<FetchResult, PluginError> {
        let Some((origin, destination)) = &self.route else {
            return Ok(FetchResult::NotConfigured {
                reason: "origin and destination are required".to_string(),
            });
        };

        let (outbound, inbound) = tokio::join!(
            self.estimate(&ctx, origin, destination),
            self.estimate(&ctx, destination, origin)
        );
        let routes = vec![outbound?, inbound?];
        debug!(
            outbound_secs = routes[0].duration_secs,
            inbound_secs = routes[1].duration_secs,
            "Routes fetched"
        );
        Ok(FetchResult::Traffic(TrafficReport { routes }))
    }

    fn metadata(&self) -> PluginMetadata {
        let mut config = BTreeMap::new();
        if let Some((origin, destination)) = &self.route {
            config.insert("origin".to_string(), origin.name.clone());
            config.insert("destination".to_string(), destination.name.clone());
        }
        self.info.metadata(config)
    }
}
