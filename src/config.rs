//! Configuration management for the `RouteBoard` application
//!
//! The configuration is built exactly once at process entry from environment
//! variables and passed by reference into the orchestrator and each
//! component; nothing else reads ambient environment state.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::BoardError;

/// Default timeout for every upstream call (route, weather, webhook)
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Civil timezone the visibility windows are expressed in
const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Madrid;

/// Geographic coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Root configuration for one invocation
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Display webhook endpoint
    pub webhook_url: String,
    /// Google Routes API key
    pub route_api_key: String,
    /// MeteoSIX API key; absence disables weather enrichment
    pub weather_api_key: Option<String>,
    /// Route origin and first weather location
    pub home: Coordinate,
    /// Route destination and second weather location
    pub school: Coordinate,
    /// Optional intermediate stop for the via-waypoint route
    pub hospital: Option<Coordinate>,
    /// Raw holiday entries, single dates or `start..end` ranges
    pub holidays: Vec<String>,
    /// Reference timezone for the visibility windows
    pub timezone: Tz,
    pub route_timeout: Duration,
    pub weather_timeout: Duration,
    pub webhook_timeout: Duration,
}

impl BoardConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let webhook_url =
            env::var("TRMNL_WEBHOOK_URL").context("Missing TRMNL_WEBHOOK_URL env var")?;
        let route_api_key =
            env::var("GOOGLE_MAPS_API_KEY").context("Missing GOOGLE_MAPS_API_KEY env var")?;
        let weather_api_key = env::var("METEOSIX_API_KEY").ok().filter(|k| !k.is_empty());

        let home = coordinate_from_env("HOME")?
            .ok_or_else(|| BoardError::config("Missing HOME_LAT/HOME_LON env vars"))?;
        let school = coordinate_from_env("SCHOOL")?
            .ok_or_else(|| BoardError::config("Missing SCHOOL_LAT/SCHOOL_LON env vars"))?;
        let hospital = coordinate_from_env("HOSPITAL")?;

        let holidays = env::var("HOLIDAYS")
            .unwrap_or_default()
            .split(',')
            .map(str::to_string)
            .collect();

        let timezone = match env::var("REFERENCE_TZ") {
            Ok(name) => name
                .parse::<Tz>()
                .map_err(|e| BoardError::config(format!("Invalid REFERENCE_TZ: {e}")))?,
            Err(_) => DEFAULT_TIMEZONE,
        };

        let config = Self {
            webhook_url,
            route_api_key,
            weather_api_key,
            home,
            school,
            hospital,
            holidays,
            timezone,
            route_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            weather_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            webhook_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration settings; any failure aborts the
    /// invocation before a network call is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.webhook_url.is_empty() {
            return Err(BoardError::config("Webhook URL cannot be empty").into());
        }
        if !self.webhook_url.starts_with("http://") && !self.webhook_url.starts_with("https://") {
            return Err(
                BoardError::config("Webhook URL must be a valid HTTP or HTTPS URL").into(),
            );
        }
        if self.route_api_key.is_empty() {
            return Err(BoardError::config("Route API key cannot be empty").into());
        }

        for (name, coordinate) in [("home", Some(self.home)), ("school", Some(self.school)), ("hospital", self.hospital)] {
            if let Some(c) = coordinate {
                if c.latitude == 0.0 && c.longitude == 0.0 {
                    return Err(BoardError::config(format!(
                        "Coordinate '{name}' is zero; check its LAT/LON env vars"
                    ))
                    .into());
                }
                if !(-90.0..=90.0).contains(&c.latitude) || !(-180.0..=180.0).contains(&c.longitude)
                {
                    return Err(BoardError::config(format!(
                        "Coordinate '{name}' is out of range"
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }
}

/// Read `<PREFIX>_LAT`/`<PREFIX>_LON` as a coordinate pair. Both absent is
/// `None`; only one present is a configuration error.
fn coordinate_from_env(prefix: &str) -> Result<Option<Coordinate>> {
    let lat = env::var(format!("{prefix}_LAT")).ok();
    let lon = env::var(format!("{prefix}_LON")).ok();

    match (lat, lon) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => {
            let latitude = lat
                .parse::<f64>()
                .with_context(|| format!("Invalid {prefix}_LAT value: {lat}"))?;
            let longitude = lon
                .parse::<f64>()
                .with_context(|| format!("Invalid {prefix}_LON value: {lon}"))?;
            Ok(Some(Coordinate::new(latitude, longitude)))
        }
        _ => Err(BoardError::config(format!(
            "Both {prefix}_LAT and {prefix}_LON must be set together"
        ))
        .into()),
    }
}
