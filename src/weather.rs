//! MeteoSIX numeric forecast client
//!
//! Fetches sky-state and precipitation-amount samples for a coordinate.
//! The upstream answers with up to 4 consecutive days of hourly-ish
//! samples, day 0 being today in the location's local calendar. Upstream
//! timestamps sometimes carry a non-colon UTC-offset suffix (`+01` instead
//! of `+01:00`); parsing is permissive about that, and samples that still
//! fail to parse are skipped with a warning rather than aborting the day.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::config::Coordinate;
use crate::error::BoardError;

const FORECAST_URL: &str = "https://servizos.meteogalicia.gal/apiv4/getNumericForecastInfo";
const FORECAST_VARIABLES: &str = "sky_state,precipitation_amount";

// Accepts "+01", "+0100" and "+01:00" offset suffixes
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%#z";

/// One forecast day: all sky-state and precipitation samples sharing a
/// local calendar date
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub sky_states: Vec<SkySample>,
    pub precipitation: Vec<PrecipSample>,
}

/// Sky-state code at an instant (upstream enumeration, e.g. "SUNNY")
#[derive(Debug, Clone, PartialEq)]
pub struct SkySample {
    pub at: DateTime<Utc>,
    pub code: String,
}

/// Precipitation amount at an instant
#[derive(Debug, Clone, PartialEq)]
pub struct PrecipSample {
    pub at: DateTime<Utc>,
    pub amount_mm: f64,
}

/// Parse an upstream forecast timestamp, tolerating minute-less offsets.
/// The offset is preserved so callers can still read the local calendar
/// date; convert to UTC only where instants are compared.
pub fn parse_forecast_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
}

/// Fetch the multi-day forecast for one coordinate
pub async fn fetch_forecast(
    client: &reqwest::Client,
    api_key: &str,
    timeout: Duration,
    location: Coordinate,
) -> Result<Vec<ForecastDay>, BoardError> {
    tracing::debug!(
        latitude = location.latitude,
        longitude = location.longitude,
        "Calling the forecast API"
    );

    let response = client
        .get(FORECAST_URL)
        .timeout(timeout)
        .query(&[
            (
                "coords",
                format!("{},{}", location.longitude, location.latitude),
            ),
            ("variables", FORECAST_VARIABLES.to_string()),
            ("API_KEY", api_key.to_string()),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(BoardError::api(
            format!("Forecast query returned {status}"),
            Some(status.as_u16()),
        ));
    }

    let body: meteosix::ForecastResponse = response
        .json()
        .await
        .map_err(|e| BoardError::parse(format!("Malformed forecast response: {e}")))?;

    Ok(ForecastDay::days_from_meteosix(&body))
}

/// `MeteoSIX` API response structures and conversion utilities
mod meteosix {
    use serde::Deserialize;
    use tracing::warn;

    use super::{ForecastDay, PrecipSample, SkySample, parse_forecast_timestamp};

    const SKY_STATE: &str = "sky_state";
    const PRECIPITATION_AMOUNT: &str = "precipitation_amount";

    /// GeoJSON-flavoured forecast response from `MeteoSIX`
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub features: Vec<Feature>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Feature {
        pub properties: Properties,
    }

    #[derive(Debug, Deserialize)]
    pub struct Properties {
        #[serde(default)]
        pub days: Vec<Day>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Day {
        #[serde(rename = "timePeriod")]
        pub time_period: TimePeriod,
        #[serde(default)]
        pub variables: Vec<Variable>,
    }

    #[derive(Debug, Deserialize)]
    pub struct TimePeriod {
        pub begin: TimeInstant,
    }

    #[derive(Debug, Deserialize)]
    pub struct TimeInstant {
        #[serde(rename = "timeInstant")]
        pub time_instant: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Variable {
        pub name: String,
        #[serde(default)]
        pub values: Vec<VariableValue>,
    }

    /// One sample; `value` is a string for sky states and a number for
    /// precipitation amounts
    #[derive(Debug, Deserialize)]
    pub struct VariableValue {
        #[serde(rename = "timeInstant")]
        pub time_instant: String,
        pub value: Option<serde_json::Value>,
    }

    impl ForecastDay {
        /// Convert a `MeteoSIX` response to forecast days, skipping any
        /// sample or day whose timestamp fails to parse
        pub fn days_from_meteosix(response: &ForecastResponse) -> Vec<ForecastDay> {
            let Some(feature) = response.features.first() else {
                warn!("Forecast response contains no features");
                return Vec::new();
            };

            let mut days = Vec::new();
            for day in &feature.properties.days {
                let begin = &day.time_period.begin.time_instant;
                // The day boundary is the location's local calendar date: a
                // day beginning at local midnight must not slip to the
                // previous date when its UTC instant does.
                let date = match parse_forecast_timestamp(begin) {
                    Ok(instant) => instant.date_naive(),
                    Err(error) => {
                        warn!("Skipping forecast day with bad begin '{}': {}", begin, error);
                        continue;
                    }
                };

                let mut sky_states = Vec::new();
                let mut precipitation = Vec::new();

                for variable in &day.variables {
                    match variable.name.as_str() {
                        SKY_STATE => {
                            for value in &variable.values {
                                let Some(at) = sample_instant(value) else {
                                    continue;
                                };
                                if let Some(code) =
                                    value.value.as_ref().and_then(|v| v.as_str())
                                {
                                    sky_states.push(SkySample {
                                        at,
                                        code: code.to_string(),
                                    });
                                }
                            }
                        }
                        PRECIPITATION_AMOUNT => {
                            for value in &variable.values {
                                let Some(at) = sample_instant(value) else {
                                    continue;
                                };
                                let Some(amount) =
                                    value.value.as_ref().and_then(|v| v.as_f64())
                                else {
                                    continue;
                                };
                                // Negative amounts are the upstream missing-data sentinel
                                if amount >= 0.0 {
                                    precipitation.push(PrecipSample {
                                        at,
                                        amount_mm: amount,
                                    });
                                }
                            }
                        }
                        other => {
                            tracing::debug!("Ignoring unrequested forecast variable '{}'", other);
                        }
                    }
                }

                days.push(ForecastDay {
                    date,
                    sky_states,
                    precipitation,
                });
            }
            days
        }
    }

    fn sample_instant(value: &VariableValue) -> Option<chrono::DateTime<chrono::Utc>> {
        match parse_forecast_timestamp(&value.time_instant) {
            Ok(at) => Some(at.with_timezone(&chrono::Utc)),
            Err(error) => {
                warn!(
                    "Skipping forecast sample with bad timestamp '{}': {}",
                    value.time_instant, error
                );
                None
            }
        }
    }
}
