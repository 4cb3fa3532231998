//! One scheduler tick
//!
//! Computes the visibility decision exactly once, queries the upstreams
//! sequentially, degrades per failure, and always assembles and delivers a
//! payload. Route queries are skipped entirely outside the visibility
//! window to conserve API quota.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::config::BoardConfig;
use crate::routing::{self, RouteOutcome};
use crate::summary::{self, WeatherSummary};
use crate::{HTTP_CLIENT, payload, schedule, weather, webhook};

/// Departure is estimated this many minutes after the tick fires
const DEPARTURE_OFFSET_MINUTES: i64 = 15;

/// Run one full invocation: decide, fetch, merge, deliver.
pub async fn run_tick(config: &BoardConfig, now: DateTime<Utc>) -> Result<()> {
    let show_routes = schedule::should_show(now, config.timezone, &config.holidays);
    let departure_time = now + Duration::minutes(DEPARTURE_OFFSET_MINUTES);
    info!(
        show_routes,
        departure = %departure_time.with_timezone(&config.timezone),
        "Starting tick"
    );

    let direct;
    let via;
    if show_routes {
        direct = Some(query_route(config, "direct", None, departure_time).await);
        via = match config.hospital {
            Some(hospital) => {
                Some(query_route(config, "via_hospital", Some(hospital), departure_time).await)
            }
            None => {
                info!("No waypoint coordinate configured, via route not attempted");
                None
            }
        };
    } else {
        info!("Outside visibility window, skipping route queries");
        direct = None;
        via = None;
    }

    let weather_summaries = fetch_weather_summaries(config, now).await;

    // Route keys only appear in the payload when the window was open
    let routes: Vec<payload::NamedRoute<'_>> = if show_routes {
        vec![("direct", direct.as_ref()), ("via_hospital", via.as_ref())]
    } else {
        Vec::new()
    };

    let record = payload::assemble(
        show_routes,
        &routes,
        &weather_summaries,
        departure_time,
        now,
        config.timezone,
    );

    webhook::send(
        &HTTP_CLIENT,
        &config.webhook_url,
        config.webhook_timeout,
        &record,
    )
    .await
}

async fn query_route(
    config: &BoardConfig,
    name: &str,
    via: Option<crate::Coordinate>,
    departure: DateTime<Utc>,
) -> RouteOutcome {
    let outcome = routing::compute_route(
        &HTTP_CLIENT,
        &config.route_api_key,
        config.route_timeout,
        config.home,
        config.school,
        via,
        departure,
    )
    .await;

    match &outcome {
        Ok(estimate) => info!(
            route = name,
            duration = %estimate.duration,
            distance_meters = estimate.distance_meters,
            "Route query succeeded"
        ),
        Err(error) => warn!(route = name, %error, "Route query failed"),
    }
    outcome
}

/// Fetch and summarize forecasts for both locations. Weather is optional
/// end to end: no API key disables it, and a failed fetch for one location
/// only omits that location's summary.
async fn fetch_weather_summaries(
    config: &BoardConfig,
    now: DateTime<Utc>,
) -> Vec<(&'static str, WeatherSummary)> {
    let Some(api_key) = &config.weather_api_key else {
        info!("No weather API key configured, skipping weather enrichment");
        return Vec::new();
    };

    let mut summaries = Vec::new();
    for (label, location) in [("home", config.home), ("school", config.school)] {
        match weather::fetch_forecast(&HTTP_CLIENT, api_key, config.weather_timeout, location)
            .await
        {
            Ok(days) => {
                summaries.push((label, summary::summarize(&days, now, config.timezone)));
            }
            Err(error) => warn!(location = label, %error, "Weather query failed, omitting summary"),
        }
    }
    summaries
}
