//! Outbound payload assembly
//!
//! Merges the visibility decision, up to two route outcomes and up to two
//! weather summaries into one flat key-value record. Assembly is total:
//! failed or unattempted upstreams contribute "N/A" defaults field by field,
//! and no combination of inputs can prevent a payload from being produced.

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value, json};

use crate::routing::{RouteLeg, RouteOutcome};
use crate::summary::{NOT_AVAILABLE, WeatherSummary};

/// A route slot in the payload: its display name plus its outcome, `None`
/// when the query was never attempted
pub type NamedRoute<'a> = (&'a str, Option<&'a RouteOutcome>);

/// Assemble the outbound record for one tick
#[must_use]
pub fn assemble(
    show_routes: bool,
    routes: &[NamedRoute<'_>],
    weather: &[(&str, WeatherSummary)],
    departure_time: DateTime<Utc>,
    now: DateTime<Utc>,
    tz: Tz,
) -> Map<String, Value> {
    let mut record = Map::new();

    record.insert("show_routes".to_string(), Value::Bool(show_routes));
    record.insert(
        "timestamp".to_string(),
        json!(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    record.insert(
        "departure_time".to_string(),
        json!(
            departure_time
                .with_timezone(&tz)
                .format("%Y-%m-%d %H:%M:%S %Z")
                .to_string()
        ),
    );

    for &(name, outcome) in routes {
        insert_route(&mut record, name, outcome);
    }

    for (label, summary) in weather {
        record.insert(format!("{label}_sky"), json!(summary.current_sky));
        record.insert(format!("{label}_icon"), json!(summary.current_icon));
        record.insert(format!("{label}_rain_soon"), json!(summary.rain_within_3h));
        record.insert(
            format!("{label}_precipitation_mm"),
            json!(summary.total_precipitation_today_mm),
        );
    }

    record
}

/// One route's fields; a failure or an unattempted query degrades every
/// field to "N/A" without touching the rest of the record
fn insert_route(record: &mut Map<String, Value>, name: &str, outcome: Option<&RouteOutcome>) {
    match outcome {
        Some(Ok(estimate)) => {
            record.insert(
                format!("{name}_eta"),
                json!(format_duration_as_minutes(&estimate.duration)),
            );
            record.insert(format!("{name}_duration"), json!(estimate.duration));
            record.insert(
                format!("{name}_distance_km"),
                json!(round2(estimate.distance_meters as f64 / 1000.0)),
            );
            record.insert(format!("{name}_polyline"), json!(estimate.polyline));
            record.insert(format!("{name}_legs"), json!(format_legs(&estimate.legs)));
        }
        Some(Err(_)) | None => insert_route_defaults(record, name),
    }
}

fn insert_route_defaults(record: &mut Map<String, Value>, name: &str) {
    for field in ["eta", "duration", "distance_km", "polyline", "legs"] {
        record.insert(format!("{name}_{field}"), json!(NOT_AVAILABLE));
    }
}

/// Flatten per-leg durations into one display string ("10 min + 11 min");
/// a route without leg data renders as "N/A"
fn format_legs(legs: &[RouteLeg]) -> String {
    if legs.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    legs.iter()
        .map(|leg| format_duration_as_minutes(&leg.duration))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Render an upstream duration string like `"1234s"` as whole minutes
/// ("21 min"); anything non-conforming renders as "N/A".
#[must_use]
pub fn format_duration_as_minutes(raw: &str) -> String {
    raw.strip_suffix('s')
        .and_then(|seconds| seconds.parse::<f64>().ok())
        .map_or_else(
            || NOT_AVAILABLE.to_string(),
            |seconds| format!("{} min", (seconds / 60.0).round() as i64),
        )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
