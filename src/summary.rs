//! Weather forecast summarization
//!
//! Reduces a multi-day forecast to what the display actually shows for the
//! current instant: the sky state closest to now, its display icon, whether
//! rain is expected within the next three hours, and today's total
//! precipitation.

use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::weather::ForecastDay;

/// Placeholder for data the upstream did not provide
pub const NOT_AVAILABLE: &str = "N/A";

/// Local hours treated as night for icon selection: >= 20:00 or < 08:00
const NIGHT_START_HOUR: u32 = 20;
const NIGHT_END_HOUR: u32 = 8;

/// How far ahead to look for imminent rain
const RAIN_LOOKAHEAD_HOURS: i64 = 3;

/// Current-conditions summary derived from today's forecast samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    /// Upstream sky-state code, or "N/A"
    pub current_sky: String,
    /// Display icon for the sky state, empty when no sample was usable
    pub current_icon: String,
    /// Any precipitation sample > 0 within [now, now + 3h]
    pub rain_within_3h: bool,
    /// Full-day precipitation total in mm, rounded to 1 decimal place
    pub total_precipitation_today_mm: f64,
}

impl Default for WeatherSummary {
    fn default() -> Self {
        Self {
            current_sky: NOT_AVAILABLE.to_string(),
            current_icon: String::new(),
            rain_within_3h: false,
            total_precipitation_today_mm: 0.0,
        }
    }
}

/// Reduce a forecast to the summary for the current instant. Missing days
/// or empty sample lists degrade to the all-default summary, never an error.
#[must_use]
pub fn summarize(days: &[ForecastDay], now: DateTime<Utc>, tz: Tz) -> WeatherSummary {
    let local = now.with_timezone(&tz);
    let today = local.date_naive();

    let Some(day) = days.iter().find(|d| d.date == today) else {
        tracing::debug!("No forecast day matches local date {}", today);
        return WeatherSummary::default();
    };

    // Closest past sample wins; fall back to the closest future one
    let current = day
        .sky_states
        .iter()
        .filter(|s| s.at <= now)
        .max_by_key(|s| s.at)
        .or_else(|| {
            day.sky_states
                .iter()
                .filter(|s| s.at > now)
                .min_by_key(|s| s.at)
        });

    let (current_sky, current_icon) = match current {
        Some(sample) => (
            sample.code.clone(),
            icon_for(&sample.code, is_night(local.hour())).to_string(),
        ),
        None => (NOT_AVAILABLE.to_string(), String::new()),
    };

    let deadline = now + Duration::hours(RAIN_LOOKAHEAD_HOURS);
    let rain_within_3h = day
        .precipitation
        .iter()
        .any(|p| p.at >= now && p.at <= deadline && p.amount_mm > 0.0);

    let total: f64 = day.precipitation.iter().map(|p| p.amount_mm).sum();
    let total_precipitation_today_mm = (total * 10.0).round() / 10.0;

    WeatherSummary {
        current_sky,
        current_icon,
        rain_within_3h,
        total_precipitation_today_mm,
    }
}

fn is_night(local_hour: u32) -> bool {
    local_hour >= NIGHT_START_HOUR || local_hour < NIGHT_END_HOUR
}

/// Display icon for a sky-state code. Night overrides apply to the codes
/// whose visual differs after dark; unmapped codes fall back to the
/// clear-sky icon, so this lookup can never fail.
#[must_use]
pub fn icon_for(code: &str, night: bool) -> &'static str {
    if night {
        if let Some(icon) = night_icon(code) {
            return icon;
        }
    }
    day_icon(code)
}

fn day_icon(code: &str) -> &'static str {
    match code {
        "SUNNY" => "icons/sunny.png",
        "HIGH_CLOUDS" => "icons/high_clouds.png",
        "PARTLY_CLOUDY" => "icons/partly_cloudy.png",
        "MID_CLOUDS" => "icons/mid_clouds.png",
        "CLOUDY" => "icons/cloudy.png",
        "OVERCAST" => "icons/overcast.png",
        "OVERCAST_AND_SHOWERS" => "icons/overcast_showers.png",
        "WEAK_RAIN" | "DRIZZLE" => "icons/drizzle.png",
        "RAIN" => "icons/rain.png",
        "SHOWERS" => "icons/showers.png",
        "STORMS" | "SHOWERS_WITH_STORMS" => "icons/storms.png",
        "SNOW" | "INTERMITTENT_SNOW" => "icons/snow.png",
        "FOG" | "FOG_BANK" => "icons/fog.png",
        "MIST" => "icons/mist.png",
        _ => "icons/sunny.png",
    }
}

fn night_icon(code: &str) -> Option<&'static str> {
    match code {
        "SUNNY" => Some("icons/clear_night.png"),
        "HIGH_CLOUDS" => Some("icons/high_clouds_night.png"),
        "PARTLY_CLOUDY" => Some("icons/partly_cloudy_night.png"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{PrecipSample, SkySample};
    use chrono::TimeZone;
    use chrono_tz::Europe::Madrid;
    use rstest::rstest;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Madrid
            .with_ymd_and_hms(2025, 3, 12, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn day_with(sky: Vec<SkySample>, precipitation: Vec<PrecipSample>) -> ForecastDay {
        ForecastDay {
            date: chrono::NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            sky_states: sky,
            precipitation,
        }
    }

    fn sky(h: u32, code: &str) -> SkySample {
        SkySample {
            at: utc(h, 0),
            code: code.to_string(),
        }
    }

    fn precip(h: u32, amount_mm: f64) -> PrecipSample {
        PrecipSample {
            at: utc(h, 0),
            amount_mm,
        }
    }

    #[test]
    fn test_no_matching_day_yields_default() {
        let tomorrow = ForecastDay {
            date: chrono::NaiveDate::from_ymd_opt(2025, 3, 13).unwrap(),
            sky_states: vec![sky(9, "RAIN")],
            precipitation: vec![],
        };
        let summary = summarize(&[tomorrow], utc(8, 0), Madrid);
        assert_eq!(summary, WeatherSummary::default());
        assert_eq!(summary.current_sky, "N/A");
    }

    #[test]
    fn test_empty_sample_lists_yield_default() {
        let day = day_with(vec![], vec![]);
        let summary = summarize(&[day], utc(8, 0), Madrid);
        assert_eq!(summary, WeatherSummary::default());
    }

    #[test]
    fn test_closest_past_sample_is_preferred() {
        let day = day_with(
            vec![sky(6, "FOG"), sky(7, "SUNNY"), sky(10, "RAIN")],
            vec![],
        );
        let summary = summarize(&[day], utc(8, 30), Madrid);
        assert_eq!(summary.current_sky, "SUNNY");
    }

    #[test]
    fn test_sample_exactly_at_now_counts_as_past() {
        let day = day_with(vec![sky(8, "CLOUDY"), sky(11, "SUNNY")], vec![]);
        let summary = summarize(&[day], utc(8, 0), Madrid);
        assert_eq!(summary.current_sky, "CLOUDY");
    }

    #[test]
    fn test_falls_back_to_closest_future_sample() {
        let day = day_with(vec![sky(12, "OVERCAST"), sky(15, "RAIN")], vec![]);
        let summary = summarize(&[day], utc(8, 0), Madrid);
        assert_eq!(summary.current_sky, "OVERCAST");
        assert_eq!(summary.current_icon, "icons/overcast.png");
    }

    #[test]
    fn test_rain_within_three_hours_inclusive() {
        let day = day_with(
            vec![sky(8, "RAIN")],
            vec![precip(9, 0.0), precip(11, 0.8)],
        );
        // 11:00 is exactly now + 3h
        let summary = summarize(&[day], utc(8, 0), Madrid);
        assert!(summary.rain_within_3h);
    }

    #[test]
    fn test_rain_beyond_three_hours_does_not_count() {
        let day = day_with(vec![sky(8, "SUNNY")], vec![precip(12, 2.0)]);
        let summary = summarize(&[day], utc(8, 0), Madrid);
        assert!(!summary.rain_within_3h);
    }

    #[test]
    fn test_zero_amount_within_window_does_not_count() {
        let day = day_with(vec![sky(8, "CLOUDY")], vec![precip(9, 0.0)]);
        let summary = summarize(&[day], utc(8, 0), Madrid);
        assert!(!summary.rain_within_3h);
    }

    #[test]
    fn test_total_is_full_day_and_rounded() {
        let day = day_with(
            vec![sky(8, "RAIN")],
            vec![precip(1, 0.13), precip(9, 1.21), precip(22, 2.4)],
        );
        let summary = summarize(&[day], utc(8, 0), Madrid);
        // 0.13 + 1.21 + 2.4 = 3.74 -> 3.7, not filtered to the 3h window
        assert_eq!(summary.total_precipitation_today_mm, 3.7);
    }

    #[rstest]
    #[case("SUNNY", false, "icons/sunny.png")]
    #[case("SUNNY", true, "icons/clear_night.png")]
    #[case("PARTLY_CLOUDY", true, "icons/partly_cloudy_night.png")]
    #[case("RAIN", true, "icons/rain.png")] // no night variant
    #[case("SOMETHING_NEW", false, "icons/sunny.png")] // unmapped -> clear fallback
    #[case("SOMETHING_NEW", true, "icons/sunny.png")]
    fn test_icon_mapping(#[case] code: &str, #[case] night: bool, #[case] expected: &str) {
        assert_eq!(icon_for(code, night), expected);
    }

    #[rstest]
    #[case(7, true)]
    #[case(8, false)]
    #[case(19, false)]
    #[case(20, true)]
    #[case(0, true)]
    fn test_night_definition(#[case] hour: u32, #[case] expected: bool) {
        assert_eq!(is_night(hour), expected);
    }

    #[test]
    fn test_night_icon_selected_by_local_hour() {
        // 21:00 Madrid local
        let day = day_with(vec![sky(21, "SUNNY")], vec![]);
        let summary = summarize(&[day], utc(21, 0), Madrid);
        assert_eq!(summary.current_icon, "icons/clear_night.png");
    }
}
