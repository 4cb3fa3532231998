//! Visibility window policy
//!
//! Route ETAs are only relevant around the school run: [07:30, 09:00] and
//! [13:30, 14:45] in the reference civil timezone, bounds inclusive, and
//! never on a configured holiday. Evaluating against the configured
//! timezone rather than the host timezone matters because daylight-saving
//! transitions shift the UTC offset of the windows.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::holidays;

/// Morning window in minutes since local midnight, inclusive
const MORNING_WINDOW: (u32, u32) = (450, 540); // 07:30 - 09:00
/// Afternoon window in minutes since local midnight, inclusive
const AFTERNOON_WINDOW: (u32, u32) = (810, 885); // 13:30 - 14:45

/// Whether routes should be shown at `now`. Pure function of the instant,
/// the reference timezone and the raw holiday entries.
#[must_use]
pub fn should_show(now: DateTime<Utc>, tz: Tz, holiday_entries: &[String]) -> bool {
    let local = now.with_timezone(&tz);

    // A holiday overrides the time-of-day windows entirely
    if holidays::is_holiday(local.date_naive(), holiday_entries) {
        return false;
    }

    let minutes = local.hour() * 60 + local.minute();
    in_window(minutes, MORNING_WINDOW) || in_window(minutes, AFTERNOON_WINDOW)
}

fn in_window(minutes: u32, (start, end): (u32, u32)) -> bool {
    (start..=end).contains(&minutes)
}
