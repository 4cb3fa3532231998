//! Holiday calendar parsing and membership checks
//!
//! Entries come straight from configuration as strings: either a literal
//! `YYYY-MM-DD` date or an inclusive `YYYY-MM-DD..YYYY-MM-DD` range. The
//! list is parsed fresh on every invocation; malformed entries are skipped
//! with a warning and never abort the remaining entries.

use chrono::NaiveDate;
use tracing::warn;

const RANGE_SEPARATOR: &str = "..";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One configured holiday: a single date or an inclusive date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolidayEntry {
    Date(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

impl HolidayEntry {
    /// Parse a raw config entry. Blank entries (e.g. from a trailing comma)
    /// yield `None` silently; malformed ones warn and yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some((start, end)) = raw.split_once(RANGE_SEPARATOR) {
            let start = parse_date(start.trim(), raw)?;
            let end = parse_date(end.trim(), raw)?;
            Some(HolidayEntry::Range(start, end))
        } else {
            parse_date(raw, raw).map(HolidayEntry::Date)
        }
    }

    /// Whether `date` falls on this holiday (range bounds inclusive)
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            HolidayEntry::Date(d) => *d == date,
            HolidayEntry::Range(start, end) => *start <= date && date <= *end,
        }
    }
}

fn parse_date(raw: &str, entry: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(error) => {
            warn!("Skipping malformed holiday entry '{}': {}", entry, error);
            None
        }
    }
}

/// Parse all well-formed entries from the raw configuration list
pub fn parse_entries(raw: &[String]) -> Vec<HolidayEntry> {
    raw.iter().filter_map(|e| HolidayEntry::parse(e)).collect()
}

/// Whether `date` matches any configured holiday entry. Pure set-membership
/// semantics; short-circuits on the first match.
pub fn is_holiday(date: NaiveDate, entries: &[String]) -> bool {
    entries
        .iter()
        .filter_map(|e| HolidayEntry::parse(e))
        .any(|entry| entry.contains(date))
}
