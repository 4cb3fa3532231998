//! `RouteBoard` - scheduled commute ETA and weather display notifier
//!
//! Each invocation runs one scheduler tick: decide whether route ETAs are
//! currently relevant, query the routing and weather upstreams, merge the
//! results into one flat record and deliver it to the display webhook.

use std::sync::LazyLock;

pub mod board;
pub mod config;
pub mod error;
pub mod holidays;
pub mod payload;
pub mod routing;
pub mod schedule;
pub mod summary;
pub mod weather;
pub mod webhook;

// Re-export core types for public API
pub use config::{BoardConfig, Coordinate};
pub use error::BoardError;
pub use routing::{RouteEstimate, RouteOutcome};
pub use summary::WeatherSummary;
pub use weather::ForecastDay;

/// Shared HTTP client for all upstream calls; timeouts are set per request.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
