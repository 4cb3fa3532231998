//! Display webhook delivery
//!
//! Posts the assembled record to the TRMNL-style endpoint under a
//! `merge_variables` wrapper. There is no retry policy; the next scheduled
//! tick is the de facto retry.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};

/// Deliver one assembled record to the display webhook
pub async fn send(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    record: &Map<String, Value>,
) -> Result<()> {
    let body = json!({ "merge_variables": record });

    let response = client
        .post(url)
        .timeout(timeout)
        .json(&body)
        .send()
        .await
        .context("Webhook request failed")?;

    let status = response.status();
    if !status.is_success() {
        bail!("Webhook rejected payload with status {status}");
    }

    tracing::info!("Webhook accepted payload with status {}", status);
    Ok(())
}
