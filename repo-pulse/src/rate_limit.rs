//! Rate limiting utilities for the Azure DevOps API.
//!
//! Azure DevOps reports throttling through `Retry-After` and `X-RateLimit-*`
//! response headers. This module reads those headers and waits when asked to.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;
use tracing::{info, warn};

/// Maximum time to wait for a throttling window to pass.
const MAX_WAIT_SECS: u64 = 60;

/// Minimum remaining requests before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 5;

const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";
const LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Rate limit information reported on a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// Unix timestamp when the rate limit resets.
    pub reset: u64,
    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// Reads the `X-RateLimit-*` headers, if the server sent them.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Some(Self {
            remaining: header_number(headers, REMAINING_HEADER)?,
            reset: header_number(headers, RESET_HEADER)?,
            limit: header_number(headers, LIMIT_HEADER).unwrap_or(0),
        })
    }
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse::<T>()
        .ok()
}

/// Returns the `Retry-After` delay in seconds, if present.
#[must_use]
pub fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    header_number(headers, RETRY_AFTER.as_str())
}

/// Waits if the rate limit is low, returning true if we waited.
///
/// This function proactively waits when remaining requests fall below
/// `MIN_REMAINING_THRESHOLD` to avoid being throttled.
pub async fn wait_if_needed(info: &RateLimitInfo) -> bool {
    if info.remaining >= MIN_REMAINING_THRESHOLD {
        return false;
    }

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    if info.reset <= now {
        return false;
    }

    let wait_secs = info.reset - now;
    if wait_secs > MAX_WAIT_SECS {
        warn!(
            wait_secs,
            max_wait = MAX_WAIT_SECS,
            "Rate limit reset too far in future, capping wait time"
        );
    }

    let actual_wait = wait_secs.min(MAX_WAIT_SECS);
    info!(
        remaining = info.remaining,
        wait_secs = actual_wait,
        "Rate limit low, waiting for reset"
    );

    tokio::time::sleep(Duration::from_secs(actual_wait)).await;
    true
}

/// Waits for the duration given by a `Retry-After` header.
pub async fn wait_for_retry_after(retry_after_secs: u64) {
    let actual_wait = retry_after_secs.min(MAX_WAIT_SECS);
    info!(
        retry_after = retry_after_secs,
        actual_wait, "Received Retry-After header, waiting"
    );
    tokio::time::sleep(Duration::from_secs(actual_wait)).await;
}
