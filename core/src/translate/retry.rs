/// Retry decisions for transient translation-service failures
use reqwest::StatusCode;
use std::time::{Duration, SystemTime};

/// Policy parameters for retry decisions.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Delay used for the first retry attempt.
    pub base_delay: Duration,
    /// Cap applied to every computed or server-hinted delay.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: u32,
}

impl RetryPolicy {
    pub const fn new(base_delay: Duration, max_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_retries,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30), 3)
    }
}

/// Error classes that influence retry decisions.
#[derive(Debug, Clone, Copy)]
pub enum RetryError {
    /// HTTP error with a status code and optional server-provided delay.
    Http {
        status: StatusCode,
        retry_hint: Option<Duration>,
    },
    /// Network-level failure without a status code.
    Network,
    /// Errors that must not be retried.
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDecision {
    pub should_retry: bool,
    pub delay: Duration,
}

impl RetryDecision {
    const fn no_retry() -> Self {
        Self {
            should_retry: false,
            delay: Duration::ZERO,
        }
    }

    fn retry_after(delay: Duration, max_delay: Duration) -> Self {
        Self {
            should_retry: true,
            delay: delay.min(max_delay),
        }
    }
}

/// Computes the next retry decision. `previous_attempts` counts retries
/// already made.
pub fn evaluate_retry(
    error: RetryError,
    policy: RetryPolicy,
    previous_attempts: u32,
) -> RetryDecision {
    if previous_attempts >= policy.max_retries {
        return RetryDecision::no_retry();
    }

    match error {
        RetryError::Fatal => RetryDecision::no_retry(),
        RetryError::Http { status, .. } if !is_retryable_status(status) => {
            RetryDecision::no_retry()
        }
        RetryError::Http {
            retry_hint: Some(hint),
            ..
        } => RetryDecision::retry_after(hint, policy.max_delay),
        RetryError::Http { .. } | RetryError::Network => RetryDecision::retry_after(
            exponential_backoff(policy.base_delay, previous_attempts),
            policy.max_delay,
        ),
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

fn exponential_backoff(base: Duration, previous_attempts: u32) -> Duration {
    let multiplier = 1u32.checked_shl(previous_attempts).unwrap_or(u32::MAX);
    base.saturating_mul(multiplier)
}

/// Parses an HTTP `Retry-After` header value, either delta-seconds or an
/// HTTP date. Returns `None` when parsing fails.
pub fn parse_retry_after(value: &str, now: SystemTime) -> Option<Duration> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(seconds) = trimmed.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    if let Ok(instant) = httpdate::parse_http_date(trimmed) {
        return Some(instant.duration_since(now).unwrap_or(Duration::ZERO));
    }

    None
}
