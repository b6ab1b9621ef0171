//! Bounded exponential-backoff retry for transient upstream failures.
//!
//! Only overload (503) and quota/rate (429) failures are retried. Anything
//! else is returned on the first attempt. When the attempt budget runs out on
//! transient failures the caller gets [`CallError::ServiceUnavailable`], which
//! is distinct from the upstream error so it can be presented as "try again
//! shortly".

use std::fmt;
use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::{debug, warn};

use crate::error::GeminiError;

/// Each wait is twice the previous one.
pub const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default wait before the second attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(3);

/// How many times to call and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Always at least 1.
    pub max_attempts: u32,
    /// Wait before attempt 2; doubles for every later attempt.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait that precedes attempt `attempt` (0-indexed). Attempt 0 has none.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay
            .mul_f64(BACKOFF_MULTIPLIER.powi(attempt as i32 - 1))
    }

    fn backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.base_delay,
            randomization_factor: 0.0,
            multiplier: BACKOFF_MULTIPLIER,
            max_interval: Duration::MAX,
            max_elapsed_time: None,
            ..Default::default()
        };
        // Default::default() leaves current_interval at the crate's own default.
        backoff.reset();
        backoff
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

/// Whether a failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClassification {
    /// Model overloaded (HTTP 503).
    Overloaded,
    /// Quota or rate limit hit (HTTP 429).
    ResourceExhausted,
    /// Everything else.
    Permanent,
}

impl ErrorClassification {
    pub fn is_transient(self) -> bool {
        !matches!(self, ErrorClassification::Permanent)
    }

    /// Classify from an HTTP status code. `None` when the code says nothing either way.
    pub fn from_status(code: u16) -> Option<Self> {
        match code {
            503 => Some(ErrorClassification::Overloaded),
            429 => Some(ErrorClassification::ResourceExhausted),
            _ => None,
        }
    }

    /// Classify from an error description by substring markers.
    ///
    /// This is a heuristic: an overload reported with unusual wording is
    /// classified as permanent and will not be retried.
    pub fn from_description(description: &str) -> Self {
        if description.contains("503") || description.to_lowercase().contains("overloaded") {
            ErrorClassification::Overloaded
        } else if description.contains("429")
            || description.contains("ResourceExhausted")
            || description.contains("RESOURCE_EXHAUSTED")
        {
            ErrorClassification::ResourceExhausted
        } else {
            ErrorClassification::Permanent
        }
    }
}

/// Errors that can tell whether they are transient.
pub trait Classify {
    fn classify(&self) -> ErrorClassification;
}

impl Classify for GeminiError {
    /// Structured status code first, description markers as fallback.
    fn classify(&self) -> ErrorClassification {
        self.code()
            .and_then(ErrorClassification::from_status)
            .unwrap_or_else(|| ErrorClassification::from_description(&self.to_string()))
    }
}

/// Final outcome of a failed [`call_with_retry`].
#[derive(Debug)]
pub enum CallError<E> {
    /// Every attempt failed with a transient error.
    ServiceUnavailable { attempts: u32, last_error: E },
    /// A non-transient error, returned without retrying.
    Permanent(E),
}

impl<E: fmt::Display> fmt::Display for CallError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::ServiceUnavailable {
                attempts,
                last_error,
            } => write!(
                f,
                "Service unavailable after {} attempts. Last error: {}",
                attempts, last_error
            ),
            CallError::Permanent(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for CallError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CallError::ServiceUnavailable { last_error, .. } => Some(last_error),
            CallError::Permanent(e) => Some(e),
        }
    }
}

/// Call `attempt` until it succeeds, fails permanently, or the policy runs out.
///
/// Waits `base_delay × 2^k` before attempt `k + 1`. Every attempt gets a fresh
/// counter and backoff; nothing is shared between concurrent calls. There is no
/// cancellation hook, wrap the whole call in a timeout if one is needed.
pub async fn call_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut attempt: F,
) -> Result<T, CallError<E>>
where
    E: Classify + fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = policy.backoff();
    let mut attempts = 0;

    loop {
        attempts += 1;

        let error = match attempt().await {
            Ok(value) => {
                if attempts > 1 {
                    debug!(attempt = attempts, "Upstream call recovered");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        let classification = error.classify();
        if !classification.is_transient() {
            debug!(attempt = attempts, error = %error, "Permanent upstream error, not retrying");
            return Err(CallError::Permanent(error));
        }

        if attempts >= max_attempts {
            warn!(
                attempts,
                ?classification,
                error = %error,
                "Upstream still unavailable, giving up"
            );
            return Err(CallError::ServiceUnavailable {
                attempts,
                last_error: error,
            });
        }

        let wait = backoff
            .next_backoff()
            .unwrap_or_else(|| policy.delay_before(attempts));
        warn!(
            attempt = attempts,
            max_attempts,
            ?classification,
            wait_secs = wait.as_secs_f64(),
            "Model busy (429/503), retrying"
        );
        tokio::time::sleep(wait).await;
    }
}
