//! Bounded exponential backoff with jitter around a single logical request.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{Result, TofuPilotError};

/// Statuses retried when no explicit set is configured.
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(30_000);
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Relative spread applied around each computed delay.
const JITTER_RATIO: f64 = 0.1;

/// How a client retries failed sends. Immutable once handed to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    pub enabled: bool,
    /// Retries after the first attempt. Total attempts are `max_retries + 1`.
    pub max_retries: u32,
    #[serde(rename = "initialDelayMs", with = "duration_ms")]
    pub initial_delay: Duration,
    #[serde(rename = "maxDelayMs", with = "duration_ms")]
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub retryable_status_codes: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.into_iter().collect(),
        }
    }
}

impl RetryPolicy {
    /// A policy that sends every request exactly once.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_retryable_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_status_codes = codes.into_iter().collect();
        self
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    /// Delay before retry number `attempt` (1-based), before jitter.
    ///
    /// `min(initial_delay * backoff_multiplier^(attempt - 1), max_delay)`
    pub fn compute_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let max = self.max_delay.as_secs_f64();

        if !secs.is_finite() || secs >= max {
            self.max_delay
        } else if secs <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(secs).unwrap_or(self.max_delay)
        }
    }
}

/// Source of uniformly distributed samples in `[0, 1)` used for jitter.
pub trait JitterSource: Send + Sync + fmt::Debug {
    fn sample(&self) -> f64;
}

/// Jitter backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..1.0)
    }
}

/// Always returns the same sample. `FixedJitter(0.5)` disables jitter entirely.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn sample(&self) -> f64 {
        self.0.clamp(0.0, 1.0)
    }
}

/// Applies ±10% jitter to `base` using a sample in `[0, 1)`.
///
/// Saturates at `Duration::MAX` when `base` is already at the top of the range.
fn jittered(base: Duration, sample: f64) -> Duration {
    let factor = 1.0 + JITTER_RATIO * (2.0 * sample.clamp(0.0, 1.0) - 1.0);
    Duration::try_from_secs_f64(base.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

/// Anything carrying an HTTP status the engine can classify.
pub trait HasStatus {
    fn status_code(&self) -> u16;
}

impl HasStatus for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

/// Drives one logical call through repeated send attempts.
#[derive(Debug, Clone)]
pub struct RetryEngine {
    policy: RetryPolicy,
    jitter: Arc<dyn JitterSource>,
}

impl RetryEngine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_jitter(policy, Arc::new(ThreadRngJitter))
    }

    pub fn with_jitter(policy: RetryPolicy, jitter: Arc<dyn JitterSource>) -> Self {
        Self { policy, jitter }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Jittered delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        jittered(self.policy.compute_delay(attempt), self.jitter.sample())
    }

    /// Runs `send` until it yields a final response.
    ///
    /// `send` receives the zero-based attempt number and must build a fresh
    /// request every time. A response whose status is retryable is dropped
    /// and the call is repeated, unless the retry budget is spent, in which
    /// case it is returned as is. Network failures are retried under the same
    /// budget. Cancellation aborts both sends and backoff sleeps and is never
    /// retried.
    pub async fn execute<T, F, Fut>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        mut send: F,
    ) -> Result<T>
    where
        T: HasStatus,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.policy.enabled {
            return cancellable(cancel, send(0)).await;
        }

        let max = self.policy.max_retries;
        let mut attempt: u32 = 0;

        loop {
            let failure = match cancellable(cancel, send(attempt)).await {
                Ok(response) => {
                    let status = response.status_code();
                    if !self.policy.is_retryable_status(status) || attempt >= max {
                        return Ok(response);
                    }
                    drop(response);
                    format!("status {}", status)
                }
                Err(err @ TofuPilotError::Network { .. }) if attempt < max => err.to_string(),
                Err(err) => return Err(err),
            };

            attempt += 1;
            let delay = self.delay_for(attempt);
            warn!(
                "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                operation,
                attempt,
                max.saturating_add(1),
                failure,
                delay.as_millis()
            );

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("{}: cancelled during backoff", operation);
                    return Err(TofuPilotError::Cancelled);
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

/// Races `fut` against the caller's cancellation token.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    if cancel.is_cancelled() {
        return Err(TofuPilotError::Cancelled);
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(TofuPilotError::Cancelled),
        result = fut => result,
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
