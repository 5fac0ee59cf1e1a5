//! Exponential backoff with proportional jitter.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest jitter added on top of the exponential delay, as a fraction of it.
pub const JITTER_RATIO: f64 = 0.3;

/// Retry policy for one wrapped call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts are `max_retries + 1`
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

/// Source of jitter fractions in `[0, 1]`.
pub trait JitterSource: Send + Sync + std::fmt::Debug {
    fn fraction(&self) -> f64;
}

/// Uniform jitter from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn fraction(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..=1.0)
    }
}

/// Constant jitter for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn fraction(&self) -> f64 {
        self.0.clamp(0.0, 1.0)
    }
}

/// Delay before retrying after failed attempt `attempt` (0-based).
///
/// `min(base * 2^attempt + fraction * 0.3 * base * 2^attempt, max)`, rounded to
/// whole milliseconds.
pub fn backoff_delay(attempt: u32, config: &RetryConfig, jitter_fraction: f64) -> Duration {
    let exponential = config.base_delay_ms as f64 * 2f64.powi(attempt.min(62) as i32);
    let jitter = jitter_fraction.clamp(0.0, 1.0) * JITTER_RATIO * exponential;
    let delay = (exponential + jitter).min(config.max_delay_ms as f64);
    Duration::from_millis(delay.round() as u64)
}
