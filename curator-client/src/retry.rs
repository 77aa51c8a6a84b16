//! Retry/backoff policy for the status poll.
//!
//! An explicit value object rather than module constants, so tests can run
//! with near-zero delays and deployments can tune warmup behavior.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exponential backoff parameters for [`crate::RemoteClient::poll_status`].
///
/// Only the status poll retries: it is an idempotent GET whose known failure
/// mode is transient unavailability while the regeneration orchestrator
/// starts up. Writes never retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay before the first retry.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Base delay used for the first poll of a fresh job, absorbing
    /// orchestrator cold start.
    #[serde(default = "default_first_poll_base_delay_ms")]
    pub first_poll_base_delay_ms: u64,
    /// Upper bound on any single delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Delay growth factor per retry.
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
}

fn default_max_retries() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    2_000
}

fn default_first_poll_base_delay_ms() -> u64 {
    3_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_multiplier() -> u32 {
    2
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            first_poll_base_delay_ms: default_first_poll_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32, is_first_poll: bool) -> Duration {
        let base = if is_first_poll {
            self.first_poll_base_delay_ms
        } else {
            self.base_delay_ms
        };
        let factor = u64::from(self.multiplier).saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(base.saturating_mul(factor).min(self.max_delay_ms))
    }

    /// A policy with the default retry bound but no delays. For tests.
    pub fn immediate() -> Self {
        RetryPolicy {
            base_delay_ms: 0,
            first_poll_base_delay_ms: 0,
            max_delay_ms: 0,
            ..RetryPolicy::default()
        }
    }
}
