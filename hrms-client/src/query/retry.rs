// hrms-client/src/query/retry.rs
// 重试策略

use std::time::Duration;

use crate::error::{ClientError, ErrorKind};

/// Retry policy shared by queries and mutations
///
/// Only [`ErrorKind::Transient`] failures are retried. Delay before retry `n`
/// (zero-based) is `min(base_delay * 2^n, max_delay)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Query default: 3 retries, 1s doubling, capped at 30s
    pub const fn queries() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }

    /// Mutation default: a single retry
    pub const fn mutations() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }

    /// No retries at all
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Whether a request that has failed `failures` times should go again
    pub fn should_retry(&self, err: &ClientError, failures: u32) -> bool {
        err.kind() == ErrorKind::Transient && failures < self.max_retries
    }

    /// Delay before retry number `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::queries()
    }
}
