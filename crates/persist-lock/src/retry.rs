use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

/// Default number of existence checks before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default wait between existence checks.
pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(2);

/// Delay schedule between existence checks.
///
/// `retry` is zero for the wait after the first sighting, one for the wait
/// after the second check, and so on.
pub trait Backoff: Send + Sync + fmt::Debug {
    fn delay(&self, retry: u32) -> Duration;
}

/// The same delay before every re-check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedBackoff(pub Duration);

impl Backoff for FixedBackoff {
    fn delay(&self, _retry: u32) -> Duration {
        self.0
    }
}

/// `base * 2^retry`, capped at `max`, optionally plus up to 25% random jitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub max: Duration,
    pub jitter: bool,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            jitter: false,
        }
    }

    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }
}

impl Backoff for ExponentialBackoff {
    fn delay(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        let delay = self.base.saturating_mul(factor).min(self.max);
        if !self.jitter {
            return delay;
        }
        let spread = u64::try_from(delay.as_millis() / 4).unwrap_or(u64::MAX);
        if spread == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..=spread))
    }
}

/// How many times to look for a lock and how long to wait in between.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Arc<dyn Backoff>,
}

impl RetryPolicy {
    /// `max_attempts` counts existence checks, including the first sighting.
    /// Values below one are raised to one.
    pub fn new(max_attempts: u32, backoff: impl Backoff + 'static) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Arc::new(backoff),
        }
    }

    pub fn fixed(max_attempts: u32, wait: Duration) -> Self {
        Self::new(max_attempts, FixedBackoff(wait))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self, retry: u32) -> Duration {
        self.backoff.delay(retry)
    }

    /// Sum of every wait the policy can impose before failing.
    pub fn worst_case_wait(&self) -> Duration {
        (0..self.max_attempts - 1)
            .map(|retry| self.backoff.delay(retry))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_MAX_ATTEMPTS, DEFAULT_WAIT_TIME)
    }
}
