//! Reconnect backoff policy.
//!
//! Delay before reconnect attempt `n` (zero-based) is
//! `min(base_delay * 2^n, max_delay)`. With the defaults the sequence is
//! 1s, 2s, 4s, 8s, 16s and the client gives up after the fifth reconnect
//! fails.

use std::time::Duration;

use crate::env::Environment;

/// Delay before the first reconnect attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound on any single reconnect delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(30_000);

/// Reconnect attempts allowed before the client stays disconnected.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Randomization applied on top of the exponential delay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Jitter {
    /// Use the exponential delay as is.
    #[default]
    None,
    /// Pick uniformly from `[0, exponential delay]`.
    ///
    /// Spreads out reconnects when many clients lose the hub at once.
    Full,
}

/// Reconnect policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect
    pub base_delay: Duration,
    /// Cap on any single delay
    pub max_delay: Duration,
    /// Attempts before giving up
    pub max_attempts: u32,
    /// Randomization mode
    pub jitter: Jitter,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            jitter: Jitter::None,
        }
    }
}

impl ReconnectPolicy {
    /// Set the jitter mode.
    #[must_use]
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the attempt limit.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Exponential delay for a zero-based attempt, before jitter.
    pub fn exponential_delay(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Delay to wait before a zero-based attempt, with jitter applied.
    pub fn delay_for<E: Environment>(&self, attempt: u32, env: &E) -> Duration {
        let delay = self.exponential_delay(attempt);
        match self.jitter {
            Jitter::None => delay,
            Jitter::Full => delay.mul_f64(env.random_unit().clamp(0.0, 1.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct FixedEnv(u64);

    impl Environment for FixedEnv {
        type Instant = std::time::Instant;

        #[allow(clippy::disallowed_methods)]
        fn now(&self) -> Self::Instant {
            std::time::Instant::now()
        }

        fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            async {}
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            let bytes = self.0.to_be_bytes();
            for (i, byte) in buffer.iter_mut().enumerate() {
                *byte = bytes[i % bytes.len()];
            }
        }
    }

    #[test]
    fn default_sequence_doubles_from_one_second() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<u128> = (0..5).map(|n| policy.exponential_delay(n).as_millis()).collect();

        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000]);
    }

    #[test]
    fn delay_is_capped() {
        let policy = ReconnectPolicy::default();

        assert_eq!(policy.exponential_delay(5), Duration::from_millis(30_000));
        assert_eq!(policy.exponential_delay(31), Duration::from_millis(30_000));
        assert_eq!(policy.exponential_delay(u32::MAX), Duration::from_millis(30_000));
    }

    #[test]
    fn no_jitter_ignores_randomness() {
        let policy = ReconnectPolicy::default();

        assert_eq!(policy.delay_for(2, &FixedEnv(0)), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(2, &FixedEnv(u64::MAX)), Duration::from_millis(4000));
    }

    #[test]
    fn full_jitter_stays_within_bounds() {
        let policy = ReconnectPolicy::default().with_jitter(Jitter::Full);

        assert_eq!(policy.delay_for(3, &FixedEnv(0)), Duration::ZERO);
        assert_eq!(policy.delay_for(3, &FixedEnv(u64::MAX)), Duration::from_millis(8000));

        let mid = policy.delay_for(3, &FixedEnv(u64::MAX / 2));
        assert!(mid > Duration::from_millis(3900) && mid < Duration::from_millis(4100));
    }
}
