use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Total attempts (first try included) and the base of the exponential delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
        }
    }

    /// Delay before the next attempt after `failed_attempts` failures.
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        Duration::from_millis(backoff_delay_ms(self.base_delay_ms, failed_attempts))
    }
}

pub fn backoff_delay_ms(base_delay_ms: u64, failed_attempts: u32) -> u64 {
    let exponent = failed_attempts.saturating_sub(1).min(16);
    base_delay_ms.saturating_mul(1 << exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_doubles_from_one_second() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_after(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(2000));
    }

    #[test]
    fn exponent_is_capped() {
        assert_eq!(backoff_delay_ms(1, 100), 1 << 16);
        assert_eq!(backoff_delay_ms(u64::MAX, 3), u64::MAX);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let policy: RetryPolicy = serde_json::from_str(r#"{"base_delay_ms": 10}"#).unwrap();
        assert_eq!(policy.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(policy.base_delay_ms, 10);
    }
}
