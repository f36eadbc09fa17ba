use serde::Deserialize;
use std::time::Duration;

/// Configuration for rate-limit retry behavior.
///
/// Immutable for the duration of a logical call. Backoff doubles after each
/// retry; the multiplier is not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional attempts after the first failure (0 means no retries).
    pub max_retries: u32,
    /// Wait before the first retry, before jitter.
    #[serde(with = "millis")]
    pub initial_backoff: Duration,
    /// Exclusive upper bound of the random delay added to each wait.
    #[serde(with = "millis")]
    pub jitter_max: Duration,
}

/// Growth factor applied to the backoff after every retry.
pub const BACKOFF_MULTIPLIER: u32 = 2;

impl Default for RetryConfig {
    /// Defaults tuned for Gemini free-tier quotas.
    ///
    /// - 4 retries (5 attempts total)
    /// - 3 second initial backoff
    /// - up to 1 second of jitter
    fn default() -> Self {
        Self {
            max_retries: 4,
            initial_backoff: Duration::from_millis(3000),
            jitter_max: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_backoff: Duration, jitter_max: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            jitter_max,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    pub fn with_jitter_max(mut self, jitter_max: Duration) -> Self {
        self.jitter_max = jitter_max;
        self
    }

    /// More attempts, shorter waits.
    pub fn aggressive() -> Self {
        Self {
            max_retries: 6,
            initial_backoff: Duration::from_millis(500),
            jitter_max: Duration::from_millis(250),
        }
    }

    /// Fewer attempts, longer waits.
    pub fn conservative() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(5000),
            jitter_max: Duration::from_millis(2000),
        }
    }

    /// A single attempt, no retry.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(0),
            jitter_max: Duration::from_millis(0),
        }
    }
}

/// Whole milliseconds for log fields, saturating at `u64::MAX`.
pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.initial_backoff, Duration::from_millis(3000));
        assert_eq!(config.jitter_max, Duration::from_millis(1000));
    }

    #[test]
    fn test_disabled_config() {
        let config = RetryConfig::disabled();
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.initial_backoff, Duration::ZERO);
    }

    #[test]
    fn test_presets() {
        assert_eq!(RetryConfig::aggressive().max_retries, 6);
        assert_eq!(
            RetryConfig::conservative().initial_backoff,
            Duration::from_millis(5000)
        );
    }

    #[test]
    fn log_millis_saturate() {
        assert_eq!(saturating_millis(Duration::from_millis(3000)), 3000);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn deserializes_millis_with_defaults() {
        let config: RetryConfig =
            serde_json::from_str(r#"{"max_retries": 2, "initial_backoff": 250}"#).unwrap();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.jitter_max, Duration::from_millis(1000));
    }
}
