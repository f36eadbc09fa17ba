//! User-facing wording for failed generation calls.

use crate::llm::core::{Classify, FailureKind, LLMError};
use std::fmt;
use std::time::Duration;

/// Wait suggested to the user when the server gave no hint.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(15);

/// What to tell the user after a generation call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureNotice {
    /// Quota still exhausted after every retry. Worth trying again later.
    Throttled { cooldown: Duration },
    /// Any other failure from the service or the network.
    SignalLost,
    /// The credential is missing; retrying will not help.
    Misconfigured,
    /// The user abandoned the call.
    Cancelled,
}

impl FailureNotice {
    pub fn from_error(error: &LLMError) -> Self {
        match error.failure_kind() {
            FailureKind::RateLimited => FailureNotice::Throttled {
                cooldown: error
                    .retry_delay()
                    .filter(|d| !d.is_zero())
                    .unwrap_or(DEFAULT_COOLDOWN),
            },
            FailureKind::Configuration => FailureNotice::Misconfigured,
            FailureKind::Cancelled => FailureNotice::Cancelled,
            FailureKind::Terminal => FailureNotice::SignalLost,
        }
    }

    /// Short label for a toast.
    pub fn headline(&self) -> &'static str {
        match self {
            FailureNotice::Throttled { .. } => "AI Processor Throttled",
            FailureNotice::SignalLost => "Telemetry Link Failed",
            FailureNotice::Misconfigured => "Satellite Uplink Failed",
            FailureNotice::Cancelled => "Transmission Aborted",
        }
    }

    pub fn message(&self) -> String {
        match self {
            FailureNotice::Throttled { cooldown } => format!(
                "Signal Overload: Satellite processor is cooling down. Please wait {} seconds.",
                cooldown.as_secs().max(1)
            ),
            FailureNotice::SignalLost => {
                "Signal lost. Please check your data uplink and try again.".to_string()
            }
            FailureNotice::Misconfigured => {
                "Satellite Uplink Failed: API Key configuration missing.".to_string()
            }
            FailureNotice::Cancelled => "Transmission aborted.".to_string(),
        }
    }

    /// Whether the same request may succeed if sent again later.
    pub fn is_transient(&self) -> bool {
        matches!(self, FailureNotice::Throttled { .. } | FailureNotice::SignalLost)
    }
}

impl fmt::Display for FailureNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl From<&LLMError> for FailureNotice {
    fn from(error: &LLMError) -> Self {
        Self::from_error(error)
    }
}
