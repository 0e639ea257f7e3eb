//! Rate limiting types.

use std::time::Duration;

/// Outcome of a "check and record" call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// The attempt was accepted and recorded.
    Allowed,
    /// The client submitted too recently.
    Limited {
        /// Time left until the client may submit again.
        retry_after: Duration,
    },
}

impl RateDecision {
    /// Whether the request may proceed.
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Whole seconds to advertise in `Retry-After`, rounded up.
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            Self::Allowed => 0,
            Self::Limited { retry_after } => {
                let secs = retry_after.as_secs();
                if retry_after.subsec_nanos() > 0 {
                    secs + 1
                } else {
                    secs.max(1)
                }
            }
        }
    }
}

/// Client identifier stored in request extensions after the rate check.
///
/// Either a normalized IP (`ip:...`) or a session id (`session:...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl std::fmt::Display for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_rounds_up() {
        let decision = RateDecision::Limited {
            retry_after: Duration::from_millis(2500),
        };
        assert_eq!(decision.retry_after_secs(), 3);
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_retry_after_never_zero_when_limited() {
        let decision = RateDecision::Limited {
            retry_after: Duration::ZERO,
        };
        assert_eq!(decision.retry_after_secs(), 1);
        assert_eq!(RateDecision::Allowed.retry_after_secs(), 0);
    }
}
