//! Retry policy and the per-record attempt state machine.

use std::time::Duration;

use contentctl_core::Envelope;

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Growth factor applied per attempt.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 4,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// Default ceiling with no waiting; used by tests and local tooling.
    #[must_use]
    pub const fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// Whether a transient failure on zero-based `attempt` may be retried.
    #[must_use]
    pub const fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Delay before retrying after `attempt` failed.
    ///
    /// `rate_limit_reset` is the server's reset hint in seconds for a 429;
    /// the delay is then at least one second past the reset.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, rate_limit_reset: Option<u64>) -> Duration {
        let backoff = self
            .base_delay
            .saturating_mul(self.multiplier.saturating_pow(attempt));
        rate_limit_reset.map_or(backoff, |reset| {
            backoff.max(Duration::from_secs(reset.saturating_add(1)))
        })
    }
}

/// Classification of one attempt's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx status.
    Success,
    /// Network failure, 429, or 5xx.
    Transient,
    /// Anything else; retrying cannot help.
    Permanent,
}

impl Outcome {
    /// Classify an HTTP status.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            429 | 500..=599 => Self::Transient,
            _ => Self::Permanent,
        }
    }
}

/// States of one record's execution.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptState {
    /// About to send attempt number `attempt`.
    Attempting {
        /// Zero-based attempt number.
        attempt: u32,
    },
    /// Attempt `attempt` failed transiently; waiting `delay` before the next.
    Retrying {
        /// Attempt that failed.
        attempt: u32,
        /// Backoff before the next attempt.
        delay: Duration,
    },
    /// Terminal: the last attempt succeeded.
    Succeeded(Envelope),
    /// Terminal: the last attempt failed and no retry follows.
    Failed(Envelope),
}

impl AttemptState {
    /// Initial state for a record.
    #[must_use]
    pub const fn start() -> Self {
        Self::Attempting { attempt: 0 }
    }

    /// Next state after attempt `attempt` produced `envelope` classified as
    /// `outcome`. Marks `envelope.retrying` when another attempt follows.
    #[must_use]
    pub fn after_attempt(
        policy: &RetryPolicy,
        attempt: u32,
        outcome: Outcome,
        envelope: &mut Envelope,
        rate_limit_reset: Option<u64>,
    ) -> Self {
        envelope.attempt = attempt;
        match outcome {
            Outcome::Success => {
                envelope.retrying = false;
                Self::Succeeded(envelope.clone())
            }
            Outcome::Transient if policy.allows_retry(attempt) => {
                envelope.retrying = true;
                Self::Retrying {
                    attempt,
                    delay: policy.delay_for(attempt, rate_limit_reset),
                }
            }
            Outcome::Transient | Outcome::Permanent => {
                envelope.retrying = false;
                Self::Failed(envelope.clone())
            }
        }
    }

    /// Whether the state ends the record.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentctl_core::Arguments;

    #[test]
    fn default_backoff_grows_by_four() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0, None), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1, None), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2, None), Duration::from_secs(16));
    }

    #[test]
    fn rate_limit_reset_raises_the_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0, Some(5)), Duration::from_secs(6));
        assert_eq!(policy.delay_for(2, Some(1)), Duration::from_secs(16));
        assert_eq!(RetryPolicy::immediate(3).delay_for(0, Some(0)), Duration::from_secs(1));
    }

    #[test]
    fn huge_attempt_numbers_saturate() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_for(u32::MAX, None),
            Duration::from_secs(u64::from(u32::MAX))
        );
    }

    #[test]
    fn status_classification() {
        assert_eq!(Outcome::from_status(200), Outcome::Success);
        assert_eq!(Outcome::from_status(204), Outcome::Success);
        assert_eq!(Outcome::from_status(429), Outcome::Transient);
        assert_eq!(Outcome::from_status(503), Outcome::Transient);
        assert_eq!(Outcome::from_status(404), Outcome::Permanent);
        assert_eq!(Outcome::from_status(409), Outcome::Permanent);
        assert_eq!(Outcome::from_status(302), Outcome::Permanent);
    }

    #[test]
    fn transient_failures_retry_until_the_ceiling() {
        let policy = RetryPolicy::immediate(2);
        let mut envelope = Envelope::rejected(None, Arguments::new(), "TransportError", "down");

        let state = AttemptState::after_attempt(&policy, 0, Outcome::Transient, &mut envelope, None);
        assert!(matches!(state, AttemptState::Retrying { attempt: 0, .. }));
        assert!(envelope.retrying);

        let state = AttemptState::after_attempt(&policy, 2, Outcome::Transient, &mut envelope, None);
        assert!(state.is_terminal());
        match state {
            AttemptState::Failed(terminal) => {
                assert_eq!(terminal.attempt, 2);
                assert!(!terminal.retrying);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn permanent_failures_stop_immediately() {
        let policy = RetryPolicy::default();
        let mut envelope = Envelope::rejected(None, Arguments::new(), "x", "y");
        let state = AttemptState::after_attempt(&policy, 0, Outcome::Permanent, &mut envelope, None);
        assert!(matches!(state, AttemptState::Failed(_)));
        assert!(!AttemptState::start().is_terminal());
    }
}
