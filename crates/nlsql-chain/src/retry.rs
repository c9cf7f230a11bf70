//! Bounded retry state machine for query execution
//!
//! ```text
//! Attempting --success------------------------> Succeeded
//!            --fatal store error--------------> Fatal            (stop)
//!            --recoverable, attempts left-----> Recoverable ----> Attempting
//!            --recoverable, none left---------> Exhausted        (stop)
//! ```

use crate::error::ErrorKind;
use crate::models::ExecutionOutcome;

/// Where the retry loop stands after an execution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    /// About to execute attempt number `attempt` (1-based)
    Attempting { attempt: usize },
    /// The store ran the query
    Succeeded { result_text: String },
    /// The query was rejected and another corrected attempt is allowed
    Recoverable { attempt: usize, message: String },
    /// The store is unusable; no further attempts
    Fatal { attempt: usize, message: String },
    /// The query was rejected and the attempt bound is reached
    Exhausted { attempt: usize, message: String },
}

impl AttemptState {
    /// Whether the loop stops in this state
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            AttemptState::Attempting { .. } | AttemptState::Recoverable { .. }
        )
    }
}

/// Attempt bound for recoverable execution errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_tries: usize,
}

impl RetryPolicy {
    /// Create a policy allowing `max_tries` total attempts (at least one)
    pub fn new(max_tries: usize) -> Self {
        Self {
            max_tries: max_tries.max(1),
        }
    }

    /// Total attempts allowed
    pub fn max_tries(&self) -> usize {
        self.max_tries
    }

    /// State to enter after `outcome` of attempt number `attempt`
    pub fn transition(&self, attempt: usize, outcome: ExecutionOutcome) -> AttemptState {
        match outcome {
            ExecutionOutcome::Success { result_text } => AttemptState::Succeeded { result_text },
            ExecutionOutcome::Failure {
                error_kind: ErrorKind::Fatal,
                message,
            } => AttemptState::Fatal { attempt, message },
            ExecutionOutcome::Failure {
                error_kind: ErrorKind::Recoverable,
                message,
            } => {
                if attempt < self.max_tries {
                    AttemptState::Recoverable { attempt, message }
                } else {
                    AttemptState::Exhausted { attempt, message }
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recoverable(message: &str) -> ExecutionOutcome {
        ExecutionOutcome::Failure {
            error_kind: ErrorKind::Recoverable,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_success_is_terminal() {
        let policy = RetryPolicy::new(3);
        let state = policy.transition(
            1,
            ExecutionOutcome::Success {
                result_text: "42".to_string(),
            },
        );
        assert_eq!(
            state,
            AttemptState::Succeeded {
                result_text: "42".to_string()
            }
        );
        assert!(state.is_terminal());
    }

    #[test]
    fn test_fatal_never_retries() {
        let policy = RetryPolicy::new(5);
        let state = policy.transition(
            1,
            ExecutionOutcome::Failure {
                error_kind: ErrorKind::Fatal,
                message: "unable to open database file".to_string(),
            },
        );
        assert!(state.is_terminal());
        assert!(matches!(state, AttemptState::Fatal { attempt: 1, .. }));
    }

    #[test]
    fn test_recoverable_until_bound() {
        let policy = RetryPolicy::new(3);
        assert!(!policy.transition(1, recoverable("e1")).is_terminal());
        assert!(!policy.transition(2, recoverable("e2")).is_terminal());

        let last = policy.transition(3, recoverable("e3"));
        assert_eq!(
            last,
            AttemptState::Exhausted {
                attempt: 3,
                message: "e3".to_string()
            }
        );
        assert!(last.is_terminal());
    }

    #[test]
    fn test_single_try_exhausts_immediately() {
        let policy = RetryPolicy::new(0);
        assert_eq!(policy.max_tries(), 1);
        assert!(matches!(
            policy.transition(1, recoverable("no such table: x")),
            AttemptState::Exhausted { .. }
        ));
    }
}
