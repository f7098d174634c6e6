//! Shapes shared by every `DurableRuntime` implementation.

use std::time::Duration;

/// Mirrors the fixed activity retry policy named in the engine's executor
/// design: 3 attempts, 1s initial interval, 10s max interval, 2.0 backoff
/// coefficient, 5 minute start-to-close timeout.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub backoff_coefficient: f64,
    pub start_to_close_timeout: Duration,
}

impl RetryPolicy {
    /// The policy every Action node dispatch uses.
    pub fn activity_default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            backoff_coefficient: 2.0,
            start_to_close_timeout: Duration::from_secs(5 * 60),
        }
    }

    /// Interval to wait before the given attempt number (1-indexed: the
    /// delay that precedes attempt `n+1`), capped at `max_interval`.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let scaled = self.initial_interval.as_secs_f64() * self.backoff_coefficient.powi(attempt as i32 - 1);
        Duration::from_secs_f64(scaled.min(self.max_interval.as_secs_f64()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuntimeStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RuntimeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RuntimeStatus::Completed | RuntimeStatus::Failed | RuntimeStatus::Cancelled)
    }
}

/// Returned by `DurableRuntime::start`; identifies the started run for
/// later `describe`/`signal_cancel` calls.
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    pub runtime_workflow_id: String,
    pub run_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_capped() {
        let policy = RetryPolicy::activity_default();
        assert_eq!(policy.backoff_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_for_attempt(3), Duration::from_secs(4));
        assert_eq!(policy.backoff_for_attempt(10), Duration::from_secs(10));
    }
}
