//! Per-cycle retry state.

// self
use crate::_prelude::*;

/// Attempt ceiling and backoff bounds for one refresh cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Attempts per cycle, including the first one.
	pub max_attempts: u32,
	/// Wait after the first failed attempt.
	pub initial_backoff: Duration,
	/// Ceiling for the doubled wait.
	pub max_backoff: Duration,
}
impl RetryPolicy {
	const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(2);
	const DEFAULT_MAX_ATTEMPTS: u32 = 5;
	const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
			initial_backoff: Self::DEFAULT_INITIAL_BACKOFF,
			max_backoff: Self::DEFAULT_MAX_BACKOFF,
		}
	}
}

/// Exponential backoff with a cap, scoped to a single cycle.
///
/// A fresh value is created for every cycle, so nothing carries over between cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
	policy: RetryPolicy,
	attempts: u32,
	delay: Duration,
}
impl Backoff {
	/// Starts with zero failed attempts and the policy's initial delay.
	pub fn new(policy: RetryPolicy) -> Self {
		Self { policy, attempts: 0, delay: policy.initial_backoff }
	}

	/// Failed attempts recorded so far.
	pub fn attempts(&self) -> u32 {
		self.attempts
	}

	/// Wait that will follow the next failure.
	pub fn delay(&self) -> Duration {
		self.delay
	}

	/// Records a failed attempt.
	///
	/// Returns the wait before the next attempt, or `None` once the attempt ceiling is hit.
	pub fn on_failure(&mut self) -> Option<Duration> {
		self.attempts = self.attempts.saturating_add(1);

		if self.attempts >= self.policy.max_attempts { None } else { Some(self.delay) }
	}

	/// Doubles the delay after a completed wait, capped at the policy maximum.
	pub fn advance(&mut self) {
		self.delay = self.delay.saturating_mul(2).min(self.policy.max_backoff);
	}
}
