// std
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// Lock-free counters shared between the refresher and whoever reports on it.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
	exhausted_cycles: AtomicU64,
	last_expires_in: AtomicU64,
}
impl RefreshMetrics {
	/// Copies every counter at once.
	///
	/// Counters are read individually, so a snapshot taken mid-attempt may be one event apart
	/// between fields.
	pub fn snapshot(&self) -> RefreshSnapshot {
		RefreshSnapshot {
			attempts: self.attempts.load(Relaxed),
			successes: self.successes.load(Relaxed),
			failures: self.failures.load(Relaxed),
			exhausted_cycles: self.exhausted_cycles.load(Relaxed),
			last_expires_in: self.last_expires_in.load(Relaxed),
		}
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Relaxed);
	}

	pub(crate) fn record_success(&self, expires_in: u64) {
		self.successes.fetch_add(1, Relaxed);
		self.last_expires_in.store(expires_in, Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Relaxed);
	}

	pub(crate) fn record_exhausted(&self) {
		self.exhausted_cycles.fetch_add(1, Relaxed);
	}
}

/// Point-in-time copy of [`RefreshMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshSnapshot {
	/// Refresh attempts started.
	pub attempts: u64,
	/// Attempts that wrote a new access token.
	pub successes: u64,
	/// Attempts that failed for any reason.
	pub failures: u64,
	/// Cycles abandoned after running out of attempts.
	pub exhausted_cycles: u64,
	/// `expires_in` of the most recent successful exchange, `0` before the first one.
	pub last_expires_in: u64,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn snapshot_tracks_latest_lifetime() {
		let metrics = RefreshMetrics::default();

		metrics.record_attempt();
		metrics.record_failure();
		metrics.record_attempt();
		metrics.record_success(1800);
		metrics.record_attempt();
		metrics.record_success(0);

		assert_eq!(
			metrics.snapshot(),
			RefreshSnapshot {
				attempts: 3,
				successes: 2,
				failures: 1,
				exhausted_cycles: 0,
				last_expires_in: 0,
			}
		);
	}
}
