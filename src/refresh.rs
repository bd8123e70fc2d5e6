//! Refresh scheduling: the cycle loop, per-cycle retry with backoff, and shutdown.
//!
//! [`Refresher::run`] alternates between one retry-wrapped refresh and one sleep. The sleep is
//! the configured interval, shortened to the issued token's lifetime when that is known and
//! smaller. Cancellation is observed only while waiting (between cycles and between attempts);
//! an attempt that is already in flight always runs to completion.

mod backoff;
mod metrics;

pub use backoff::*;
pub use metrics::{RefreshMetrics, RefreshSnapshot};

// crates.io
use tracing::Instrument;
// self
use crate::{
	_prelude::*,
	config::Settings,
	exchange::{ExchangeRequest, ExchangeResult, TokenExchanger},
	obs::{self, RefreshOutcome},
	store,
};

/// How one retry-wrapped refresh ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
	/// A new access token was written.
	Refreshed {
		/// Lifetime reported by the endpoint, `0` when unknown.
		expires_in: u64,
	},
	/// Every attempt failed; the next cycle starts after the full interval.
	Exhausted,
	/// Shutdown was requested during a backoff wait.
	Cancelled,
}
impl CycleOutcome {
	/// Lifetime to schedule against, or `None` when the loop must stop.
	pub fn expires_in(self) -> Option<u64> {
		match self {
			Self::Refreshed { expires_in } => Some(expires_in),
			Self::Exhausted => Some(0),
			Self::Cancelled => None,
		}
	}
}

/// Keeps one access token fresh on disk.
pub struct Refresher<E>
where
	E: ?Sized + TokenExchanger,
{
	settings: Settings,
	exchanger: Arc<E>,
	policy: RetryPolicy,
	metrics: Arc<RefreshMetrics>,
}
impl<E> Refresher<E>
where
	E: ?Sized + TokenExchanger,
{
	/// Creates a refresher with the default [`RetryPolicy`].
	pub fn new(settings: Settings, exchanger: impl Into<Arc<E>>) -> Self {
		Self {
			settings,
			exchanger: exchanger.into(),
			policy: RetryPolicy::default(),
			metrics: Default::default(),
		}
	}

	/// Replaces the retry policy.
	pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Settings this refresher was built with.
	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	/// Shared counters for attempts and outcomes.
	pub fn metrics(&self) -> Arc<RefreshMetrics> {
		self.metrics.clone()
	}

	/// Runs refresh cycles until `cancel` fires.
	///
	/// Never fails: attempt errors are logged and retried, and shutdown is a normal return.
	pub async fn run(&self, cancel: &CancellationToken) {
		let mut cycle = 0_u64;

		loop {
			cycle += 1;

			let Some(sleep) = self.run_cycle(cancel).instrument(obs::cycle_span(cycle)).await
			else {
				obs::record_refresh_outcome(RefreshOutcome::Cancelled);
				tracing::info!(cycle, "Shutdown requested during retry backoff; stopping.");

				return;
			};

			if sleep_or_cancel(cancel, sleep).await {
				obs::record_refresh_outcome(RefreshOutcome::Cancelled);
				tracing::info!(cycle, "Shutdown requested while sleeping; stopping.");

				return;
			}
		}
	}

	/// Runs the retry loop once and returns the sleep that should follow it, or `None` when
	/// shutdown was requested.
	async fn run_cycle(&self, cancel: &CancellationToken) -> Option<Duration> {
		let expires_in = self.refresh_with_retry(cancel).await.expires_in()?;
		let sleep = next_sleep(self.settings.refresh_interval, expires_in);

		obs::record_next_refresh(sleep);
		tracing::info!(
			sleep_secs = sleep.as_secs(),
			next_refresh_at = %obs::wall_clock_after(sleep),
			"Scheduled next token refresh."
		);

		Some(sleep)
	}

	/// Attempts a refresh up to the policy's attempt ceiling, backing off between failures.
	pub async fn refresh_with_retry(&self, cancel: &CancellationToken) -> CycleOutcome {
		let mut backoff = Backoff::new(self.policy);

		loop {
			self.metrics.record_attempt();
			obs::record_refresh_outcome(RefreshOutcome::Attempt);

			let err = match self.refresh_once().await {
				Ok(result) => {
					self.metrics.record_success(result.expires_in);
					obs::record_refresh_outcome(RefreshOutcome::Success);
					tracing::info!(
						attempt = backoff.attempts() + 1,
						expires_in = result.expires_in,
						token_type = %result.token_type,
						issued_token_type = %result.issued_token_type,
						token_fingerprint = %result.access_token.fingerprint(),
						"Token refreshed."
					);

					return CycleOutcome::Refreshed { expires_in: result.expires_in };
				},
				Err(err) => err,
			};

			self.metrics.record_failure();
			obs::record_refresh_outcome(RefreshOutcome::Failure);
			tracing::warn!(
				attempt = backoff.attempts() + 1,
				max_attempts = self.policy.max_attempts,
				error_kind = err.kind(),
				error = %obs::display_chain(&err),
				"Token refresh attempt failed."
			);

			let Some(delay) = backoff.on_failure() else {
				self.metrics.record_exhausted();
				obs::record_refresh_outcome(RefreshOutcome::Exhausted);
				tracing::error!(
					max_attempts = self.policy.max_attempts,
					"Token refresh retries exhausted; continuing with the next cycle."
				);

				return CycleOutcome::Exhausted;
			};

			if sleep_or_cancel(cancel, delay).await {
				return CycleOutcome::Cancelled;
			}

			backoff.advance();
		}
	}

	/// Reads the subject token, exchanges it, and writes the access token. No retries.
	pub async fn refresh_once(&self) -> Result<ExchangeResult> {
		let subject_token = store::read_subject_token(&self.settings.source_token_path)?;
		let request = ExchangeRequest::new(subject_token, self.settings.audience.as_deref());
		let result = self.exchanger.exchange(&self.settings.exchange_url, &request).await?;

		store::write_access_token(&self.settings.output_token_path, &result.access_token)?;

		Ok(result)
	}
}
impl<E> Debug for Refresher<E>
where
	E: ?Sized + TokenExchanger,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Refresher")
			.field("settings", &self.settings)
			.field("policy", &self.policy)
			.finish()
	}
}

/// Sleep that should follow a cycle whose token lives `expires_in` seconds.
///
/// A known lifetime shorter than the interval wins; an unknown (`0`) or longer lifetime
/// falls back to the interval.
pub fn next_sleep(interval: Duration, expires_in: u64) -> Duration {
	if expires_in > 0 && expires_in < interval.as_secs() {
		Duration::from_secs(expires_in)
	} else {
		interval
	}
}

/// Waits for `duration` unless `cancel` fires first. Returns `true` when cancelled.
async fn sleep_or_cancel(cancel: &CancellationToken, duration: Duration) -> bool {
	tokio::select! {
		biased;

		() = cancel.cancelled() => true,
		() = tokio::time::sleep(duration) => false,
	}
}
