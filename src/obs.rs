//! Observability helpers for refresh cycles.
//!
//! # Feature Flags
//!
//! - Spans named `token_refresher.cycle` carry the `cycle` number; every log line emitted during
//!   a cycle inherits it.
//! - Enable `metrics` to increment the `token_refresher_refresh_total` counter for every
//!   attempt/success/failure/exhaustion/cancellation, labeled by `outcome`, and to publish the
//!   `token_refresher_next_refresh_seconds` gauge.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded while refreshing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// One refresh attempt started.
	Attempt,
	/// The attempt produced and persisted a new access token.
	Success,
	/// The attempt failed and will be retried or abandoned.
	Failure,
	/// The cycle ran out of attempts.
	Exhausted,
	/// Shutdown was requested while waiting.
	Cancelled,
}
impl RefreshOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshOutcome::Attempt => "attempt",
			RefreshOutcome::Success => "success",
			RefreshOutcome::Failure => "failure",
			RefreshOutcome::Exhausted => "exhausted",
			RefreshOutcome::Cancelled => "cancelled",
		}
	}
}
impl Display for RefreshOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
