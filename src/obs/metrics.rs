// self
use crate::{_prelude::*, obs::RefreshOutcome};

/// Records a refresh outcome via the global metrics recorder (when enabled).
pub fn record_refresh_outcome(outcome: RefreshOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("token_refresher_refresh_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Publishes the delay until the next refresh cycle (when enabled).
pub fn record_next_refresh(delay: Duration) {
	#[cfg(feature = "metrics")]
	{
		metrics::gauge!("token_refresher_next_refresh_seconds").set(delay.as_secs_f64());
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = delay;
	}
}
