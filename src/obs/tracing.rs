// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::_prelude::*;

/// Opens the span that wraps one refresh cycle.
pub fn cycle_span(cycle: u64) -> tracing::Span {
	tracing::info_span!("token_refresher.cycle", cycle)
}

/// Renders an error followed by its `source()` chain, separated by `: `.
///
/// Transparent wrappers only print their own message, so logs would otherwise drop the
/// transport or filesystem cause.
pub fn display_chain(err: &dyn StdError) -> String {
	let mut rendered = err.to_string();
	let mut source = err.source();

	while let Some(cause) = source {
		let message = cause.to_string();

		if !rendered.ends_with(&message) {
			if rendered.ends_with('.') {
				rendered.pop();
			}

			rendered.push_str(": ");
			rendered.push_str(&message);
		}

		source = cause.source();
	}

	rendered
}

/// Wall-clock instant at which a sleep of `delay` ends, formatted as RFC 3339.
pub fn wall_clock_after(delay: Duration) -> String {
	let at = OffsetDateTime::now_utc() + delay;

	at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}
