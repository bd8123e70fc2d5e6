//! Duration strings in the `300ms` / `1.5h` / `2h45m` notation used by container env vars.

// self
use crate::_prelude::*;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;
// Longest representable span, mirroring a signed 64-bit nanosecond counter.
const MAX_NANOS: u128 = i64::MAX as u128;
// Fraction digits beyond this cannot change a nanosecond result.
const MAX_FRACTION_DIGITS: usize = 18;

/// Failure produced by [`parse_duration`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum DurationParseError {
	/// Input was empty (or only a sign).
	#[error("Duration string is empty.")]
	Empty,
	/// Input is not a sequence of `<number><unit>` pairs.
	#[error("Duration `{input}` is malformed.")]
	InvalidFormat {
		/// Raw input.
		input: String,
	},
	/// A number is not followed by a unit.
	#[error("Duration `{input}` is missing a unit.")]
	MissingUnit {
		/// Raw input.
		input: String,
	},
	/// Unit suffix is not one of `ns`, `us`, `µs`, `ms`, `s`, `m`, `h`.
	#[error("Duration unit `{unit}` is unknown.")]
	UnknownUnit {
		/// Offending unit.
		unit: String,
	},
	/// Value is negative.
	#[error("Duration `{input}` is negative.")]
	Negative {
		/// Raw input.
		input: String,
	},
	/// Value does not fit the supported range.
	#[error("Duration `{input}` exceeds the supported range.")]
	OutOfRange {
		/// Raw input.
		input: String,
	},
}

/// Parses a duration such as `1h`, `90s`, `1.5h`, or `2h45m30s`.
///
/// The bare string `0` is accepted without a unit. Signs are allowed, but any negative
/// non-zero value is rejected with [`DurationParseError::Negative`].
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
	let invalid = || DurationParseError::InvalidFormat { input: input.to_owned() };
	let out_of_range = || DurationParseError::OutOfRange { input: input.to_owned() };
	let (negative, mut rest) = match input.as_bytes().first() {
		Some(b'-') => (true, &input[1..]),
		Some(b'+') => (false, &input[1..]),
		_ => (false, input),
	};

	if rest == "0" {
		return Ok(Duration::ZERO);
	}
	if rest.is_empty() {
		return Err(DurationParseError::Empty);
	}

	let mut total = 0_u128;

	while !rest.is_empty() {
		let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
		let (int_part, mut tail) = rest.split_at(int_len);
		let mut frac_part = "";

		if let Some(after_dot) = tail.strip_prefix('.') {
			let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();

			(frac_part, tail) = after_dot.split_at(frac_len);
		}
		if int_part.is_empty() && frac_part.is_empty() {
			return Err(invalid());
		}

		let unit_len = tail.find(|c: char| c == '.' || c.is_ascii_digit()).unwrap_or(tail.len());
		let (unit, next) = tail.split_at(unit_len);
		let scale = match unit {
			"ns" => 1,
			"us" | "µs" | "μs" => NANOS_PER_MICRO,
			"ms" => NANOS_PER_MILLI,
			"s" => NANOS_PER_SECOND,
			"m" => NANOS_PER_MINUTE,
			"h" => NANOS_PER_HOUR,
			"" => return Err(DurationParseError::MissingUnit { input: input.to_owned() }),
			other => return Err(DurationParseError::UnknownUnit { unit: other.to_owned() }),
		};
		let whole = if int_part.is_empty() {
			0
		} else {
			int_part.parse::<u128>().map_err(|_| out_of_range())?
		};
		let mut nanos = whole.checked_mul(scale).ok_or_else(out_of_range)?;

		if !frac_part.is_empty() {
			let digits = &frac_part[..frac_part.len().min(MAX_FRACTION_DIGITS)];
			let numerator = digits.parse::<u128>().map_err(|_| invalid())?;
			let denominator = 10_u128.pow(digits.len() as u32);

			nanos = nanos.checked_add(numerator * scale / denominator).ok_or_else(out_of_range)?;
		}

		total = total.checked_add(nanos).filter(|n| *n <= MAX_NANOS).ok_or_else(out_of_range)?;
		rest = next;
	}

	if negative && total > 0 {
		return Err(DurationParseError::Negative { input: input.to_owned() });
	}

	let nanos = u64::try_from(total).map_err(|_| out_of_range())?;

	Ok(Duration::from_nanos(nanos))
}
