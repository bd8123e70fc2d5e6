//! Validated process settings.
//!
//! [`Settings`] is immutable once built. The binary feeds it from CLI flags and the
//! environment, but the refresher itself only ever sees the validated value.

mod duration;

pub use duration::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Refresh interval applied when none is configured.
pub const DEFAULT_REFRESH_INTERVAL: &str = "1h";

/// Everything the refresher needs to run one credential pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
	/// File holding the subject (identity) token, re-read on every attempt.
	pub source_token_path: PathBuf,
	/// File that receives the exchanged access token.
	pub output_token_path: PathBuf,
	/// Token exchange endpoint.
	pub exchange_url: String,
	/// Upper bound on the time between refresh cycles.
	pub refresh_interval: Duration,
	/// Audience requested for the access token, if any.
	pub audience: Option<String>,
}
impl Settings {
	/// Starts a builder with no values populated.
	pub fn builder() -> SettingsBuilder {
		SettingsBuilder::default()
	}
}

/// Builder that validates raw settings before handing out a [`Settings`].
#[derive(Clone, Debug, Default)]
pub struct SettingsBuilder {
	source_token_path: Option<String>,
	output_token_path: Option<String>,
	exchange_url: Option<String>,
	refresh_interval: Option<String>,
	audience: Option<String>,
}
impl SettingsBuilder {
	/// Sets the subject token path (`SA_TOKEN_PATH`).
	pub fn source_token_path(mut self, path: impl Into<String>) -> Self {
		self.source_token_path = Some(path.into());

		self
	}

	/// Sets the output token path (`OUTPUT_TOKEN_PATH`).
	pub fn output_token_path(mut self, path: impl Into<String>) -> Self {
		self.output_token_path = Some(path.into());

		self
	}

	/// Sets the exchange endpoint (`EXCHANGE_URL`).
	pub fn exchange_url(mut self, url: impl Into<String>) -> Self {
		self.exchange_url = Some(url.into());

		self
	}

	/// Sets the raw refresh interval string (`REFRESH_INTERVAL`), e.g. `30m`.
	pub fn refresh_interval(mut self, interval: impl Into<String>) -> Self {
		self.refresh_interval = Some(interval.into());

		self
	}

	/// Sets the requested audience (`AUDIENCE`); empty values mean "no audience".
	pub fn audience(mut self, audience: impl Into<String>) -> Self {
		self.audience = Some(audience.into());

		self
	}

	/// Validates the collected values.
	///
	/// Paths and endpoint must be present and non-empty. An absent or empty interval
	/// falls back to [`DEFAULT_REFRESH_INTERVAL`]; whatever is used must parse to a
	/// positive duration.
	pub fn build(self) -> Result<Settings, ConfigError> {
		let source_token_path = required(self.source_token_path, "SA_TOKEN_PATH")?;
		let output_token_path = required(self.output_token_path, "OUTPUT_TOKEN_PATH")?;
		let exchange_url = required(self.exchange_url, "EXCHANGE_URL")?;
		let raw_interval = self
			.refresh_interval
			.filter(|value| !value.is_empty())
			.unwrap_or_else(|| DEFAULT_REFRESH_INTERVAL.to_owned());
		let refresh_interval = match parse_duration(&raw_interval) {
			Ok(interval) if interval.is_zero() =>
				return Err(ConfigError::NonPositiveInterval { value: raw_interval }),
			Ok(interval) => interval,
			Err(DurationParseError::Negative { .. }) =>
				return Err(ConfigError::NonPositiveInterval { value: raw_interval }),
			Err(source) => return Err(ConfigError::InvalidInterval { value: raw_interval, source }),
		};

		Ok(Settings {
			source_token_path: source_token_path.into(),
			output_token_path: output_token_path.into(),
			exchange_url,
			refresh_interval,
			audience: self.audience.filter(|value| !value.is_empty()),
		})
	}
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
	value.filter(|value| !value.is_empty()).ok_or(ConfigError::MissingSetting { name })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn complete() -> SettingsBuilder {
		Settings::builder()
			.source_token_path("/var/run/secrets/tokens/sa-token")
			.output_token_path("/var/run/secrets/tokens/access-token")
			.exchange_url("https://sts.example.com/token")
	}

	#[test]
	fn defaults_interval_and_drops_empty_audience() {
		let settings = complete().audience("").build().expect("Complete settings should build.");

		assert_eq!(settings.refresh_interval, Duration::from_secs(3_600));
		assert_eq!(settings.audience, None);
		assert_eq!(settings.source_token_path, PathBuf::from("/var/run/secrets/tokens/sa-token"));
		assert_eq!(settings.exchange_url, "https://sts.example.com/token");
	}

	#[test]
	fn keeps_explicit_interval_and_audience() {
		let settings = complete()
			.refresh_interval("15m")
			.audience("sts.example.com")
			.build()
			.expect("Settings with interval and audience should build.");

		assert_eq!(settings.refresh_interval, Duration::from_secs(900));
		assert_eq!(settings.audience.as_deref(), Some("sts.example.com"));
	}

	#[test]
	fn empty_interval_falls_back_to_default() {
		let settings =
			complete().refresh_interval("").build().expect("Empty interval should use default.");

		assert_eq!(settings.refresh_interval, Duration::from_secs(3_600));
	}

	#[test]
	fn missing_required_values_are_rejected() {
		let err = Settings::builder()
			.output_token_path("/tmp/out")
			.exchange_url("https://sts.example.com/token")
			.build()
			.expect_err("Missing source path should fail.");

		assert!(matches!(err, ConfigError::MissingSetting { name: "SA_TOKEN_PATH" }));

		let err = complete()
			.output_token_path("")
			.build()
			.expect_err("Empty output path should fail.");

		assert!(matches!(err, ConfigError::MissingSetting { name: "OUTPUT_TOKEN_PATH" }));

		let err = complete().exchange_url("").build().expect_err("Empty endpoint should fail.");

		assert!(matches!(err, ConfigError::MissingSetting { name: "EXCHANGE_URL" }));
	}

	#[test]
	fn unparseable_or_non_positive_intervals_are_rejected() {
		let err = complete()
			.refresh_interval("hourly")
			.build()
			.expect_err("Garbage interval should fail.");

		assert!(matches!(err, ConfigError::InvalidInterval { ref value, .. } if value == "hourly"));

		let err =
			complete().refresh_interval("0s").build().expect_err("Zero interval should fail.");

		assert!(matches!(err, ConfigError::NonPositiveInterval { .. }));

		let err = complete()
			.refresh_interval("-5m")
			.build()
			.expect_err("Negative interval should fail.");

		assert!(matches!(err, ConfigError::NonPositiveInterval { .. }));
	}
}
