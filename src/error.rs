//! Refresher-level error types shared across configuration, exchange, and token files.

// std
use std::{io, path::PathBuf};
// self
use crate::_prelude::*;

/// Refresher-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical refresher error exposed by public APIs.
///
/// Everything except [`Error::Config`] is produced by a single refresh attempt and is
/// absorbed by the retry loop; configuration failures are fatal at startup.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint rejected the request or answered with something unusable.
	#[error(transparent)]
	Exchange(#[from] ExchangeError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Subject token file could not be read.
	#[error("Failed to read subject token from {}.", path.display())]
	SubjectTokenRead {
		/// Source token path.
		path: PathBuf,
		/// Underlying filesystem failure.
		#[source]
		source: io::Error,
	},
	/// Access token could not be persisted.
	#[error("Failed to write access token to {}.", path.display())]
	OutputWrite {
		/// Output token path.
		path: PathBuf,
		/// Underlying filesystem failure.
		#[source]
		source: io::Error,
	},
}
impl Error {
	/// Returns a stable label suitable for log or metric fields.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Config(_) => "config",
			Self::Exchange(ExchangeError::InvalidEndpoint { .. }) => "request",
			Self::Exchange(ExchangeError::Status { .. }) => "protocol",
			Self::Exchange(ExchangeError::Decode { .. }) => "decode",
			Self::Transport(_) => "transport",
			Self::SubjectTokenRead { .. } => "subject_token_read",
			Self::OutputWrite { .. } => "output_write",
		}
	}
}

/// Configuration and validation failures raised before the scheduler starts.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required setting is absent or empty.
	#[error("{name} is required.")]
	MissingSetting {
		/// Setting name as exposed to operators.
		name: &'static str,
	},
	/// Refresh interval string cannot be parsed.
	#[error("Refresh interval `{value}` is invalid.")]
	InvalidInterval {
		/// Raw interval string.
		value: String,
		/// Parsing failure.
		#[source]
		source: crate::config::DurationParseError,
	},
	/// Refresh interval parsed but is zero or negative.
	#[error("Refresh interval `{value}` must be positive.")]
	NonPositiveInterval {
		/// Raw interval string.
		value: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Failures reported by the token exchange itself.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// Exchange endpoint is not a valid absolute URL, so no request could be built.
	#[error("Exchange endpoint `{endpoint}` is not a valid URL.")]
	InvalidEndpoint {
		/// Configured endpoint string.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint answered with a status other than 200.
	#[error("Token exchange failed: {status} - {body}")]
	Status {
		/// Numeric HTTP status.
		code: u16,
		/// Status line, e.g. `400 Bad Request`.
		status: String,
		/// Raw response body, kept for diagnostics.
		body: String,
	},
	/// Endpoint answered 200 with a body that is not a token-exchange response.
	#[error("Token endpoint returned malformed JSON.")]
	Decode {
		/// Structured parsing failure, including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
