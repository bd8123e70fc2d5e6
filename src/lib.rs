//! Keep an OAuth 2.0 token-exchange access token fresh on disk: read an identity token, trade it
//! at a security token service, publish the result with owner-only permissions, and repeat
//! before it expires.
//!
//! [`refresh::Refresher`] drives the loop. It is generic over [`exchange::TokenExchanger`], so
//! the scheduling core never touches the HTTP stack; the default transport is
//! [`http::ReqwestExchanger`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod exchange;
#[cfg(feature = "reqwest")] pub mod http;
pub mod obs;
pub mod refresh;
pub mod secret;
pub mod store;
#[cfg(test)]
mod _preludet {
	//! Shared fixtures for unit tests.

	pub use crate::_prelude::*;

	// std
	use std::{env, fs, process};
	// crates.io
	use parking_lot::Mutex;
	use tokio::time::Instant;
	// self
	use crate::{
		error::ExchangeError,
		exchange::{ExchangeFuture, ExchangeRequest, ExchangeResult, TokenExchanger},
		secret::TokenSecret,
	};

	/// Creates a unique, empty directory under the system temp dir.
	pub fn temp_dir(label: &str) -> PathBuf {
		let unique = format!(
			"token_refresher_{label}_{}_{}",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);
		let dir = env::temp_dir().join(unique);

		fs::create_dir_all(&dir).unwrap_or_else(|e| {
			panic!("Failed to create temporary directory {}: {e}", dir.display())
		});

		dir
	}

	/// Exchanger that fails a fixed number of times before succeeding, recording when each
	/// call happened on the (possibly paused) tokio clock.
	pub struct ScriptedExchanger {
		failures: usize,
		expires_in: u64,
		calls: Mutex<Vec<Instant>>,
		requests: Mutex<Vec<(Vec<u8>, Option<String>)>>,
	}
	impl ScriptedExchanger {
		pub fn failing_then_succeeding(failures: usize, expires_in: u64) -> Self {
			Self {
				failures,
				expires_in,
				calls: Default::default(),
				requests: Default::default(),
			}
		}

		pub fn always_failing() -> Self {
			Self::failing_then_succeeding(usize::MAX, 0)
		}

		/// Whole seconds between `start` and each recorded call.
		pub fn offsets_from(&self, start: Instant) -> Vec<u64> {
			self.calls.lock().iter().map(|at| (*at - start).as_secs()).collect()
		}

		/// Subject token bytes and audience of every request seen.
		pub fn requests(&self) -> Vec<(Vec<u8>, Option<String>)> {
			self.requests.lock().clone()
		}
	}
	impl TokenExchanger for ScriptedExchanger {
		fn exchange<'a>(
			&'a self,
			_endpoint: &'a str,
			request: &'a ExchangeRequest,
		) -> ExchangeFuture<'a> {
			Box::pin(async move {
				let call = {
					let mut calls = self.calls.lock();

					calls.push(Instant::now());
					calls.len()
				};

				self.requests
					.lock()
					.push((request.subject_token.expose().to_vec(), request.audience.clone()));

				if call <= self.failures {
					return Err(ExchangeError::Status {
						code: 503,
						status: "503 Service Unavailable".into(),
						body: "upstream unavailable".into(),
					}
					.into());
				}

				Ok(ExchangeResult {
					access_token: TokenSecret::new(format!("access-{call}")),
					token_type: "Bearer".into(),
					issued_token_type: "urn:ietf:params:oauth:token-type:access_token".into(),
					expires_in: self.expires_in,
				})
			})
		}
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use tokio_util::sync::CancellationToken;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
// Used by the `token-refresher` binary only.
use {clap as _, color_eyre as _, tracing_subscriber as _};
#[cfg(test)] use httpmock as _;
