//! reqwest-backed [`TokenExchanger`].
//!
//! Token requests do not follow redirects, matching OAuth 2.0 guidance that token endpoints
//! return results directly instead of delegating to another URI. The default client also
//! bounds every exchange with connect and total timeouts because the refresher has a single
//! line of work and must never stall on a silent endpoint.

// crates.io
use reqwest::{
	StatusCode,
	header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE},
	redirect::Policy,
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ExchangeError, TransportError},
	exchange::{ExchangeFuture, ExchangeRequest, ExchangeResult, TokenExchanger},
};

/// Total time allowed for one exchange, including reading the body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Time allowed to establish the connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin wrapper around [`ReqwestClient`] so exchange behavior lives in one place.
///
/// Configure any custom client passed to [`ReqwestExchanger::with_client`] to disable
/// redirect following and to carry sensible timeouts.
#[derive(Clone, Debug)]
pub struct ReqwestExchanger(pub ReqwestClient);
impl ReqwestExchanger {
	/// Builds a client with [`DEFAULT_REQUEST_TIMEOUT`], [`DEFAULT_CONNECT_TIMEOUT`], and
	/// redirects disabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(DEFAULT_REQUEST_TIMEOUT)
			.connect_timeout(DEFAULT_CONNECT_TIMEOUT)
			.redirect(Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn send(&self, endpoint: &str, request: &ExchangeRequest) -> Result<ExchangeResult> {
		let url = Url::parse(endpoint).map_err(|source| ExchangeError::InvalidEndpoint {
			endpoint: endpoint.to_owned(),
			source,
		})?;
		let response = self
			.0
			.post(url)
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.header(CACHE_CONTROL, "no-store")
			.body(request.form_body())
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();

		if status != StatusCode::OK {
			// The status alone classifies the failure; an unreadable body is reported as empty.
			let body = response.bytes().await.unwrap_or_default();

			return Err(status_error(status, &body).into());
		}

		let body = response.bytes().await.map_err(TransportError::from)?;

		Ok(ExchangeResult::from_slice(&body)?)
	}
}
impl TokenExchanger for ReqwestExchanger {
	fn exchange<'a>(
		&'a self,
		endpoint: &'a str,
		request: &'a ExchangeRequest,
	) -> ExchangeFuture<'a> {
		Box::pin(self.send(endpoint, request))
	}
}

fn status_error(status: StatusCode, body: &[u8]) -> ExchangeError {
	ExchangeError::Status {
		code: status.as_u16(),
		status: status.to_string(),
		body: String::from_utf8_lossy(body).into_owned(),
	}
}
