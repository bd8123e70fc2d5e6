//! OAuth 2.0 token exchange (RFC 8693) wire types and the transport seam.
//!
//! [`TokenExchanger`] is the refresher's only dependency on an HTTP stack. It performs
//! exactly one exchange per call and never retries; backoff belongs to
//! [`crate::refresh`]. The reqwest-backed implementation lives in [`crate::http`].

// crates.io
use serde::Deserializer;
use url::form_urlencoded;
// self
use crate::{_prelude::*, error::ExchangeError, secret::TokenSecret};

/// `grant_type` for the token-exchange grant.
pub const TOKEN_EXCHANGE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";
/// `subject_token_type` announcing an OpenID Connect ID token.
pub const ID_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:id_token";

/// Boxed future returned by [`TokenExchanger::exchange`].
pub type ExchangeFuture<'a> = Pin<Box<dyn Future<Output = Result<ExchangeResult>> + 'a + Send>>;

/// Performs a single credential exchange against a token endpoint.
///
/// Implementations must be stateless with respect to the refresher: each call builds a
/// fresh request, and failures are reported through the [`Error`] taxonomy without any
/// internal retry.
pub trait TokenExchanger
where
	Self: 'static + Send + Sync,
{
	/// Exchanges `request.subject_token` at `endpoint` for an access token.
	fn exchange<'a>(&'a self, endpoint: &'a str, request: &'a ExchangeRequest)
	-> ExchangeFuture<'a>;
}

/// One exchange attempt's input. Built fresh per attempt and never persisted.
#[derive(Clone, Debug)]
pub struct ExchangeRequest {
	/// Identity token presented to the endpoint.
	pub subject_token: TokenSecret,
	/// Requested audience; `None` omits the field from the request.
	pub audience: Option<String>,
}
impl ExchangeRequest {
	/// Creates a request, dropping an empty audience.
	pub fn new(subject_token: TokenSecret, audience: Option<&str>) -> Self {
		Self {
			subject_token,
			audience: audience.filter(|value| !value.is_empty()).map(ToOwned::to_owned),
		}
	}

	/// Encodes the request as an `application/x-www-form-urlencoded` body.
	///
	/// Subject token bytes are percent-encoded verbatim, so tokens do not need to be valid
	/// UTF-8.
	pub fn form_body(&self) -> String {
		let mut fields: Vec<(&str, &[u8])> = vec![
			("grant_type", TOKEN_EXCHANGE_GRANT_TYPE.as_bytes()),
			("subject_token", self.subject_token.expose()),
			("subject_token_type", ID_TOKEN_TYPE.as_bytes()),
		];

		if let Some(audience) = &self.audience {
			fields.push(("audience", audience.as_bytes()));
		}

		let mut body = String::new();

		for (idx, (key, value)) in fields.into_iter().enumerate() {
			if idx > 0 {
				body.push('&');
			}

			body.extend(form_urlencoded::byte_serialize(key.as_bytes()));
			body.push('=');
			body.extend(form_urlencoded::byte_serialize(value));
		}

		body
	}
}

/// Successful token-exchange response.
///
/// Unknown fields are ignored. `expires_in` is optional on the wire; a missing, `null`,
/// or negative value is read as `0`, meaning "lifetime unknown".
#[derive(Clone, Debug, Deserialize)]
pub struct ExchangeResult {
	/// Newly issued access token.
	pub access_token: TokenSecret,
	/// Token type of the issued token, e.g. `Bearer`.
	#[serde(default)]
	pub token_type: String,
	/// URN describing the issued token.
	#[serde(default)]
	pub issued_token_type: String,
	/// Lifetime of the issued token in seconds; `0` when unknown.
	#[serde(default, deserialize_with = "lenient_expires_in")]
	pub expires_in: u64,
}
impl ExchangeResult {
	/// Decodes a 200 response body, reporting the failing JSON path on error.
	pub fn from_slice(body: &[u8]) -> Result<Self, ExchangeError> {
		let mut de = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut de).map_err(|source| ExchangeError::Decode { source })
	}
}

fn lenient_expires_in<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<i64>::deserialize(deserializer)?;

	Ok(raw.and_then(|secs| u64::try_from(secs).ok()).unwrap_or(0))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn form_body_omits_empty_audience() {
		let request = ExchangeRequest::new(TokenSecret::new("abc123"), Some(""));

		assert_eq!(request.audience, None);
		assert_eq!(
			request.form_body(),
			"grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Atoken-exchange\
			 &subject_token=abc123\
			 &subject_token_type=urn%3Aietf%3Aparams%3Aoauth%3Atoken-type%3Aid_token",
		);
	}

	#[test]
	fn form_body_appends_audience_and_escapes_bytes() {
		let request = ExchangeRequest::new(
			TokenSecret::new(b"a b&c\xff".to_vec()),
			Some("https://api.example.com"),
		);
		let body = request.form_body();

		assert!(body.contains("&subject_token=a+b%26c%FF&"));
		assert!(body.ends_with("&audience=https%3A%2F%2Fapi.example.com"));
	}

	#[test]
	fn result_defaults_optional_fields() {
		let result = ExchangeResult::from_slice(br#"{"access_token":"xyz789","extra":true}"#)
			.expect("Minimal response should decode.");

		assert_eq!(result.access_token.expose(), b"xyz789");
		assert_eq!(result.expires_in, 0);
		assert!(result.token_type.is_empty());

		let result = ExchangeResult::from_slice(
			br#"{"access_token":"t","token_type":"Bearer","issued_token_type":"urn:ietf:params:oauth:token-type:access_token","expires_in":null}"#,
		)
		.expect("Null expires_in should decode.");

		assert_eq!(result.expires_in, 0);
		assert_eq!(result.token_type, "Bearer");

		let result = ExchangeResult::from_slice(br#"{"access_token":"t","expires_in":-30}"#)
			.expect("Negative expires_in should decode.");

		assert_eq!(result.expires_in, 0);
	}

	#[test]
	fn decode_errors_report_the_path() {
		let err = ExchangeResult::from_slice(br#"{"access_token":"t","expires_in":"soon"}"#)
			.expect_err("String expires_in should fail.");

		match err {
			ExchangeError::Decode { source } =>
				assert_eq!(source.path().to_string(), "expires_in"),
			other => panic!("Unexpected error variant: {other:?}."),
		}

		assert!(ExchangeResult::from_slice(b"not json").is_err());
		assert!(ExchangeResult::from_slice(br#"{"expires_in":30}"#).is_err());
	}
}
