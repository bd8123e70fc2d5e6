//! Secure token secret wrapper that redacts sensitive material.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

const FINGERPRINT_BYTES: usize = 9;

/// Redacted token secret wrapper keeping sensitive material out of logs.
///
/// Secrets are raw bytes: subject tokens are read from disk without any decoding and
/// access tokens are written back out verbatim.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct TokenSecret(Vec<u8>);
impl TokenSecret {
	/// Wraps a new secret.
	pub fn new(value: impl Into<Vec<u8>>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token bytes. Callers must avoid logging them.
	pub fn expose(&self) -> &[u8] {
		&self.0
	}

	/// Short, non-reversible identifier that lets operators correlate tokens in logs.
	pub fn fingerprint(&self) -> String {
		let digest = Sha256::digest(&self.0);

		URL_SAFE_NO_PAD.encode(&digest[..FINGERPRINT_BYTES])
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn fingerprint_is_stable_and_short() {
		let first = TokenSecret::new("xyz789").fingerprint();
		let second = TokenSecret::new(b"xyz789".to_vec()).fingerprint();

		assert_eq!(first, second);
		assert_eq!(first.len(), 12);
		assert!(!first.contains("xyz789"));
		assert_ne!(first, TokenSecret::new("xyz790").fingerprint());
	}

	#[test]
	fn deserializes_from_json_string() {
		let secret: TokenSecret =
			serde_json::from_str("\"access\"").expect("JSON string should decode into a secret.");

		assert_eq!(secret.expose(), b"access");
	}
}
