//! Claim payloads produced by the verification and userinfo paths.

// self
use crate::_prelude::*;

/// Claims extracted from an ID token after signature + claim validation succeeded.
///
/// Values of this type only exist past the verifier, so `expires_at` was in the future and
/// `issuer`/`audience` matched the provider configuration at verification time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedClaims {
	/// Subject identifier (`sub`), unique per provider.
	pub subject: String,
	/// Issuer (`iss`) the token was validated against.
	pub issuer: String,
	/// Audience entries (`aud`); contains the configured client identifier.
	pub audience: Vec<String>,
	/// Expiry instant (`exp`), in the future at verification time.
	pub expires_at: OffsetDateTime,
	/// Nonce echoed from the login attempt.
	pub nonce: Option<String>,
	/// Display name claim, when the provider supplies one.
	pub name: Option<String>,
	/// Email claim, when the provider supplies one.
	pub email: Option<String>,
}

/// Profile document returned by a plain-OAuth2 provider's userinfo endpoint.
///
/// Only the standard fields are modeled; provider-specific attributes are ignored rather than
/// guessed at. `id` is accepted as an alias for `sub` since several OAuth2-only providers
/// predate the OIDC claim names.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
	/// Subject identifier (`sub`, or legacy `id`).
	#[serde(rename = "sub", alias = "id")]
	pub subject: Option<String>,
	/// Display name field, when the provider supplies one.
	pub name: Option<String>,
	/// Email field, when the provider supplies one.
	pub email: Option<String>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn user_profile_accepts_legacy_id_field() {
		let profile: UserProfile = serde_json::from_str(
			"{\"id\":\"1234\",\"name\":\"Ada Lovelace\",\"email\":\"ada@example.com\"}",
		)
		.expect("Profile with a legacy id field should deserialize.");

		assert_eq!(profile.subject.as_deref(), Some("1234"));

		let profile: UserProfile =
			serde_json::from_str("{\"sub\":\"abcd\"}").expect("Sparse profile should deserialize.");

		assert_eq!(profile.subject.as_deref(), Some("abcd"));
		assert_eq!(profile.name, None);
	}
}
