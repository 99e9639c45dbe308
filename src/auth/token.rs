//! Token material issued by one authorization-code exchange.

// self
use crate::{_prelude::*, auth::Secret};

/// Tokens returned by the token endpoint for a single login attempt.
///
/// The set lives only for the duration of one coordinator invocation; nothing here is
/// persisted. The raw ID token stays wrapped in [`Secret`] until the verifier consumes it.
#[derive(Clone)]
pub struct TokenSet {
	/// Access token issued alongside the identity token.
	pub access_token: Secret,
	/// Raw (unverified) ID token, absent for plain-OAuth2 providers.
	pub id_token: Option<Secret>,
	/// Instant the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from the response `expires_in`.
	pub expires_at: OffsetDateTime,
}
impl TokenSet {
	/// Returns `true` if the access token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Convenience helper that checks expiry against the current UTC instant.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for TokenSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSet")
			.field("access_token", &"<redacted>")
			.field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
