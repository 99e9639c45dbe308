//! ID token verification against provider-published signing keys.
//!
//! [`IdTokenVerifier`] runs the ordered checks a login attempt requires: token structure,
//! key lookup (with the coalescing [`jwks`] cache), signature, issuer, audience, expiry, and
//! nonce. Each step fails with its own [`VerifyError`] kind so callers can tell exactly
//! which guarantee broke without ever seeing token material in an error message.

pub mod jwks;

pub use jwks::KeyCache;

// crates.io
use jsonwebtoken::{Algorithm, Validation, decode, decode_header, errors::ErrorKind};
// self
use crate::{
	_prelude::*,
	auth::{Secret, VerifiedClaims},
	error::VerifyError,
	http::TokenHttpClient,
	provider::ProviderConfig,
};

const DEFAULT_LEEWAY: Duration = Duration::seconds(60);

/// Verifies ID tokens for every OIDC provider sharing the coordinator's transport.
///
/// The verifier is stateless across attempts apart from the shared [`KeyCache`]; concurrent
/// verifications only contend on the cache's read locks.
pub struct IdTokenVerifier<C>
where
	C: ?Sized + TokenHttpClient,
{
	http_client: Arc<C>,
	keys: KeyCache,
	leeway: Duration,
}
impl<C> IdTokenVerifier<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a verifier backed by the provided transport.
	pub fn new(http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into(), keys: KeyCache::default(), leeway: DEFAULT_LEEWAY }
	}

	/// Overrides the clock-skew leeway applied to expiry checks (defaults to 60 seconds).
	pub fn with_leeway(mut self, leeway: Duration) -> Self {
		self.leeway = if leeway.is_negative() { Duration::ZERO } else { leeway };

		self
	}

	/// Validates `id_token` against the provider configuration and the expected nonce.
	///
	/// The checks run in a fixed order and short-circuit on the first failure: structure,
	/// key lookup, signature, issuer, audience, expiry, nonce. A key identifier that is not
	/// present in the cached JWKS triggers exactly one refetch before the signature check
	/// fails; concurrent misses for the same key set coalesce into a single refetch.
	pub async fn verify(
		&self,
		config: &ProviderConfig,
		id_token: &Secret,
		expected_nonce: &str,
	) -> Result<VerifiedClaims, VerifyError> {
		let header =
			decode_header(id_token.expose()).map_err(|source| VerifyError::MalformedToken { source })?;

		if !matches!(header.alg, Algorithm::RS256) {
			return Err(VerifyError::UnsupportedAlgorithm { alg: format!("{:?}", header.alg) });
		}

		let jwks_uri = config.endpoints.jwks.as_ref().ok_or_else(|| {
			VerifyError::MissingKeySetEndpoint { name: config.name.to_string() }
		})?;
		let kid = header.kid;
		let decoding_key = match self.keys.find(jwks_uri, kid.as_deref()) {
			Some(key) => key,
			None => {
				let seen = self.keys.version(jwks_uri);

				self.keys.refresh(self.http_client.as_ref(), jwks_uri, seen).await?;
				self.keys
					.find(jwks_uri, kid.as_deref())
					.ok_or(VerifyError::Signature { kid: kid.clone() })?
			},
		};
		// Signature only here; issuer/audience/expiry run below so each failure stays distinct.
		let mut validation = Validation::new(Algorithm::RS256);

		validation.validate_exp = false;
		validation.validate_aud = false;
		validation.required_spec_claims.clear();

		let decoded = decode::<RawIdClaims>(id_token.expose(), &decoding_key, &validation)
			.map_err(|err| {
				if matches!(err.kind(), ErrorKind::InvalidSignature) {
					VerifyError::Signature { kid: kid.clone() }
				} else {
					VerifyError::MalformedToken { source: err }
				}
			})?;
		let claims = decoded.claims;
		let expected_issuer = config.issuer.as_deref().unwrap_or_default();

		if claims.iss.trim_end_matches('/') != expected_issuer.trim_end_matches('/') {
			return Err(VerifyError::IssuerMismatch {
				expected: expected_issuer.to_owned(),
				found: claims.iss,
			});
		}

		let audience = claims.aud.into_vec();

		if !audience.iter().any(|entry| entry == &config.client_id) {
			return Err(VerifyError::AudienceMismatch { expected: config.client_id.clone() });
		}

		let expires_at =
			OffsetDateTime::from_unix_timestamp(claims.exp).unwrap_or(OffsetDateTime::UNIX_EPOCH);

		if OffsetDateTime::now_utc() >= expires_at + self.leeway {
			return Err(VerifyError::Expired { expired_at: expires_at });
		}

		match claims.nonce.as_deref() {
			Some(nonce) if nonce == expected_nonce => {},
			_ => return Err(VerifyError::NonceMismatch),
		}

		Ok(VerifiedClaims {
			subject: claims.sub,
			issuer: expected_issuer.to_owned(),
			audience,
			expires_at,
			nonce: claims.nonce,
			name: claims.name,
			email: claims.email,
		})
	}
}
impl<C> Debug for IdTokenVerifier<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdTokenVerifier").field("leeway", &self.leeway).finish()
	}
}

/// Raw claim payload deserialized after the signature check.
#[derive(Debug, Deserialize)]
struct RawIdClaims {
	iss: String,
	sub: String,
	aud: Audience,
	exp: i64,
	nonce: Option<String>,
	name: Option<String>,
	email: Option<String>,
}

/// The `aud` claim is a single string or an array per RFC 7519.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Audience {
	One(String),
	Many(Vec<String>),
}
impl Audience {
	fn into_vec(self) -> Vec<String> {
		match self {
			Audience::One(value) => vec![value],
			Audience::Many(values) => values,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn audience_accepts_both_wire_shapes() {
		let single: Audience = serde_json::from_str("\"client-id\"")
			.expect("Single-string audience should deserialize.");

		assert_eq!(single.into_vec(), vec!["client-id".to_owned()]);

		let many: Audience = serde_json::from_str("[\"client-id\",\"other\"]")
			.expect("Array audience should deserialize.");

		assert_eq!(many.into_vec().len(), 2);
	}

	#[test]
	fn malformed_tokens_fail_before_any_network_access() {
		let err = decode_header("not-a-jwt").expect_err("Garbage must not decode.");
		let err = VerifyError::MalformedToken { source: err };

		assert_eq!(err.to_string(), "ID token is not a well-formed JWT.");
	}
}
