//! Coordinator-level error types shared across flows, providers, and verification.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical login error exposed by public APIs.
///
/// Every variant is terminal for the login attempt. [`ExchangeError::Network`] and
/// [`VerifyError::KeyFetch`] are transient at the transport level, so callers may retry the
/// whole attempt; nothing is retried internally.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local provider configuration problem; fatal at startup.
	#[error(transparent)]
	Config(#[from] crate::provider::ProviderConfigError),
	/// The requested provider is not present in the registry.
	#[error("Provider `{name}` is not registered.")]
	UnknownProvider {
		/// Provider name the caller asked for.
		name: String,
	},
	/// The `state` echoed by the authorization redirect does not match the login attempt.
	#[error("Authorization state does not match the login attempt.")]
	StateMismatch,
	/// Authorization-code exchange failure.
	#[error(transparent)]
	Exchange(#[from] ExchangeError),
	/// ID token verification failure.
	#[error(transparent)]
	Verify(#[from] VerifyError),
	/// A claim required for registration is absent.
	#[error(transparent)]
	MissingClaim(#[from] crate::auth::MissingClaimError),
	/// The registration collaborator rejected the verified identity.
	#[error("{0}")]
	Registration(
		#[from]
		#[source]
		crate::registration::RegistrationError,
	),
}

/// Failures raised while exchanging an authorization code or fetching a userinfo profile.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// Transport failure (DNS, TCP, TLS, timeout); safe for the caller to retry the attempt.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint label (`token` or `userinfo`).
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Provider answered with an OAuth error response; not retryable.
	#[error("The {endpoint} endpoint rejected the request: {reason}.")]
	Provider {
		/// Endpoint label (`token` or `userinfo`).
		endpoint: &'static str,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Provider- or coordinator-supplied reason string.
		reason: String,
	},
	/// Provider answered with JSON that could not be parsed.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	ResponseParse {
		/// Endpoint label (`token` or `userinfo`).
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
	/// Provider answered without a field the flow requires.
	#[error("The {endpoint} endpoint response is missing {field}.")]
	MissingField {
		/// Endpoint label (`token` or `userinfo`).
		endpoint: &'static str,
		/// Name of the absent field.
		field: &'static str,
	},
	/// Provider answered with a field value outside the supported range.
	#[error("The {endpoint} endpoint returned an unusable {field} value.")]
	InvalidField {
		/// Endpoint label (`token` or `userinfo`).
		endpoint: &'static str,
		/// Name of the unusable field.
		field: &'static str,
	},
}
impl ExchangeError {
	/// Wraps a transport-specific network error for the given endpoint.
	pub fn network(
		endpoint: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}

	/// Builds a provider rejection from the OAuth error body fields.
	pub fn provider(
		endpoint: &'static str,
		status: Option<u16>,
		code: Option<&str>,
		description: Option<&str>,
	) -> Self {
		let reason = match (code, description) {
			(Some(code), Some(description)) => format!("{code}: {description}"),
			(Some(code), None) => code.to_owned(),
			(None, Some(description)) => description.to_owned(),
			(None, None) => match status {
				Some(status) => format!("HTTP {status}"),
				None => "unspecified provider error".into(),
			},
		};

		Self::Provider { endpoint, status, reason }
	}
}

/// Failures raised while validating an ID token, one per verification step.
#[derive(Debug, ThisError)]
pub enum VerifyError {
	/// The token is not a structurally valid JWT.
	#[error("ID token is not a well-formed JWT.")]
	MalformedToken {
		/// Underlying decode failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// The provider JWKS document could not be fetched.
	#[error("Failed to fetch the provider JWKS.")]
	KeyFetch {
		/// HTTP status code, when the endpoint answered at all.
		status: Option<u16>,
		/// Transport-specific failure, when the request never completed.
		#[source]
		source: Option<BoxError>,
	},
	/// The provider JWKS document could not be parsed.
	#[error("The provider JWKS document is malformed.")]
	KeySetParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
	/// The provider does not publish a JWKS endpoint.
	#[error("Provider `{name}` does not publish a JWKS endpoint.")]
	MissingKeySetEndpoint {
		/// Provider name.
		name: String,
	},
	/// No usable key matched the token, or the signature check failed.
	#[error("ID token signature cannot be verified.")]
	Signature {
		/// Key identifier from the token header, when present.
		kid: Option<String>,
	},
	/// The token is signed with an algorithm the verifier does not accept.
	#[error("ID token algorithm {alg} is not accepted.")]
	UnsupportedAlgorithm {
		/// Algorithm label from the token header.
		alg: String,
	},
	/// The `iss` claim does not match the configured issuer.
	#[error("ID token issuer `{found}` does not match the configured issuer `{expected}`.")]
	IssuerMismatch {
		/// Issuer the provider configuration expects.
		expected: String,
		/// Issuer found in the token.
		found: String,
	},
	/// The `aud` claim does not contain the configured client identifier.
	#[error("ID token audience does not include the client identifier.")]
	AudienceMismatch {
		/// Client identifier the audience must contain.
		expected: String,
	},
	/// The token expired before verification.
	#[error("ID token expired at {expired_at}.")]
	Expired {
		/// Expiry instant carried by the token.
		expired_at: OffsetDateTime,
	},
	/// The `nonce` claim is absent or does not match the login attempt.
	#[error("ID token nonce does not match the login attempt.")]
	NonceMismatch,
}
impl VerifyError {
	/// Wraps a transport-specific failure encountered while fetching the JWKS.
	pub fn key_fetch(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::KeyFetch { status: None, source: Some(Box::new(src)) }
	}
}
