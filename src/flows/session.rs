//! Login session construction: authorize URL, state, nonce, and PKCE pair.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{ProviderName, Secret},
	provider::ProviderConfig,
};

const STATE_LEN: usize = 32;
const NONCE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods surfaced via [`LoginSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Outbound half of one login attempt, returned by `LoginCoordinator::start_login`.
///
/// The session carries the `state` the redirect handler must echo back, the `nonce` the ID
/// token must echo back, and the PKCE pair. Stash it (keyed by `state`) until the provider
/// redirects back, then call [`into_authorization_code`](Self::into_authorization_code).
#[derive(Clone)]
pub struct LoginSession {
	/// Provider the attempt runs against.
	pub provider: ProviderName,
	/// Redirect URI supplied when constructing the authorize URL.
	pub redirect_uri: Url,
	/// Fully-formed HTTPS authorize URL that callers should send end-users to.
	pub authorize_url: Url,
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	nonce: String,
	pkce: PkcePair,
}
impl LoginSession {
	/// Nonce the provider must echo inside the ID token.
	pub fn nonce(&self) -> &str {
		&self.nonce
	}

	/// PKCE code challenge derived from the secret verifier.
	pub fn code_challenge(&self) -> &str {
		&self.pkce.challenge
	}

	/// PKCE challenge method (currently always `S256`).
	pub fn code_challenge_method(&self) -> PkceCodeChallengeMethod {
		self.pkce.method
	}

	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state { Ok(()) } else { Err(Error::StateMismatch) }
	}

	/// Consumes the session into the [`AuthorizationCode`] the coordinator exchanges.
	///
	/// Fails with [`Error::StateMismatch`] when the echoed state does not match; on success
	/// the nonce and PKCE verifier travel with the code, so no session state survives.
	pub fn into_authorization_code(
		self,
		returned_state: &str,
		code: impl Into<Secret>,
	) -> Result<AuthorizationCode> {
		self.validate_state(returned_state)?;

		Ok(AuthorizationCode {
			code: code.into(),
			redirect_uri: self.redirect_uri,
			expected_nonce: self.nonce,
			state: None,
			pkce_verifier: Some(Secret::new(self.pkce.verifier)),
		})
	}
}
impl Debug for LoginSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginSession")
			.field("provider", &self.provider)
			.field("redirect_uri", &self.redirect_uri)
			.field("authorize_url", &self.authorize_url)
			.field("state", &self.state)
			.field("nonce", &self.nonce)
			.field("code_challenge", &self.pkce.challenge)
			.field("code_challenge_method", &self.pkce.method)
			.finish()
	}
}

/// Single-use authorization code plus the context needed to exchange and verify it.
///
/// Created by [`LoginSession::into_authorization_code`], or directly via [`new`](Self::new)
/// when the calling layer already validated the redirect state. Consumed exactly once by
/// `LoginCoordinator::complete_login`, whether the exchange succeeds or fails.
#[derive(Clone, Debug)]
pub struct AuthorizationCode {
	/// The code received on the redirect callback.
	pub code: Secret,
	/// Redirect URI the code was issued for; must match the authorize request.
	pub redirect_uri: Url,
	/// Nonce the verified ID token must echo.
	pub expected_nonce: String,
	state: Option<StateCheck>,
	pkce_verifier: Option<Secret>,
}
impl AuthorizationCode {
	/// Creates a code whose redirect state was already validated by the calling layer.
	pub fn new(
		code: impl Into<Secret>,
		redirect_uri: Url,
		expected_nonce: impl Into<String>,
	) -> Self {
		Self {
			code: code.into(),
			redirect_uri,
			expected_nonce: expected_nonce.into(),
			state: None,
			pkce_verifier: None,
		}
	}

	/// Attaches an expected/returned state pair for the coordinator to check before the
	/// exchange.
	pub fn with_state_check(
		mut self,
		expected: impl Into<String>,
		returned: impl Into<String>,
	) -> Self {
		self.state = Some(StateCheck { expected: expected.into(), returned: returned.into() });

		self
	}

	/// Attaches the PKCE verifier generated alongside the authorize request.
	pub fn with_pkce_verifier(mut self, verifier: impl Into<Secret>) -> Self {
		self.pkce_verifier = Some(verifier.into());

		self
	}

	pub(crate) fn ensure_state_matches(&self) -> Result<()> {
		match &self.state {
			None => Ok(()),
			Some(check) if check.expected == check.returned => Ok(()),
			Some(_) => Err(Error::StateMismatch),
		}
	}

	pub(crate) fn pkce_verifier(&self) -> Option<&str> {
		self.pkce_verifier.as_ref().map(Secret::expose)
	}
}

#[derive(Clone, Debug)]
struct StateCheck {
	expected: String,
	returned: String,
}

#[derive(Clone)]
pub(super) struct PkcePair {
	pub(super) verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	pub(super) fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}
}

pub(super) fn build_session(config: &ProviderConfig, redirect_uri: Url) -> LoginSession {
	let state = random_string(STATE_LEN);
	let nonce = random_string(NONCE_LEN);
	let pkce = PkcePair::generate();
	let authorize_url = build_authorize_url(config, &redirect_uri, &state, &nonce, &pkce);

	LoginSession {
		provider: config.name.clone(),
		redirect_uri,
		authorize_url,
		state,
		nonce,
		pkce,
	}
}

fn build_authorize_url(
	config: &ProviderConfig,
	redirect_uri: &Url,
	state: &str,
	nonce: &str,
	pkce: &PkcePair,
) -> Url {
	let mut url = config.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", &config.client_id);
	pairs.append_pair("redirect_uri", redirect_uri.as_str());

	if !config.scopes.is_empty() {
		pairs.append_pair("scope", &config.scopes.normalized());
	}

	pairs.append_pair("state", state);
	pairs.append_pair("nonce", nonce);
	pairs.append_pair("code_challenge", &pkce.challenge);
	pairs.append_pair("code_challenge_method", pkce.method.as_str());

	drop(pairs);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(verifier.as_bytes());
	let digest = hasher.finalize();
	URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::wellknown;

	fn session() -> LoginSession {
		let config = wellknown::google("client-id", "client-secret")
			.expect("Google preset endpoints should parse.")
			.build()
			.expect("Provider configuration should build successfully.");

		build_session(
			&config,
			Url::parse("https://app.example.com/callback")
				.expect("Redirect URI fixture should parse successfully."),
		)
	}

	#[test]
	fn authorize_url_carries_the_oidc_parameters() {
		let session = session();
		let pairs: HashMap<_, _> = session.authorize_url.query_pairs().into_owned().collect();

		assert_eq!(pairs.get("response_type"), Some(&"code".into()));
		assert_eq!(pairs.get("client_id"), Some(&"client-id".into()));
		assert_eq!(pairs.get("state"), Some(&session.state));
		assert_eq!(pairs.get("nonce"), Some(&session.nonce().to_owned()));
		assert_eq!(pairs.get("code_challenge_method"), Some(&"S256".into()));
		assert!(
			pairs.get("scope").is_some_and(|scope| scope.contains("openid")),
			"OIDC authorize URLs must request the openid scope.",
		);
	}

	#[test]
	fn state_validation_errors_on_mismatch() {
		let session = session();

		assert!(session.validate_state(&session.state.clone()).is_ok());

		let err = session.validate_state("other").expect_err("State mismatch should fail.");

		assert!(matches!(err, Error::StateMismatch));
	}

	#[test]
	fn consuming_the_session_carries_nonce_and_verifier() {
		let session = session();
		let state = session.state.clone();
		let nonce = session.nonce().to_owned();
		let code = session
			.into_authorization_code(&state, "one-time-code")
			.expect("Matching state should convert the session.");

		assert_eq!(code.expected_nonce, nonce);
		assert_eq!(code.code.expose(), "one-time-code");
		assert!(code.pkce_verifier().is_some());
		assert!(code.ensure_state_matches().is_ok());
	}

	#[test]
	fn carried_state_pairs_are_checked() {
		let code = AuthorizationCode::new(
			"one-time-code",
			Url::parse("https://app.example.com/callback")
				.expect("Redirect URI fixture should parse successfully."),
			"nonce",
		)
		.with_state_check("expected", "tampered");

		assert!(matches!(code.ensure_state_matches(), Err(Error::StateMismatch)));
	}
}
