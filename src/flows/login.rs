//! Login completion orchestration.
//!
//! `complete_login` walks one attempt through its state machine: code exchange, ID token
//! verification (or userinfo retrieval for plain-OAuth2 providers), claim mapping, and the
//! single registration call. Every stage is instrumented, any failure is terminal for the
//! attempt, and the registration collaborator only ever sees a fully verified identity.

// self
use crate::{
	_prelude::*,
	auth::{ClaimSource, Identity},
	error::ExchangeError,
	flows::{AuthorizationCode, LoginCoordinator, LoginSession, session, userinfo},
	http::TokenHttpClient,
	oauth::{LoginFacade, TransportErrorMapper},
	obs::{self, LoginStage, StageOutcome, StageSpan},
	provider::{ProviderConfigError, ProviderKind},
};

impl<C, M> LoginCoordinator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Starts a login attempt by building the authorize URL the end-user is sent to.
	pub fn start_login(&self, provider: &str, redirect_uri: Url) -> Result<LoginSession> {
		let config = self.registry.get(provider)?;

		Ok(session::build_session(config, redirect_uri))
	}

	/// Completes a login attempt by consuming its single-use authorization code.
	///
	/// Orchestration: registry lookup, state precondition, code exchange, verification (or
	/// userinfo retrieval), claim mapping, then exactly one synchronous
	/// `request_registration` call before the identity is returned. A failing registration
	/// fails the login even though verification succeeded; nothing is retried internally.
	pub async fn complete_login(
		&self,
		provider: &str,
		code: AuthorizationCode,
	) -> Result<Identity> {
		let config = self.registry.get(provider)?;
		let name = config.name.as_ref();

		code.ensure_state_matches()?;

		let token_set = stage(LoginStage::Exchange, name, async {
			let facade = <LoginFacade<C, M>>::from_config(
				config,
				self.http_client.clone(),
				self.transport_mapper.clone(),
			)?;

			facade
				.exchange_authorization_code(
					code.code.expose(),
					code.pkce_verifier(),
					&code.redirect_uri,
				)
				.await
		})
		.await?;
		let identity = match config.kind {
			ProviderKind::Oidc => {
				let claims = stage(LoginStage::Verify, name, async {
					let raw = token_set.id_token.as_ref().ok_or(ExchangeError::MissingField {
						endpoint: "token",
						field: "id_token",
					})?;

					self.verifier
						.verify(config, raw, &code.expected_nonce)
						.await
						.map_err(Error::from)
				})
				.await?;

				stage(LoginStage::Map, name, async {
					Identity::from_claims(&config.name, ClaimSource::Oidc(&claims))
						.map_err(Error::from)
				})
				.await?
			},
			ProviderKind::OAuth2 => {
				let profile = stage(LoginStage::UserInfo, name, async {
					let endpoint = config.endpoints.userinfo.as_ref().ok_or_else(|| {
						ProviderConfigError::MissingUserinfoEndpoint {
							name: config.name.to_string(),
						}
					})?;

					userinfo::fetch_user_profile(
						self.http_client.as_ref(),
						endpoint,
						&token_set.access_token,
					)
					.await
					.map_err(Error::from)
				})
				.await?;

				stage(LoginStage::Map, name, async {
					Identity::from_claims(&config.name, ClaimSource::UserInfo(&profile))
						.map_err(Error::from)
				})
				.await?
			},
		};

		stage(LoginStage::Register, name, async {
			self.registrar
				.request_registration(&identity.name, &identity.email)
				.await
				.map_err(Error::from)
		})
		.await?;

		Ok(identity)
	}
}

async fn stage<T, F>(stage: LoginStage, provider: &str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	let span = StageSpan::new(stage, provider);

	obs::record_stage_outcome(stage, StageOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => obs::record_stage_outcome(stage, StageOutcome::Success),
		Err(_) => obs::record_stage_outcome(stage, StageOutcome::Failure),
	}

	result
}
