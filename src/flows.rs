//! High-level login orchestration around [`LoginCoordinator`].

pub mod session;

mod login;
mod userinfo;

pub use session::*;

// self
use crate::{
	_prelude::*,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	provider::ProviderRegistry,
	registration::RegistrationService,
	verify::IdTokenVerifier,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Coordinator specialized for the crate's default reqwest transport stack.
pub type ReqwestCoordinator = LoginCoordinator<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Coordinates OIDC logins across every registered provider.
///
/// The coordinator owns the HTTP client, the provider registry, the ID token verifier (with
/// its shared signing-key cache), and the registration collaborator, wired explicitly at
/// startup. Individual attempts are stateless: concurrent logins only share the read-only
/// registry and the key cache.
pub struct LoginCoordinator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Immutable provider registry shared across attempts.
	pub registry: Arc<ProviderRegistry>,
	/// Registration collaborator invoked exactly once per successful login.
	pub registrar: Arc<dyn RegistrationService>,
	pub(crate) verifier: Arc<IdTokenVerifier<C>>,
}
impl<C, M> LoginCoordinator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a coordinator that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		registry: impl Into<Arc<ProviderRegistry>>,
		registrar: Arc<dyn RegistrationService>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		let http_client = http_client.into();

		Self {
			verifier: Arc::new(IdTokenVerifier::new(http_client.clone())),
			http_client,
			transport_mapper: mapper.into(),
			registry: registry.into(),
			registrar,
		}
	}

	/// Overrides the clock-skew leeway applied by the ID token verifier.
	pub fn with_clock_leeway(mut self, leeway: Duration) -> Self {
		self.verifier = Arc::new(IdTokenVerifier::new(self.http_client.clone()).with_leeway(leeway));

		self
	}
}
#[cfg(feature = "reqwest")]
impl LoginCoordinator<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new coordinator for the provided registry and registration collaborator.
	///
	/// The coordinator provisions its own reqwest-backed transport so callers do not need
	/// to pass HTTP handles explicitly.
	pub fn new(
		registry: impl Into<Arc<ProviderRegistry>>,
		registrar: Arc<dyn RegistrationService>,
	) -> Self {
		Self::with_http_client(
			registry,
			registrar,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Clone for LoginCoordinator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			registry: self.registry.clone(),
			registrar: self.registrar.clone(),
			verifier: self.verifier.clone(),
		}
	}
}
impl<C, M> Debug for LoginCoordinator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginCoordinator")
			.field("providers", &self.registry.names().collect::<Vec<_>>())
			.field("verifier", &self.verifier)
			.finish()
	}
}
