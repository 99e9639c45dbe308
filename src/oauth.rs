//! Internal OAuth client facade abstractions.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode as OAuthAuthorizationCode, Client as OAuthClient,
	ClientId, ClientSecret, EndpointNotSet, EndpointSet, ExtraTokenFields, HttpClientError,
	PkceCodeVerifier, RedirectUrl, RequestTokenError, StandardRevocableToken,
	StandardTokenResponse, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::{Secret, TokenSet},
	error::ExchangeError,
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::{ClientAuthMethod, ProviderConfig, ProviderConfigError},
};

/// Extra token-endpoint response fields carried alongside the standard OAuth set.
///
/// OIDC providers return the identity token here; plain-OAuth2 providers simply omit it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdTokenFields {
	/// Raw ID token, when the provider issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id_token: Option<String>,
}
impl ExtraTokenFields for IdTokenFields {}

/// Token-endpoint response shape used by every login exchange.
pub type LoginTokenResponse = StandardTokenResponse<IdTokenFields, BasicTokenType>;

type ConfiguredLoginClient = OAuthClient<
	BasicErrorResponse,
	LoginTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Maps HTTP transport failures into [`ExchangeError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into an exchange error.
	fn map_transport_error(
		&self,
		endpoint: &'static str,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> ExchangeError;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: &'static str,
		_meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> ExchangeError {
		match err {
			HttpClientError::Reqwest(inner) => ExchangeError::network(endpoint, *inner),
			HttpClientError::Http(inner) => ExchangeError::network(endpoint, inner),
			HttpClientError::Io(inner) => ExchangeError::network(endpoint, inner),
			HttpClientError::Other(message) =>
				ExchangeError::network(endpoint, std::io::Error::other(message)),
			_ => ExchangeError::network(
				endpoint,
				std::io::Error::other("unclassified transport failure"),
			),
		}
	}
}

/// Facade over the `oauth2` client that performs the authorization-code exchange.
pub(crate) struct LoginFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredLoginClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> LoginFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_config(
		config: &ProviderConfig,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let auth_url =
			AuthUrl::new(config.endpoints.authorization.to_string()).map_err(|_| {
				ProviderConfigError::InvalidEndpoint {
					url: config.endpoints.authorization.to_string(),
				}
			})?;
		let token_url = TokenUrl::new(config.endpoints.token.to_string()).map_err(|_| {
			ProviderConfigError::InvalidEndpoint { url: config.endpoints.token.to_string() }
		})?;
		let mut oauth_client = OAuthClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url);

		if matches!(config.client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self {
			oauth_client,
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
		})
	}

	/// Exchanges a single-use authorization code for a [`TokenSet`].
	pub(crate) fn exchange_authorization_code<'a, 'code, 'pkce, 'redirect>(
		&'a self,
		code: &'code str,
		pkce_verifier: Option<&'pkce str>,
		redirect_uri: &'redirect Url,
	) -> FacadeFuture<'a, TokenSet>
	where
		'code: 'a,
		'pkce: 'a,
		'redirect: 'a,
	{
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let mut request =
				self.oauth_client.exchange_code(OAuthAuthorizationCode::new(code.to_owned()));

			if let Some(verifier) = pkce_verifier {
				request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()));
			}

			let redirect_url = RedirectUrl::new(redirect_uri.to_string()).map_err(|_| {
				ProviderConfigError::InvalidEndpoint { url: redirect_uri.to_string() }
			})?;

			request = request.set_redirect_uri(Cow::Owned(redirect_url));

			let response = request.request_async(&instrumented).await.map_err(|err| {
				map_request_error("token", meta.take(), err, self.error_mapper.as_ref())
			})?;
			let expires_in = response
				.expires_in()
				.ok_or(ExchangeError::MissingField { endpoint: "token", field: "expires_in" })?
				.as_secs();
			let expires_in = i64::try_from(expires_in)
				.map_err(|_| ExchangeError::InvalidField { endpoint: "token", field: "expires_in" })?;

			if expires_in <= 0 {
				return Err(ExchangeError::InvalidField { endpoint: "token", field: "expires_in" }
					.into());
			}

			let issued_at = OffsetDateTime::now_utc();
			let id_token = response.extra_fields().id_token.clone().map(Secret::new);

			Ok(TokenSet {
				access_token: Secret::new(response.access_token().secret().to_owned()),
				id_token,
				issued_at,
				expires_at: issued_at + Duration::seconds(expires_in),
			})
		})
	}
}

fn map_request_error<E, M>(
	endpoint: &'static str,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let status = meta.as_ref().and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => ExchangeError::provider(
			endpoint,
			status,
			Some(response.error().as_ref()),
			response.error_description().map(String::as_str),
		)
		.into(),
		RequestTokenError::Request(error) =>
			mapper.map_transport_error(endpoint, meta.as_ref(), error).into(),
		RequestTokenError::Parse(source, _body) =>
			ExchangeError::ResponseParse { endpoint, source }.into(),
		RequestTokenError::Other(reason) =>
			ExchangeError::Provider { endpoint, status, reason }.into(),
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::ProviderName,
		http::ReqwestHttpClient,
		provider::{ProviderKind, wellknown},
	};

	fn config(method: ClientAuthMethod) -> ProviderConfig {
		wellknown::google("client-id", "client-secret")
			.expect("Google preset endpoints should parse.")
			.client_auth_method(method)
			.build()
			.expect("Provider configuration should build successfully.")
	}

	#[test]
	fn builds_basic_auth_client() {
		let config = config(ClientAuthMethod::ClientSecretBasic);
		let result = <LoginFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>>::from_config(
			&config,
			Arc::new(ReqwestHttpClient::default()),
			Arc::new(ReqwestTransportErrorMapper),
		);

		assert!(result.is_ok());
	}

	#[test]
	fn builds_post_auth_client() {
		let config = config(ClientAuthMethod::ClientSecretPost);
		let result = <LoginFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>>::from_config(
			&config,
			Arc::new(ReqwestHttpClient::default()),
			Arc::new(ReqwestTransportErrorMapper),
		);

		assert!(result.is_ok());
	}

	#[test]
	fn oauth2_kind_configs_use_the_same_facade() {
		let config = wellknown::facebook("client-id", "client-secret")
			.expect("Facebook preset endpoints should parse.")
			.build()
			.expect("Provider configuration should build successfully.");

		assert_eq!(config.kind, ProviderKind::OAuth2);
		assert_eq!(config.name, ProviderName::new("facebook").expect("Name should be valid."));

		let result = <LoginFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>>::from_config(
			&config,
			Arc::new(ReqwestHttpClient::default()),
			Arc::new(ReqwestTransportErrorMapper),
		);

		assert!(result.is_ok());
	}
}
