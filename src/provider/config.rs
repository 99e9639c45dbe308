//! Provider configuration data structures and validation shared by all flows.

// self
use crate::{
	_prelude::*,
	auth::{ProviderName, ScopeSet, Secret},
};

/// Provider family a configuration belongs to.
///
/// The tag decides how an identity is derived after the code exchange: OIDC providers issue a
/// verifiable ID token, plain-OAuth2 providers only offer a userinfo endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
	#[default]
	/// OpenID Connect provider; identity comes from the verified ID token.
	Oidc,
	/// Plain OAuth 2.0 provider; identity comes from the userinfo endpoint.
	OAuth2,
}
impl ProviderKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::Oidc => "oidc",
			ProviderKind::OAuth2 => "oauth2",
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Endpoint set declared by a provider configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the end-user is redirected to.
	pub authorization: Url,
	/// Token endpoint used for the authorization-code exchange.
	pub token: Url,
	/// JWKS endpoint publishing the provider's signing keys (OIDC providers).
	pub jwks: Option<Url>,
	/// Userinfo endpoint (plain-OAuth2 providers, optional for OIDC).
	pub userinfo: Option<Url>,
}

/// Immutable provider configuration consumed by login flows.
///
/// One per configured provider, keyed uniquely by name inside the registry; never mutated
/// after [`build`](ProviderConfigBuilder::build) validates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// Registry key for the provider.
	pub name: ProviderName,
	/// Provider family tag.
	pub kind: ProviderKind,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Issuer identifier ID tokens must carry (OIDC providers).
	pub issuer: Option<String>,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Confidential client secret.
	pub client_secret: Secret,
	/// Scopes requested during authorization.
	pub scopes: ScopeSet,
	/// Preferred client authentication mechanism.
	pub client_auth_method: ClientAuthMethod,
}
impl ProviderConfig {
	/// Creates a new builder for the provided name and family.
	pub fn builder(name: ProviderName, kind: ProviderKind) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(name, kind)
	}
}

/// Errors raised while constructing or validating provider configurations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ProviderConfigError {
	/// Provider name failed validation.
	#[error(transparent)]
	InvalidName(#[from] crate::auth::ProviderNameError),
	/// Endpoint URL cannot be parsed.
	#[error("Endpoint URL is invalid: {url}.")]
	InvalidEndpoint {
		/// The offending URL string.
		url: String,
	},
	/// Authorization endpoint is required for every provider.
	#[error("Provider `{name}` is missing an authorization endpoint.")]
	MissingAuthorizationEndpoint {
		/// Provider name.
		name: String,
	},
	/// Token endpoint is required for every provider.
	#[error("Provider `{name}` is missing a token endpoint.")]
	MissingTokenEndpoint {
		/// Provider name.
		name: String,
	},
	/// OIDC providers must publish their signing keys.
	#[error("OIDC provider `{name}` is missing a JWKS endpoint.")]
	MissingJwksUri {
		/// Provider name.
		name: String,
	},
	/// OIDC providers must declare the issuer their tokens carry.
	#[error("OIDC provider `{name}` is missing an issuer.")]
	MissingIssuer {
		/// Provider name.
		name: String,
	},
	/// Plain-OAuth2 providers must expose a userinfo endpoint.
	#[error("OAuth2 provider `{name}` is missing a userinfo endpoint.")]
	MissingUserinfoEndpoint {
		/// Provider name.
		name: String,
	},
	/// Client identifier must be present and non-empty.
	#[error("Provider `{name}` is missing a client identifier.")]
	MissingClientId {
		/// Provider name.
		name: String,
	},
	/// Client secret must be present and non-empty.
	#[error("Provider `{name}` is missing a client secret.")]
	MissingClientSecret {
		/// Provider name.
		name: String,
	},
	/// OIDC logins require the `openid` scope.
	#[error("OIDC provider `{name}` must request the `openid` scope.")]
	ScopesMissingOpenid {
		/// Provider name.
		name: String,
	},
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Registry entries must be keyed uniquely.
	#[error("Provider `{name}` is registered more than once.")]
	DuplicateProvider {
		/// Provider name.
		name: String,
	},
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
	/// Registry key for the configuration being constructed.
	pub name: ProviderName,
	/// Provider family tag.
	pub kind: ProviderKind,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint.
	pub token_endpoint: Option<Url>,
	/// JWKS endpoint.
	pub jwks_uri: Option<Url>,
	/// Userinfo endpoint.
	pub userinfo_endpoint: Option<Url>,
	/// Issuer identifier.
	pub issuer: Option<String>,
	/// Client identifier.
	pub client_id: Option<String>,
	/// Client secret.
	pub client_secret: Option<Secret>,
	/// Requested scopes; defaults depend on the provider family.
	pub scopes: Option<ScopeSet>,
	/// Preferred client authentication method.
	pub client_auth_method: ClientAuthMethod,
}
impl ProviderConfigBuilder {
	/// Creates a new builder seeded with the provided name and family.
	pub fn new(name: ProviderName, kind: ProviderKind) -> Self {
		Self {
			name,
			kind,
			authorization_endpoint: None,
			token_endpoint: None,
			jwks_uri: None,
			userinfo_endpoint: None,
			issuer: None,
			client_id: None,
			client_secret: None,
			scopes: None,
			client_auth_method: ClientAuthMethod::default(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the JWKS endpoint.
	pub fn jwks_uri(mut self, url: Url) -> Self {
		self.jwks_uri = Some(url);

		self
	}

	/// Sets the userinfo endpoint.
	pub fn userinfo_endpoint(mut self, url: Url) -> Self {
		self.userinfo_endpoint = Some(url);

		self
	}

	/// Sets the issuer identifier ID tokens must carry.
	pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
		self.issuer = Some(issuer.into());

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, client_secret: impl Into<Secret>) -> Self {
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Overrides the requested scopes.
	pub fn scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = Some(scopes);

		self
	}

	/// Overrides the preferred client authentication method.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ProviderConfigError> {
		let name = self.name;
		let authorization = self.authorization_endpoint.ok_or_else(|| {
			ProviderConfigError::MissingAuthorizationEndpoint { name: name.to_string() }
		})?;
		let token = self
			.token_endpoint
			.ok_or_else(|| ProviderConfigError::MissingTokenEndpoint { name: name.to_string() })?;
		let client_id = self
			.client_id
			.filter(|id| !id.is_empty())
			.ok_or_else(|| ProviderConfigError::MissingClientId { name: name.to_string() })?;
		let client_secret = self
			.client_secret
			.filter(|secret| !secret.is_empty())
			.ok_or_else(|| ProviderConfigError::MissingClientSecret { name: name.to_string() })?;
		let scopes = match self.scopes {
			Some(scopes) => scopes,
			None => default_scopes(self.kind)?,
		};
		let issuer = self.issuer.filter(|issuer| !issuer.is_empty());

		match self.kind {
			ProviderKind::Oidc => {
				if self.jwks_uri.is_none() {
					return Err(ProviderConfigError::MissingJwksUri { name: name.to_string() });
				}
				if issuer.is_none() {
					return Err(ProviderConfigError::MissingIssuer { name: name.to_string() });
				}
				if !scopes.contains("openid") {
					return Err(ProviderConfigError::ScopesMissingOpenid {
						name: name.to_string(),
					});
				}
			},
			ProviderKind::OAuth2 =>
				if self.userinfo_endpoint.is_none() {
					return Err(ProviderConfigError::MissingUserinfoEndpoint {
						name: name.to_string(),
					});
				},
		}

		let config = ProviderConfig {
			name,
			kind: self.kind,
			endpoints: ProviderEndpoints {
				authorization,
				token,
				jwks: self.jwks_uri,
				userinfo: self.userinfo_endpoint,
			},
			issuer,
			client_id,
			client_secret,
			scopes,
			client_auth_method: self.client_auth_method,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ProviderConfig {
	/// Validates endpoint invariants for the configuration.
	fn validate(&self) -> Result<(), ProviderConfigError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;

		if let Some(jwks) = self.endpoints.jwks.as_ref() {
			validate_endpoint("jwks", jwks)?;
		}
		if let Some(userinfo) = self.endpoints.userinfo.as_ref() {
			validate_endpoint("userinfo", userinfo)?;
		}

		Ok(())
	}
}

fn default_scopes(kind: ProviderKind) -> Result<ScopeSet, crate::auth::ScopeValidationError> {
	let defaults: &[&str] = match kind {
		ProviderKind::Oidc => &["openid", "profile", "email"],
		ProviderKind::OAuth2 => &["email"],
	};

	ScopeSet::new(defaults.iter().copied())
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderConfigError> {
	if url.scheme() != "https" {
		Err(ProviderConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}
