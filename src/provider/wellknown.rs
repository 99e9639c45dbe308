//! Endpoint presets for standard providers.
//!
//! Each preset seeds a [`ProviderConfigBuilder`] with the provider's published OIDC discovery
//! values (or, for plain-OAuth2 providers, its documented endpoint set); callers attach their
//! client credentials and may override anything before building.

// self
use crate::{
	_prelude::*,
	auth::{ProviderName, Secret},
	provider::{ProviderConfig, ProviderConfigBuilder, ProviderConfigError, ProviderKind},
};

const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_JWKS_URI: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUER: &str = "https://accounts.google.com";
const GOOGLE_USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const FACEBOOK_AUTHORIZATION_ENDPOINT: &str = "https://www.facebook.com/v12.0/dialog/oauth";
const FACEBOOK_TOKEN_ENDPOINT: &str = "https://graph.facebook.com/v12.0/oauth/access_token";
const FACEBOOK_USERINFO_ENDPOINT: &str = "https://graph.facebook.com/me?fields=id,name,email";

/// Google login preset (OpenID Connect).
pub fn google(
	client_id: impl Into<String>,
	client_secret: impl Into<Secret>,
) -> Result<ProviderConfigBuilder, ProviderConfigError> {
	Ok(builder("google", ProviderKind::Oidc)?
		.authorization_endpoint(parse(GOOGLE_AUTHORIZATION_ENDPOINT)?)
		.token_endpoint(parse(GOOGLE_TOKEN_ENDPOINT)?)
		.jwks_uri(parse(GOOGLE_JWKS_URI)?)
		.userinfo_endpoint(parse(GOOGLE_USERINFO_ENDPOINT)?)
		.issuer(GOOGLE_ISSUER)
		.client_id(client_id)
		.client_secret(client_secret))
}

/// Facebook login preset (plain OAuth 2.0; identity comes from the Graph userinfo endpoint).
pub fn facebook(
	client_id: impl Into<String>,
	client_secret: impl Into<Secret>,
) -> Result<ProviderConfigBuilder, ProviderConfigError> {
	Ok(builder("facebook", ProviderKind::OAuth2)?
		.authorization_endpoint(parse(FACEBOOK_AUTHORIZATION_ENDPOINT)?)
		.token_endpoint(parse(FACEBOOK_TOKEN_ENDPOINT)?)
		.userinfo_endpoint(parse(FACEBOOK_USERINFO_ENDPOINT)?)
		.client_id(client_id)
		.client_secret(client_secret))
}

fn builder(name: &str, kind: ProviderKind) -> Result<ProviderConfigBuilder, ProviderConfigError> {
	Ok(ProviderConfig::builder(ProviderName::new(name)?, kind))
}

fn parse(raw: &str) -> Result<Url, ProviderConfigError> {
	Url::parse(raw).map_err(|_| ProviderConfigError::InvalidEndpoint { url: raw.to_owned() })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn presets_build_valid_configurations() {
		let google = google("client-id", "client-secret")
			.expect("Google preset endpoints should parse.")
			.build()
			.expect("Google preset should build successfully.");

		assert_eq!(google.kind, ProviderKind::Oidc);
		assert_eq!(google.issuer.as_deref(), Some(GOOGLE_ISSUER));
		assert!(google.scopes.contains("openid"));

		let facebook = facebook("client-id", "client-secret")
			.expect("Facebook preset endpoints should parse.")
			.build()
			.expect("Facebook preset should build successfully.");

		assert_eq!(facebook.kind, ProviderKind::OAuth2);
		assert!(facebook.endpoints.userinfo.is_some());
		assert!(facebook.issuer.is_none());
	}
}
