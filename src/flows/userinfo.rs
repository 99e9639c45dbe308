//! Userinfo profile retrieval for plain-OAuth2 providers.

// crates.io
use oauth2::{AsyncHttpClient, http};
// self
use crate::{
	_prelude::*,
	auth::{Secret, UserProfile},
	error::ExchangeError,
	http::{ResponseMetadataSlot, TokenHttpClient},
};

/// Fetches the userinfo profile with the freshly issued access token.
///
/// Plain-OAuth2 providers have no ID token to verify, so this HTTPS call is where their
/// identity claims come from. Failures reuse the exchange taxonomy since the request shares
/// the token endpoint's transport.
pub(crate) async fn fetch_user_profile<C>(
	http_client: &C,
	endpoint: &Url,
	access_token: &Secret,
) -> Result<UserProfile, ExchangeError>
where
	C: ?Sized + TokenHttpClient,
{
	let handle = http_client.with_metadata(ResponseMetadataSlot::default());
	let request = http::Request::builder()
		.method(http::Method::GET)
		.uri(endpoint.as_str())
		.header(http::header::ACCEPT, "application/json")
		.header(http::header::AUTHORIZATION, format!("Bearer {}", access_token.expose()))
		.body(Vec::new())
		.map_err(|err| ExchangeError::network("userinfo", err))?;
	let response = handle
		.call(request)
		.await
		.map_err(|err| ExchangeError::network("userinfo", err))?;
	let status = response.status();

	if !status.is_success() {
		return Err(ExchangeError::provider("userinfo", Some(status.as_u16()), None, None));
	}

	let mut deserializer = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ExchangeError::ResponseParse { endpoint: "userinfo", source })
}
