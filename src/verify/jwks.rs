//! Provider signing-key cache with coalesced refreshes.
//!
//! Keys are cached per JWKS URI and looked up by key identifier. A lookup miss triggers a
//! refetch, and concurrent misses for the same key set piggy-back on one in-flight fetch
//! through a per-URI singleflight guard instead of stampeding the JWKS endpoint: each entry
//! carries a version counter, and a waiter that acquires the guard after another task already
//! refreshed simply rereads the cache.

// crates.io
use jsonwebtoken::{
	DecodingKey,
	jwk::{Jwk, JwkSet},
};
use oauth2::{AsyncHttpClient, http};
// self
use crate::{
	_prelude::*,
	error::VerifyError,
	http::{ResponseMetadataSlot, TokenHttpClient},
};

/// Shared signing-key cache used by every verification running through a coordinator.
///
/// Reads take a `parking_lot` read lock only; refreshes serialize per JWKS URI on an async
/// guard so the cache never blocks an executor thread while the network call is in flight.
#[derive(Default)]
pub struct KeyCache {
	sets: RwLock<HashMap<String, KeySetEntry>>,
	refresh_guards: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}
impl KeyCache {
	/// Looks up a decoding key in the cached set for `jwks_uri`.
	///
	/// With a key identifier the matching key is returned; without one the set must contain
	/// exactly one key for the lookup to succeed.
	pub(crate) fn find(&self, jwks_uri: &Url, kid: Option<&str>) -> Option<DecodingKey> {
		let sets = self.sets.read();
		let entry = sets.get(jwks_uri.as_str())?;
		let jwk = match kid {
			Some(kid) =>
				entry.keys.keys.iter().find(|key| key.common.key_id.as_deref() == Some(kid)),
			None =>
				if entry.keys.keys.len() == 1 {
					entry.keys.keys.first()
				} else {
					None
				},
		}?;

		decoding_key(jwk)
	}

	/// Returns the version of the cached set for `jwks_uri`, if any.
	pub(crate) fn version(&self, jwks_uri: &Url) -> Option<u64> {
		self.sets.read().get(jwks_uri.as_str()).map(|entry| entry.version)
	}

	/// Refetches the key set for `jwks_uri` unless another task already did.
	///
	/// `seen_version` is the version the caller observed when its lookup missed; if the
	/// cached version moved past it while the caller waited on the guard, the refetch is
	/// skipped and the caller rereads the cache.
	pub(crate) async fn refresh<C>(
		&self,
		http_client: &C,
		jwks_uri: &Url,
		seen_version: Option<u64>,
	) -> Result<(), VerifyError>
	where
		C: ?Sized + TokenHttpClient,
	{
		let guard = self.refresh_guard(jwks_uri);
		let _singleflight = guard.lock().await;

		if self.version(jwks_uri) != seen_version {
			return Ok(());
		}

		let keys = fetch_key_set(http_client, jwks_uri).await?;
		let mut sets = self.sets.write();
		let entry = sets.entry(jwks_uri.as_str().to_owned()).or_default();

		entry.keys = keys;
		entry.version += 1;

		Ok(())
	}

	/// Returns (and creates on demand) the singleflight guard for a JWKS URI.
	fn refresh_guard(&self, jwks_uri: &Url) -> Arc<AsyncMutex<()>> {
		let mut guards = self.refresh_guards.lock();

		guards.entry(jwks_uri.as_str().to_owned()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}

	#[cfg(test)]
	fn seed(&self, jwks_uri: &Url, keys: JwkSet) {
		let mut sets = self.sets.write();
		let entry = sets.entry(jwks_uri.as_str().to_owned()).or_default();

		entry.keys = keys;
		entry.version += 1;
	}
}
impl Debug for KeyCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("KeyCache").field("cached_sets", &self.sets.read().len()).finish()
	}
}

struct KeySetEntry {
	keys: JwkSet,
	version: u64,
}
impl Default for KeySetEntry {
	fn default() -> Self {
		Self { keys: JwkSet { keys: Vec::new() }, version: 0 }
	}
}

fn decoding_key(jwk: &Jwk) -> Option<DecodingKey> {
	DecodingKey::from_jwk(jwk).ok()
}

async fn fetch_key_set<C>(http_client: &C, jwks_uri: &Url) -> Result<JwkSet, VerifyError>
where
	C: ?Sized + TokenHttpClient,
{
	let handle = http_client.with_metadata(ResponseMetadataSlot::default());
	let request = http::Request::builder()
		.method(http::Method::GET)
		.uri(jwks_uri.as_str())
		.header(http::header::ACCEPT, "application/json")
		.body(Vec::new())
		.map_err(VerifyError::key_fetch)?;
	let response = handle.call(request).await.map_err(VerifyError::key_fetch)?;
	let status = response.status();

	if !status.is_success() {
		return Err(VerifyError::KeyFetch { status: Some(status.as_u16()), source: None });
	}

	let mut deserializer = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| VerifyError::KeySetParse { source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn oct_key_set(kids: &[&str]) -> JwkSet {
		let keys = kids
			.iter()
			.map(|kid| {
				format!(
					"{{\"kty\":\"oct\",\"kid\":\"{kid}\",\"alg\":\"HS256\",\"k\":\"c2VjcmV0LWJ5dGVz\"}}"
				)
			})
			.collect::<Vec<_>>()
			.join(",");

		serde_json::from_str(&format!("{{\"keys\":[{keys}]}}"))
			.expect("JWKS fixture should deserialize.")
	}

	fn uri() -> Url {
		Url::parse("https://provider.example.com/jwks").expect("JWKS URI fixture should parse.")
	}

	#[test]
	fn lookup_matches_by_key_identifier() {
		let cache = KeyCache::default();
		let uri = uri();

		assert!(cache.find(&uri, Some("key-1")).is_none(), "Empty cache must miss.");
		assert_eq!(cache.version(&uri), None);

		cache.seed(&uri, oct_key_set(&["key-1", "key-2"]));

		assert!(cache.find(&uri, Some("key-1")).is_some());
		assert!(cache.find(&uri, Some("key-3")).is_none());
		assert_eq!(cache.version(&uri), Some(1));
	}

	#[test]
	fn kid_less_lookup_requires_a_single_key() {
		let cache = KeyCache::default();
		let uri = uri();

		cache.seed(&uri, oct_key_set(&["only"]));

		assert!(cache.find(&uri, None).is_some());

		cache.seed(&uri, oct_key_set(&["key-1", "key-2"]));

		assert!(cache.find(&uri, None).is_none(), "Ambiguous key sets must not match.");
	}
}
