//! Immutable provider registry shared across login attempts.

// self
use crate::{
	_prelude::*,
	auth::ProviderName,
	provider::{ProviderConfig, ProviderConfigError},
};

/// Read-only name-to-configuration map built once at process start.
///
/// The registry is constructed from validated configurations and handed to the coordinator by
/// `Arc`; there is no ambient global state and nothing is mutable after construction.
#[derive(Clone, Debug)]
pub struct ProviderRegistry {
	providers: HashMap<ProviderName, ProviderConfig>,
}
impl ProviderRegistry {
	/// Builds a registry from the provided configurations.
	///
	/// Fails when two configurations share a name; every configuration has already passed its
	/// own builder validation.
	pub fn new(
		configs: impl IntoIterator<Item = ProviderConfig>,
	) -> Result<Self, ProviderConfigError> {
		let mut providers = HashMap::new();

		for config in configs {
			let name = config.name.clone();

			if providers.insert(name.clone(), config).is_some() {
				return Err(ProviderConfigError::DuplicateProvider { name: name.to_string() });
			}
		}

		Ok(Self { providers })
	}

	/// Looks up the configuration registered under `name`.
	pub fn get(&self, name: &str) -> Result<&ProviderConfig> {
		self.providers
			.get(name)
			.ok_or_else(|| Error::UnknownProvider { name: name.to_owned() })
	}

	/// Returns true if a provider is registered under `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.providers.contains_key(name)
	}

	/// Iterator over the registered provider names.
	pub fn names(&self) -> impl Iterator<Item = &ProviderName> {
		self.providers.keys()
	}

	/// Number of registered providers.
	pub fn len(&self) -> usize {
		self.providers.len()
	}

	/// Returns true if no providers are registered.
	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::wellknown;

	#[test]
	fn lookup_misses_surface_the_requested_name() {
		let registry = ProviderRegistry::new([wellknown::google("id", "secret")
			.expect("Google preset endpoints should parse.")
			.build()
			.expect("Google preset should build successfully.")])
		.expect("Registry fixture should build successfully.");

		assert!(registry.contains("google"));

		let err = registry.get("github").expect_err("Unregistered names must fail the lookup.");

		assert!(matches!(err, Error::UnknownProvider { name } if name == "github"));
	}

	#[test]
	fn duplicate_names_are_rejected() {
		let config = wellknown::google("id", "secret")
			.expect("Google preset endpoints should parse.")
			.build()
			.expect("Google preset should build successfully.");
		let err = ProviderRegistry::new([config.clone(), config])
			.expect_err("Duplicate names must fail registry construction.");

		assert!(matches!(err, ProviderConfigError::DuplicateProvider { name } if name == "google"));
	}
}
