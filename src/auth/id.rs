//! Strongly typed provider identifier enforced across the coordinator domain.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const PROVIDER_NAME_MAX_LEN: usize = 128;

/// Error returned when provider name validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ProviderNameError {
	/// The name was empty.
	#[error("Provider name cannot be empty.")]
	Empty,
	/// The name contains whitespace characters.
	#[error("Provider name contains whitespace.")]
	ContainsWhitespace,
	/// The name exceeded the allowed character count.
	#[error("Provider name exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Registry key identifying a configured identity provider (e.g. `google`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderName(String);
impl ProviderName {
	/// Creates a new provider name after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, ProviderNameError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for ProviderName {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ProviderName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<ProviderName> for String {
	fn from(value: ProviderName) -> Self {
		value.0
	}
}
impl TryFrom<String> for ProviderName {
	type Error = ProviderNameError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Borrow<str> for ProviderName {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for ProviderName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Provider({})", self.0)
	}
}
impl Display for ProviderName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for ProviderName {
	type Err = ProviderNameError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), ProviderNameError> {
	if view.is_empty() {
		return Err(ProviderNameError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(ProviderNameError::ContainsWhitespace);
	}
	if view.len() > PROVIDER_NAME_MAX_LEN {
		return Err(ProviderNameError::TooLong { max: PROVIDER_NAME_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn names_validate_shape() {
		assert!(ProviderName::new(" google").is_err(), "Leading whitespace must be rejected.");
		assert!(ProviderName::new("google ").is_err(), "Trailing whitespace must be rejected.");
		assert!(ProviderName::new("").is_err());
		assert!(ProviderName::new("with space").is_err());

		let name = ProviderName::new("google").expect("Name fixture should be considered valid.");

		assert_eq!(name.as_ref(), "google");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let payload = "\"google\"";
		let name: ProviderName =
			serde_json::from_str(payload).expect("Name should deserialize successfully.");

		assert_eq!(name.as_ref(), "google");
		assert!(serde_json::from_str::<ProviderName>("\"with space\"").is_err());
	}

	#[test]
	fn length_limit_is_enforced() {
		let exact = "a".repeat(PROVIDER_NAME_MAX_LEN);

		ProviderName::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(PROVIDER_NAME_MAX_LEN + 1);

		assert!(ProviderName::new(&too_long).is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<ProviderName, u8> = HashMap::from_iter([(
			ProviderName::new("google").expect("Name used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("google"), Some(&7));
	}
}
