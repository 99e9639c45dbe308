//! Canonical identity derived from provider claims, plus the claim-to-identity mapper.

// self
use crate::{
	_prelude::*,
	auth::{ProviderName, UserProfile, VerifiedClaims},
};

/// Error raised when a claim required for registration is absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
#[error("Required claim `{claim}` is absent from the provider response.")]
pub struct MissingClaimError {
	/// Name of the absent claim.
	pub claim: &'static str,
}

/// Source payload the identity mapper dispatches over.
///
/// OIDC providers hand over verified ID-token claims; plain-OAuth2 providers hand over a
/// userinfo profile. One tagged variant per provider family replaces per-family mapper
/// implementations.
#[derive(Clone, Debug)]
pub enum ClaimSource<'a> {
	/// Claims from a verified ID token.
	Oidc(&'a VerifiedClaims),
	/// Profile document from a userinfo endpoint.
	UserInfo(&'a UserProfile),
}

/// Externally visible result of a successful login.
///
/// Created only after verification, handed to the registration collaborator exactly once,
/// and never mutated or cached across requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
	/// Subject identifier, unique per provider.
	pub subject: String,
	/// Display name forwarded to registration.
	pub name: String,
	/// Email address forwarded to registration.
	pub email: String,
	/// Provider that authenticated the subject.
	pub provider: ProviderName,
}
impl Identity {
	/// Maps a claim source onto an identity.
	///
	/// Pure and side-effect free; fails when the `name` or `email` claim (or the subject, for
	/// userinfo profiles) is absent, since registration requires all of them.
	pub fn from_claims(
		provider: &ProviderName,
		source: ClaimSource,
	) -> Result<Self, MissingClaimError> {
		let (subject, name, email) = match source {
			ClaimSource::Oidc(claims) =>
				(Some(claims.subject.as_str()), claims.name.as_deref(), claims.email.as_deref()),
			ClaimSource::UserInfo(profile) =>
				(profile.subject.as_deref(), profile.name.as_deref(), profile.email.as_deref()),
		};
		let subject = subject.ok_or(MissingClaimError { claim: "sub" })?;
		let name = name.ok_or(MissingClaimError { claim: "name" })?;
		let email = email.ok_or(MissingClaimError { claim: "email" })?;

		Ok(Self {
			subject: subject.to_owned(),
			name: name.to_owned(),
			email: email.to_owned(),
			provider: provider.clone(),
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn claims() -> VerifiedClaims {
		VerifiedClaims {
			subject: "subject-1".into(),
			issuer: "https://accounts.google.com".into(),
			audience: vec!["client-id".into()],
			expires_at: macros::datetime!(2030-01-01 00:00 UTC),
			nonce: Some("nonce".into()),
			name: Some("Ada Lovelace".into()),
			email: Some("ada@example.com".into()),
		}
	}

	fn provider() -> ProviderName {
		ProviderName::new("google").expect("Provider name fixture should be valid.")
	}

	#[test]
	fn verified_claims_map_onto_identity() {
		let identity = Identity::from_claims(&provider(), ClaimSource::Oidc(&claims()))
			.expect("Complete claims should map successfully.");

		assert_eq!(identity.subject, "subject-1");
		assert_eq!(identity.name, "Ada Lovelace");
		assert_eq!(identity.email, "ada@example.com");
		assert_eq!(identity.provider.as_ref(), "google");
	}

	#[test]
	fn missing_name_or_email_fails_distinctly() {
		let mut nameless = claims();

		nameless.name = None;

		let err = Identity::from_claims(&provider(), ClaimSource::Oidc(&nameless))
			.expect_err("Missing name must fail the mapping.");

		assert_eq!(err.claim, "name");

		let mut emailless = claims();

		emailless.email = None;

		let err = Identity::from_claims(&provider(), ClaimSource::Oidc(&emailless))
			.expect_err("Missing email must fail the mapping.");

		assert_eq!(err.claim, "email");
	}

	#[test]
	fn userinfo_profiles_require_a_subject() {
		let profile = UserProfile {
			subject: None,
			name: Some("Ada Lovelace".into()),
			email: Some("ada@example.com".into()),
		};
		let err = Identity::from_claims(&provider(), ClaimSource::UserInfo(&profile))
			.expect_err("Missing subject must fail the mapping.");

		assert_eq!(err.claim, "sub");
	}
}
