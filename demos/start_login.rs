//! Walks through starting an OIDC login attempt and stashing the session for the
//! redirect handler to later complete.

// std
use std::{collections::HashMap, sync::Arc};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oidc_login::{
	flows::LoginCoordinator,
	provider::{ProviderRegistry, wellknown},
	registration::{MemoryRegistrationService, RegistrationService},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let registry = ProviderRegistry::new([
		wellknown::google("demo-client", "demo-secret")?.build()?,
		wellknown::facebook("demo-client", "demo-secret")?.build()?,
	])?;
	let registrar: Arc<dyn RegistrationService> = Arc::new(MemoryRegistrationService::default());
	let coordinator = LoginCoordinator::new(registry, registrar);
	let session = coordinator
		.start_login("google", Url::parse("https://app.example.com/oauth/callback")?)?;

	println!("Send your user to {}.", &session.authorize_url);
	println!(
		"PKCE challenge ({:?}): {}.",
		session.code_challenge_method(),
		session.code_challenge()
	);
	println!("ID token nonce: {}.", session.nonce());

	let mut sessions: HashMap<String, _> = HashMap::new();

	sessions.insert(session.state.clone(), session.clone());

	// Simulate the redirect handler looking up the stored session by `state`.
	let returned_state = session.state.clone();

	if let Some(stashed) = sessions.remove(&returned_state) {
		stashed.validate_state(&returned_state)?;
		println!("Validated state for provider {}.", &stashed.provider);
		println!(
			"Convert this session with LoginSession::into_authorization_code during the callback."
		);
	} else {
		eprintln!("State `{returned_state}` was not recognized.");
	}

	Ok(())
}
