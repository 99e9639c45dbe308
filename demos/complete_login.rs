//! Interactive OIDC login walkthrough for Google.
//!
//! The example prints the authorize URL, waits for the user to paste the returned
//! `state` and `code` parameters via stdin, completes the login (exchange, ID token
//! verification, claim mapping), and shows what the registration service received.

// std
use std::{
	io::{self, Write},
	sync::Arc,
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oidc_login::{
	flows::LoginCoordinator,
	provider::{ProviderRegistry, wellknown},
	registration::{MemoryRegistrationService, RegistrationService},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let client_id = prompt_with_default("Enter your Google client ID", Some("demo-client"))?;
	let client_secret = prompt_with_default("Enter your Google client secret", None)?;
	let redirect_input = prompt_with_default(
		"Enter the redirect URI registered with Google",
		Some("https://app.example.com/oauth/callback"),
	)?;
	let redirect_uri = Url::parse(&redirect_input)?;
	let registry =
		ProviderRegistry::new([wellknown::google(client_id, client_secret)?.build()?])?;
	let registrar_backend = Arc::new(MemoryRegistrationService::default());
	let registrar: Arc<dyn RegistrationService> = registrar_backend.clone();
	let coordinator = LoginCoordinator::new(registry, registrar);
	let session = coordinator.start_login("google", redirect_uri)?;

	println!("Authorize URL: {}", &session.authorize_url);
	println!(
		"After Google redirects back to your app, copy the `state` and `code` query parameters and paste them here."
	);

	let returned_state = prompt_with_default(
		"State (press Enter to reuse the generated value)",
		Some(session.state.as_str()),
	)?;
	let authorization_code =
		prompt_optional("Authorization code (leave blank to skip the live login)")?;

	if let Some(code) = authorization_code {
		let code = session.into_authorization_code(&returned_state, code)?;
		let identity = coordinator.complete_login("google", code).await?;

		println!("Subject: {}", identity.subject);
		println!("Name: {}", identity.name);
		println!("Email: {}", identity.email);
		println!(
			"Registered name on record: {:?}",
			registrar_backend.registered_name(&identity.email)
		);

		return Ok(());
	}

	session.validate_state(&returned_state)?;
	println!("Authorization code not provided; skipping the login completion.");
	println!(
		"Persist the session details and call LoginCoordinator::complete_login once a real authorization code is available."
	);

	Ok(())
}

fn prompt_with_default(message: &str, default: Option<&str>) -> Result<String> {
	loop {
		if let Some(value) = default {
			print!("{message} [{value}]: ");
		} else {
			print!("{message}: ");
		}

		io::stdout().flush()?;

		let mut input = String::new();

		io::stdin().read_line(&mut input)?;

		let trimmed = input.trim();

		if trimmed.is_empty() {
			if let Some(value) = default {
				return Ok(value.to_owned());
			}
		} else {
			return Ok(trimmed.to_owned());
		}
	}
}

fn prompt_optional(message: &str) -> Result<Option<String>> {
	print!("{message}: ");

	io::stdout().flush()?;

	let mut input = String::new();

	io::stdin().read_line(&mut input)?;

	let trimmed = input.trim();

	if trimmed.is_empty() { Ok(None) } else { Ok(Some(trimmed.to_owned())) }
}
