//! Registration collaborator contract and the built-in in-memory implementation.

// self
use crate::_prelude::*;

/// Boxed future returned by [`RegistrationService`] implementations.
pub type RegistrationFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, RegistrationError>> + 'a + Send>>;

/// User-registration contract invoked once per successful login.
///
/// The coordinator calls [`request_registration`](Self::request_registration) synchronously
/// after verification and before returning the identity to the caller. Implementations own
/// persistence and must treat repeated identical `(name, email)` pairs as upserts, since the
/// same user logging in twice must not fail the second attempt.
pub trait RegistrationService
where
	Self: Send + Sync,
{
	/// Registers (or re-registers) the verified user.
	fn request_registration<'a>(
		&'a self,
		name: &'a str,
		email: &'a str,
	) -> RegistrationFuture<'a, ()>;
}

/// Error type produced by [`RegistrationService`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum RegistrationError {
	/// Backend-level failure of the registration store.
	#[error("Registration backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// The collaborator refused the registration.
	#[error("Registration rejected: {message}.")]
	Rejected {
		/// Human-readable error payload.
		message: String,
	},
}

type RegistryMap = Arc<RwLock<RegistryInner>>;

#[derive(Debug, Default)]
struct RegistryInner {
	users: HashMap<String, String>,
	calls: u64,
}

/// Thread-safe registration backend that keeps users in-process for tests and demos.
///
/// Registrations upsert by email, and every invocation is counted so callers can assert the
/// coordinator's exactly-once guarantee.
#[derive(Clone, Debug, Default)]
pub struct MemoryRegistrationService(RegistryMap);
impl MemoryRegistrationService {
	fn register_now(map: RegistryMap, name: String, email: String) -> Result<(), RegistrationError> {
		let mut guard = map.write();

		guard.calls += 1;
		guard.users.insert(email, name);

		Ok(())
	}

	/// Returns the registered display name for an email, if any.
	pub fn registered_name(&self, email: &str) -> Option<String> {
		self.0.read().users.get(email).cloned()
	}

	/// Number of distinct registered users.
	pub fn len(&self) -> usize {
		self.0.read().users.len()
	}

	/// Returns true if no user has been registered.
	pub fn is_empty(&self) -> bool {
		self.0.read().users.is_empty()
	}

	/// Total number of registration invocations, including upserts.
	pub fn call_count(&self) -> u64 {
		self.0.read().calls
	}
}
impl RegistrationService for MemoryRegistrationService {
	fn request_registration<'a>(
		&'a self,
		name: &'a str,
		email: &'a str,
	) -> RegistrationFuture<'a, ()> {
		let map = self.0.clone();
		let name = name.to_owned();
		let email = email.to_owned();

		Box::pin(async move { Self::register_now(map, name, email) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn repeated_registrations_upsert_by_email() {
		let service = MemoryRegistrationService::default();

		service
			.request_registration("Ada Lovelace", "ada@example.com")
			.await
			.expect("First registration should succeed.");
		service
			.request_registration("Ada Lovelace", "ada@example.com")
			.await
			.expect("Repeated registration must be tolerated.");

		assert_eq!(service.len(), 1);
		assert_eq!(service.call_count(), 2);
		assert_eq!(service.registered_name("ada@example.com").as_deref(), Some("Ada Lovelace"));
	}

	#[test]
	fn registration_errors_render_their_context() {
		let err = RegistrationError::Backend { message: "database unreachable".into() };

		assert!(err.to_string().contains("database unreachable"));
	}
}
