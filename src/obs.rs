//! Optional observability helpers for login flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oidc_login.flow` with the `stage`
//!   (state-machine step) and `provider` fields.
//! - Enable `metrics` to increment the `oidc_login_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Login-attempt stages observed by the coordinator.
///
/// One label per transition of the per-attempt state machine; a failed stage is terminal for
/// the attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoginStage {
	/// Authorization-code exchange against the token endpoint.
	Exchange,
	/// ID token verification (OIDC providers).
	Verify,
	/// Userinfo profile fetch (plain-OAuth2 providers).
	UserInfo,
	/// Claims-to-identity mapping.
	Map,
	/// Registration collaborator invocation.
	Register,
}
impl LoginStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LoginStage::Exchange => "exchange",
			LoginStage::Verify => "verify",
			LoginStage::UserInfo => "userinfo",
			LoginStage::Map => "map",
			LoginStage::Register => "register",
		}
	}
}
impl Display for LoginStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a coordinator stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
