//! Auth-domain identifiers, scopes, token material, claims, and identities.

pub mod claims;
pub mod id;
pub mod identity;
pub mod scope;
pub mod secret;
pub mod token;

pub use claims::*;
pub use id::*;
pub use identity::*;
pub use scope::*;
pub use secret::*;
pub use token::*;
