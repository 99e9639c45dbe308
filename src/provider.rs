//! Provider-facing configuration (data) and the registry that owns it.
//!
//! `config` exposes validated per-provider metadata (`ProviderConfig`) covering HTTPS-only
//! endpoints, client credentials, the provider family tag, and requested scopes.
//! `registry` exposes [`ProviderRegistry`], the immutable name-to-config map built once at
//! startup and shared by reference with every login attempt. `wellknown` carries endpoint
//! presets for standard providers.

pub mod config;
pub mod registry;
pub mod wellknown;

pub use config::*;
pub use registry::*;
