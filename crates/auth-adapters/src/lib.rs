//! # auth-adapters
//!
//! Identity provider implementations of the `domains` sign-in port: the
//! campus identity gateway (device-authorization flow) and a local provider
//! for development profiles and tests.

pub mod dev;
#[cfg(feature = "auth-oidc")]
pub mod oidc;

pub use dev::DevIdentityProvider;
#[cfg(feature = "auth-oidc")]
pub use oidc::{OidcConfig, OidcIdentityProvider};
