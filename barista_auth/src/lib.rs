//! Authorization of HTTP requests by bearer tokens issued by an external
//! identity provider.
//!
//! A [`Gate`] composes the pieces in order:
//!
//! 1. [`extract`] pulls the token out of the `Authorization` header,
//! 2. [`KeyCache`] supplies the provider's current signing keys,
//! 3. [`TokenVerifier`] checks signature, expiry, audience, and issuer,
//! 4. [`permission::check`] enforces the permission a route requires.
//!
//! The first failure becomes an [`AuthorizationError`] carrying its kind,
//! HTTP status, and description.
//!
//! # Example
//!
//! ```no_run
//! use barista_auth::{AuthConfig, Gate, PermissionRef};
//! use http::HeaderMap;
//!
//! # async fn run(headers: HeaderMap) -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::for_domain("barista.eu.auth0.com", "coffee-api");
//! let gate = Gate::from_config(&config)?;
//!
//! let claims = gate
//!     .authorize(PermissionRef::from_str("post:drinks"), &headers)
//!     .await?;
//! println!("authorized {:?}", claims.subject());
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

mod cache;
mod claims;
mod config;
mod error;
pub mod extract;
mod gate;
pub mod permission;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
mod verifier;

pub use cache::{CacheOptions, KeyCache};
pub use claims::{Claims, Iter, Permission, PermissionRef, Permissions};
pub use config::{AuthConfig, InvalidAuthConfig};
pub use error::{AuthorizationError, ErrorKind, KeyFetchError};
pub use extract::extract;
pub use gate::{Gate, GateSetupError, Guarded};
pub use verifier::{Pending, TokenVerifier};
