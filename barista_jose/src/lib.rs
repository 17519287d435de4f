//! JOSE building blocks for verifying bearer tokens issued by an external
//! identity provider:
//!
//! * JSON Web Key (JWK) and key sets: [RFC7517][], RSA public keys only
//! * JSON Web Algorithms (JWA): [RFC7518][], the `RS*` and `PS*` families
//! * JSON Web Token (JWT): [RFC7519][], decomposition and claim validation
//!
//! Token issuance is deliberately absent; this crate only verifies.
//!
//! [RFC7517]: https://tools.ietf.org/html/rfc7517
//! [RFC7518]: https://tools.ietf.org/html/rfc7518
//! [RFC7519]: https://tools.ietf.org/html/rfc7519
//!
//! # Example
//!
//! ```
//! use barista_jose::{jwt, jwt::CoreHeaders, JwtRef};
//!
//! let token = JwtRef::from_str(concat!(
//!     "eyJhbGciOiJSUzI1NiIsImtpZCI6InByaW1hcnkifQ.",
//!     "eyJzdWIiOiJiYXJpc3RhIn0.",
//!     "c2lnbmF0dXJl"
//! ));
//!
//! let decomposed: jwt::Decomposed = token.decompose().unwrap();
//! assert_eq!(decomposed.kid().map(|k| k.as_str()), Some("primary"));
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

mod b64;
pub mod clock;
pub mod error;
pub mod jwa;
pub mod jwk;
mod jwks;
pub mod jws;
pub mod jwt;

#[doc(inline)]
pub use jwk::Jwk;
#[doc(inline)]
pub use jwks::Jwks;
#[doc(inline)]
pub use jwt::{Jwt, JwtRef};
