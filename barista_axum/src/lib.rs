//! Axum utilities for enforcing `barista_auth` permissions on handlers.
//!
//! Guards are declared with [`permission_guard!`] or [`permission_guards!`]
//! and used as extractors. Each guard pulls the [`Gate`] out of the router
//! state, authorizes the request for its permission, and yields the verified
//! [`Claims`]. Failures render as a JSON error body via [`AuthRejection`].
//!
//! # Example
//!
//! ```no_run
//! use axum::{routing::post, Router};
//! use barista_auth::{AuthConfig, Gate};
//!
//! mod permission {
//!     barista_axum::permission_guards! {
//!         pub permission PostDrinks = "post:drinks";
//!         pub permission AnyCaller = *;
//!     }
//! }
//!
//! async fn create_drink(permission::PostDrinks(claims): permission::PostDrinks) -> String {
//!     format!("created by {:?}", claims.subject())
//! }
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let gate = Gate::from_config(&AuthConfig::for_domain("barista.eu.auth0.com", "coffee-api"))?;
//! let router: Router = Router::new()
//!     .route("/drinks", post(create_drink))
//!     .with_state(gate);
//! # Ok(())
//! # }
//! ```
//!
//! [`Gate`]: barista_auth::Gate
//! [`Claims`]: barista_auth::Claims

#![warn(missing_docs, unused_imports, unused_qualifications)]
#![deny(missing_debug_implementations, unsafe_code, unused_must_use)]

use axum_core::response::{IntoResponse, Response};
use barista_auth::AuthorizationError;
use http::{header, HeaderValue, StatusCode};

mod macros;

/// Binds a guard type to the permission it enforces
pub trait EndpointPermission {
    /// The permission required; empty means any authenticated caller
    const PERMISSION: &'static str;
}

/// Rejection produced when a guard refuses a request
///
/// Renders as the error's status with a JSON body of the form
/// `{"success": false, "error": <status>, "message": <description>}`.
/// A `401` also carries a `WWW-Authenticate: Bearer error="invalid_token"`
/// header, and a `403` one with `error="insufficient_scope"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRejection(pub AuthorizationError);

impl From<AuthorizationError> for AuthRejection {
    fn from(err: AuthorizationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let err = self.0;
        let mut resp = json_error(err.status(), err.description());

        let www_authenticate = match err.status() {
            StatusCode::UNAUTHORIZED => Some(challenge("invalid_token", err.description())),
            StatusCode::FORBIDDEN => Some(challenge("insufficient_scope", err.description())),
            _ => None,
        };

        if let Some(value) = www_authenticate {
            resp.headers_mut().insert(header::WWW_AUTHENTICATE, value);
        }

        resp
    }
}

/// Builds the JSON error response shared by all failures
///
/// ```
/// use axum_core::response::Response;
/// use http::StatusCode;
///
/// let resp: Response = barista_axum::json_error(StatusCode::NOT_FOUND, "resource not found");
/// assert_eq!(resp.status(), StatusCode::NOT_FOUND);
/// ```
pub fn json_error(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({
        "success": false,
        "error": status.as_u16(),
        "message": message,
    });

    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}

// `escape_default` leaves only printable ASCII, so the header is always valid.
fn challenge(error: &str, description: &str) -> HeaderValue {
    let raw = if description.is_empty() {
        format!(r#"Bearer error="{error}""#)
    } else {
        format!(
            r#"Bearer error="{error}", error_description="{}""#,
            description.escape_default()
        )
    };

    HeaderValue::try_from(raw).unwrap_or_else(|_| HeaderValue::from_static("Bearer"))
}

#[doc(hidden)]
#[allow(missing_docs)]
pub mod __private {
    pub use barista_auth::{Claims, Gate};

    use barista_auth::PermissionRef;
    use http::request::Parts;

    use crate::AuthRejection;

    pub async fn authorize(
        gate: &Gate,
        parts: &Parts,
        permission: &'static str,
    ) -> Result<Claims, AuthRejection> {
        gate.authorize(PermissionRef::from_str(permission), &parts.headers)
            .await
            .map_err(AuthRejection)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn www_authenticate(resp: &Response) -> BTreeSet<&str> {
        resp.headers()
            .get_all(header::WWW_AUTHENTICATE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect()
    }

    #[test]
    fn unauthorized_challenge_is_escaped() {
        let resp = AuthRejection(AuthorizationError::new(
            barista_auth::ErrorKind::InvalidHeader,
            StatusCode::UNAUTHORIZED,
            "Authorization header must start with \"Bearer\".",
        ))
        .into_response();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            www_authenticate(&resp),
            BTreeSet::from([
                r#"Bearer error="invalid_token", error_description="Authorization header must start with \"Bearer\".""#
            ])
        );
    }

    #[test]
    fn forbidden_challenge_names_insufficient_scope() {
        let resp = AuthRejection(AuthorizationError::new(
            barista_auth::ErrorKind::Unauthorized,
            StatusCode::FORBIDDEN,
            "Permission not found.",
        ))
        .into_response();

        assert_eq!(
            www_authenticate(&resp),
            BTreeSet::from([
                r#"Bearer error="insufficient_scope", error_description="Permission not found.""#
            ])
        );
    }

    #[test]
    fn bad_request_has_no_challenge() {
        let resp = AuthRejection(AuthorizationError::new(
            barista_auth::ErrorKind::InvalidHeader,
            StatusCode::BAD_REQUEST,
            "Unable to parse authentication token.",
        ))
        .into_response();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(www_authenticate(&resp).is_empty());
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn non_ascii_descriptions_do_not_panic() {
        let value = challenge("invalid_token", "\0\n\ttest™");
        assert_eq!(
            value.to_str().unwrap(),
            r#"Bearer error="invalid_token", error_description="\u{0}\n\ttest\u{2122}""#
        );
    }
}
