//! Bearer token extraction from request headers

use barista_jose::Jwt;
use http::{header, HeaderMap};

use crate::AuthorizationError;

/// Pulls the bearer token out of the `Authorization` header
///
/// The header must hold exactly two whitespace-separated parts, the first
/// being `Bearer` in any case. The token itself is not inspected here.
///
/// # Errors
///
/// * `authorization_header_missing` (401) if no header is present
/// * `invalid_header` (401) for anything that is not `Bearer <token>`
pub fn extract(headers: &HeaderMap) -> Result<Jwt, AuthorizationError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(AuthorizationError::header_missing)?
        .to_str()
        .map_err(|_| AuthorizationError::header_not_visible_ascii())?;

    let mut parts = value.split_whitespace();

    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => {}
        _ => return Err(AuthorizationError::not_bearer()),
    }

    let token = parts.next().ok_or_else(AuthorizationError::token_not_found)?;

    if parts.next().is_some() {
        return Err(AuthorizationError::not_bearer_token());
    }

    Ok(Jwt::from(token.to_owned()))
}
