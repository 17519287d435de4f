//! Errors raised while reading keys and verifying tokens

use std::error::Error as StdError;

use thiserror::Error;

use crate::jwa;

type Source = Box<dyn StdError + Send + Sync + 'static>;

/// The provided name could not be matched with supported algorithms
#[derive(Debug, Error)]
#[error("'{alg}' does not match supported algorithms")]
pub struct UnknownAlgorithm {
    alg: String,
}

impl UnknownAlgorithm {
    /// The name that was not recognized
    #[must_use]
    pub fn name(&self) -> &str {
        &self.alg
    }
}

#[inline]
pub(crate) fn unknown_algorithm(alg: impl Into<String>) -> UnknownAlgorithm {
    UnknownAlgorithm { alg: alg.into() }
}

/// RSA key parameters that cannot be used for verification
#[derive(Debug, Error)]
#[error("key rejected: {reason}")]
pub struct KeyRejected {
    reason: Source,
}

pub(crate) fn key_rejected(reason: impl Into<Source>) -> KeyRejected {
    KeyRejected {
        reason: reason.into(),
    }
}

/// An error occurring while verifying a signature with a JWK
#[derive(Debug, Error)]
pub enum JwkVerifyError {
    /// The key is pinned to, or cannot serve, a different algorithm
    #[error("key incompatible with algorithm '{0}'")]
    IncompatibleAlgorithm(jwa::Algorithm),

    /// The key is not meant for signature verification
    #[error("key is not intended for signing")]
    UsageMismatch,

    /// Signature is invalid
    #[error("signature mismatch")]
    SignatureMismatch,
}

/// An error occurring while verifying a JWT
#[derive(Debug, Error)]
pub enum JwtVerifyError {
    /// The JWT was rejected by the JWK
    #[error("token rejected by JWK")]
    Key(#[from] JwkVerifyError),

    /// The JWT does not have exactly three sections
    #[error("malformed JWT")]
    Malformed,

    /// The JWT header is not base64url-encoded JSON of the expected shape
    #[error("malformed JWT header")]
    MalformedHeader(#[source] Source),

    /// The JWT payload is not base64url-encoded JSON of the expected shape
    #[error("malformed JWT payload")]
    MalformedPayload(#[source] Source),

    /// The JWT signature is not base64url-encoded
    #[error("malformed JWT signature")]
    MalformedSignature(#[source] Source),

    /// The JWT was rejected by the claims validator
    #[error("token rejected by claims validator")]
    ClaimsRejected(#[from] ClaimsRejected),
}

/// An error occurring when validating the claims of a JWT
#[derive(Debug, Error)]
pub enum ClaimsRejected {
    /// The token algorithm is not on the allow-list
    #[error("invalid algorithm")]
    InvalidAlgorithm,

    /// The token audience is not acceptable
    #[error("invalid audience")]
    InvalidAudience,

    /// The token issuer is not acceptable
    #[error("invalid issuer")]
    InvalidIssuer,

    /// The token is expired according to the `exp` claim
    #[error("token expired")]
    TokenExpired,

    /// The token is not yet valid according to the `nbf` claim
    #[error("token not yet valid")]
    TokenNotYetValid,

    /// A required claim is missing
    #[error("required {0} claim missing")]
    MissingRequiredClaim(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_are_chained() {
        let err = JwtVerifyError::MalformedHeader("expected value at line 1".into());
        assert_eq!(err.to_string(), "malformed JWT header");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("expected value at line 1")
        );

        let err = key_rejected("key exponent must not be zero");
        assert_eq!(err.to_string(), "key rejected: key exponent must not be zero");
    }

    #[test]
    fn key_errors_convert_into_token_errors() {
        let err = JwtVerifyError::from(JwkVerifyError::IncompatibleAlgorithm(jwa::Algorithm::PS256));
        assert!(matches!(
            err,
            JwtVerifyError::Key(JwkVerifyError::IncompatibleAlgorithm(jwa::Algorithm::PS256))
        ));
        assert_eq!(unknown_algorithm("HS256").name(), "HS256");
    }
}
