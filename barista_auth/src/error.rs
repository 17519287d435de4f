//! Authorization failures

use std::{borrow::Cow, fmt};

use http::StatusCode;
use thiserror::Error;

/// The category of an authorization failure
///
/// The string form of each kind is the stable code reported to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No `Authorization` header was sent
    AuthorizationHeaderMissing,
    /// The header, the token, or the key material behind it is unusable
    InvalidHeader,
    /// The token is past its expiry
    TokenExpired,
    /// The token's claims are wrong or incomplete
    InvalidClaims,
    /// The caller is authenticated but lacks the required permission
    Unauthorized,
}

impl ErrorKind {
    /// The wire code for this kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthorizationHeaderMissing => "authorization_header_missing",
            Self::InvalidHeader => "invalid_header",
            Self::TokenExpired => "token_expired",
            Self::InvalidClaims => "invalid_claims",
            Self::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request could not be authorized
///
/// Carries everything needed to render a response: the failure kind, the
/// HTTP status, and a human-readable description.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}: {description}")]
pub struct AuthorizationError {
    kind: ErrorKind,
    status: StatusCode,
    description: Cow<'static, str>,
}

impl AuthorizationError {
    /// Constructs an error from its parts
    pub fn new(
        kind: ErrorKind,
        status: StatusCode,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            kind,
            status,
            description: description.into(),
        }
    }

    /// The failure kind
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The HTTP status to respond with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The human-readable description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn header_missing() -> Self {
        Self::new(
            ErrorKind::AuthorizationHeaderMissing,
            StatusCode::UNAUTHORIZED,
            "Authorization header is expected.",
        )
    }

    pub(crate) fn header_not_visible_ascii() -> Self {
        Self::new(
            ErrorKind::InvalidHeader,
            StatusCode::UNAUTHORIZED,
            "Authorization header must contain only visible ASCII characters.",
        )
    }

    pub(crate) fn not_bearer() -> Self {
        Self::new(
            ErrorKind::InvalidHeader,
            StatusCode::UNAUTHORIZED,
            "Authorization header must start with \"Bearer\".",
        )
    }

    pub(crate) fn token_not_found() -> Self {
        Self::new(
            ErrorKind::InvalidHeader,
            StatusCode::UNAUTHORIZED,
            "Token not found.",
        )
    }

    pub(crate) fn not_bearer_token() -> Self {
        Self::new(
            ErrorKind::InvalidHeader,
            StatusCode::UNAUTHORIZED,
            "Authorization header must be bearer token.",
        )
    }

    pub(crate) fn unparseable_token() -> Self {
        Self::new(
            ErrorKind::InvalidHeader,
            StatusCode::BAD_REQUEST,
            "Unable to parse authentication token.",
        )
    }

    pub(crate) fn missing_key_id() -> Self {
        Self::new(
            ErrorKind::InvalidHeader,
            StatusCode::UNAUTHORIZED,
            "Authorization malformed.",
        )
    }

    pub(crate) fn key_not_found() -> Self {
        Self::new(
            ErrorKind::InvalidHeader,
            StatusCode::BAD_REQUEST,
            "Unable to find the appropriate key.",
        )
    }

    pub(crate) fn keys_unavailable() -> Self {
        Self::new(
            ErrorKind::InvalidHeader,
            StatusCode::UNAUTHORIZED,
            "Unable to fetch signing keys.",
        )
    }

    pub(crate) fn expired() -> Self {
        Self::new(
            ErrorKind::TokenExpired,
            StatusCode::UNAUTHORIZED,
            "Token expired.",
        )
    }

    pub(crate) fn incorrect_claims() -> Self {
        Self::new(
            ErrorKind::InvalidClaims,
            StatusCode::UNAUTHORIZED,
            "Incorrect claims. Please, check the audience and issuer.",
        )
    }

    pub(crate) fn permissions_missing() -> Self {
        Self::new(
            ErrorKind::InvalidClaims,
            StatusCode::BAD_REQUEST,
            "Permissions not included in token.",
        )
    }

    pub(crate) fn permission_not_found() -> Self {
        Self::new(
            ErrorKind::Unauthorized,
            StatusCode::FORBIDDEN,
            "Permission not found.",
        )
    }
}

impl From<KeyFetchError> for AuthorizationError {
    fn from(_: KeyFetchError) -> Self {
        Self::keys_unavailable()
    }
}

/// The provider's signing keys could not be obtained
#[derive(Debug, Error)]
pub enum KeyFetchError {
    /// The request failed to complete, including timeouts
    #[error("key document request failed")]
    Transport(#[source] reqwest::Error),

    /// The key document endpoint answered with a non-success status
    #[error("key document endpoint returned {status}")]
    UnexpectedStatus {
        /// The status returned
        status: StatusCode,
    },

    /// The key document could not be decoded as a key set
    #[error("key document is malformed")]
    MalformedDocument(#[source] reqwest::Error),
}
