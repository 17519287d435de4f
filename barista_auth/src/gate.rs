use std::{future::Future, sync::Arc};

use barista_jose::jwt::CoreHeaders;
use http::HeaderMap;

use crate::{
    claims::{Permission, PermissionRef},
    extract, permission, AuthConfig, AuthorizationError, Claims, InvalidAuthConfig, KeyCache,
    KeyFetchError, TokenVerifier,
};

/// Decides whether a request may proceed
///
/// Runs extraction, key lookup, verification, and the permission check in
/// order, stopping at the first failure. Cheap to clone.
#[derive(Clone, Debug)]
#[must_use]
pub struct Gate {
    keys: KeyCache,
    verifier: Arc<TokenVerifier>,
}

impl Gate {
    /// Constructs a gate from a key cache and a verifier
    pub fn new(keys: KeyCache, verifier: TokenVerifier) -> Self {
        Self {
            keys,
            verifier: Arc::new(verifier),
        }
    }

    /// Constructs a gate backed by the remote key document in `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &AuthConfig) -> Result<Self, GateSetupError> {
        config.validate()?;
        let keys = KeyCache::remote(config.jwks_url.clone(), config.cache)?;
        Ok(Self::new(keys, TokenVerifier::new(config.validator())))
    }

    /// The key cache behind this gate
    pub fn keys(&self) -> &KeyCache {
        &self.keys
    }

    /// Authorizes a request carrying `headers` for the `required` permission
    ///
    /// An empty `required` permission admits any caller holding a valid
    /// token with a permission list.
    ///
    /// # Errors
    ///
    /// Returns the first failure encountered.
    pub async fn authorize(
        &self,
        required: &PermissionRef,
        headers: &HeaderMap,
    ) -> Result<Claims, AuthorizationError> {
        match self.authorize_inner(required, headers).await {
            Ok(claims) => {
                tracing::debug!(
                    permission = %required,
                    sub = claims.subject().map(|s| s.as_str()),
                    "request authorized"
                );
                Ok(claims)
            }
            Err(err) => {
                tracing::debug!(
                    permission = %required,
                    error.kind = %err.kind(),
                    http.status_code = err.status().as_u16(),
                    "request rejected"
                );
                Err(err)
            }
        }
    }

    async fn authorize_inner(
        &self,
        required: &PermissionRef,
        headers: &HeaderMap,
    ) -> Result<Claims, AuthorizationError> {
        let token = extract(headers)?;
        let pending = self.verifier.inspect(&token)?;

        let mut keys = self.keys.key_set().await?;
        if !TokenVerifier::can_resolve(&pending, &keys) {
            if let Some(kid) = pending.kid() {
                if let Some(refreshed) = self.keys.refresh_for_unknown(kid).await? {
                    keys = refreshed;
                }
            }
        }

        let claims = self.verifier.verify_with(pending, &keys)?;
        permission::check(required, &claims)?;

        Ok(claims)
    }

    /// Wraps `op` so that it only runs for authorized requests
    pub fn requires_auth<F>(&self, required: impl Into<Permission>, op: F) -> Guarded<F> {
        Guarded {
            gate: self.clone(),
            required: required.into(),
            op,
        }
    }
}

/// An operation that runs only after its request has been authorized
#[derive(Clone, Debug)]
pub struct Guarded<F> {
    gate: Gate,
    required: Permission,
    op: F,
}

impl<F> Guarded<F> {
    /// The permission this operation requires
    #[must_use]
    pub fn required(&self) -> &PermissionRef {
        &self.required
    }

    /// Authorizes the request, then runs the operation with the verified
    /// claims and `args`
    ///
    /// # Errors
    ///
    /// Returns the authorization failure; the operation does not run.
    pub async fn call<A, Fut>(
        &self,
        headers: &HeaderMap,
        args: A,
    ) -> Result<Fut::Output, AuthorizationError>
    where
        F: Fn(Claims, A) -> Fut,
        Fut: Future,
    {
        let claims = self.gate.authorize(&self.required, headers).await?;
        Ok((self.op)(claims, args).await)
    }
}

/// A gate could not be constructed
#[derive(Debug, thiserror::Error)]
pub enum GateSetupError {
    /// The configuration was invalid
    #[error(transparent)]
    Config(#[from] InvalidAuthConfig),

    /// The key cache could not be constructed
    #[error(transparent)]
    KeyCache(#[from] KeyFetchError),
}
