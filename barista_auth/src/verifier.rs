use std::{fmt, sync::Arc};

use barista_jose::{
    clock::{Clock, System},
    error::{ClaimsRejected, JwtVerifyError},
    jwt::{self, CoreHeaders, HasAlgorithm},
    Jwks, JwtRef,
};

use crate::{AuthorizationError, Claims};

/// A token whose header has been read and checked, awaiting a key
pub type Pending<'a> = jwt::Decomposed<'a>;

/// Verifies bearer tokens against a key set
///
/// Verification is a pure function of the token, the key set, and the
/// injected clock.
#[derive(Clone)]
pub struct TokenVerifier {
    validator: jwt::CoreValidator,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Constructs a verifier that reads the system clock
    pub fn new(validator: jwt::CoreValidator) -> Self {
        Self {
            validator,
            clock: Arc::new(System),
        }
    }

    /// Replaces the clock used for time-based claims
    #[must_use]
    pub fn with_clock<C>(self, clock: C) -> Self
    where
        C: Clock + Send + Sync + 'static,
    {
        Self {
            clock: Arc::new(clock),
            ..self
        }
    }

    /// Verifies `token` against `keys` and returns its claims
    ///
    /// # Errors
    ///
    /// Returns the first failure encountered, in the order: token structure,
    /// key ID presence, algorithm, key lookup, signature, claims.
    pub fn verify(&self, token: &JwtRef, keys: &Jwks) -> Result<Claims, AuthorizationError> {
        let pending = self.inspect(token)?;
        self.verify_with(pending, keys)
    }

    /// Reads the token header without trusting it
    ///
    /// The returned token is guaranteed to name a key ID and an allow-listed
    /// algorithm.
    ///
    /// # Errors
    ///
    /// * `invalid_header` (400) if the token cannot be decomposed
    /// * `invalid_header` (401) if the header has no key ID, whatever
    ///   algorithm it names
    /// * `invalid_header` (400) if the algorithm is unknown or not approved
    pub fn inspect<'a>(&self, token: &'a JwtRef) -> Result<Pending<'a>, AuthorizationError> {
        let raw: jwt::Decomposed<jwt::RawHeaders> = token.decompose().map_err(|error| {
            tracing::debug!(%error, "token could not be decomposed");
            AuthorizationError::unparseable_token()
        })?;

        if raw.untrusted_header().kid().is_none() {
            tracing::debug!(alg = raw.untrusted_header().alg_name(), "token header has no key ID");
            return Err(AuthorizationError::missing_key_id());
        }

        let decomposed = raw.resolve_algorithm().map_err(|error| {
            tracing::debug!(%error, "token algorithm not supported");
            AuthorizationError::unparseable_token()
        })?;

        if self.validator.check_algorithm(decomposed.alg()).is_err() {
            tracing::debug!(alg = %decomposed.alg(), "token algorithm not approved");
            return Err(AuthorizationError::unparseable_token());
        }

        Ok(decomposed)
    }

    /// Whether `keys` can resolve the key named by `pending`
    #[must_use]
    pub fn can_resolve(pending: &Pending, keys: &Jwks) -> bool {
        pending
            .kid()
            .and_then(|kid| keys.get_key_by_id(kid, pending.alg()))
            .is_some()
    }

    /// Completes verification of an inspected token
    ///
    /// # Errors
    ///
    /// See [`verify`][Self::verify].
    pub fn verify_with(&self, pending: Pending, keys: &Jwks) -> Result<Claims, AuthorizationError> {
        let alg = pending.alg();
        let key = pending
            .kid()
            .and_then(|kid| keys.get_key_by_id(kid, alg))
            .ok_or_else(|| {
                if let Some(kid) = pending.kid() {
                    tracing::debug!(%kid, %alg, "unable to find matching key");
                }
                AuthorizationError::key_not_found()
            })?;

        let validated: jwt::Validated<Claims> = pending
            .verify(key, &self.validator, self.clock.as_ref())
            .map_err(classify)?;

        let (_, claims) = validated.extract();
        Ok(claims)
    }
}

fn classify(error: JwtVerifyError) -> AuthorizationError {
    tracing::debug!(%error, "token rejected");

    match error {
        JwtVerifyError::ClaimsRejected(ClaimsRejected::TokenExpired) => {
            AuthorizationError::expired()
        }
        JwtVerifyError::ClaimsRejected(ClaimsRejected::InvalidAlgorithm) => {
            AuthorizationError::unparseable_token()
        }
        JwtVerifyError::ClaimsRejected(_) => AuthorizationError::incorrect_claims(),
        _ => AuthorizationError::unparseable_token(),
    }
}
