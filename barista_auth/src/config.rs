use std::time::Duration;

use barista_jose::{
    jwa,
    jwt::{self, Audience, Issuer},
};
use thiserror::Error;

use crate::CacheOptions;

/// The authorization configuration was unusable
#[derive(Debug, Error)]
pub enum InvalidAuthConfig {
    /// No signing algorithms were allowed
    #[error("at least one signing algorithm must be allowed")]
    NoAlgorithms,

    /// An algorithm name was not recognized
    #[error(transparent)]
    UnknownAlgorithm(#[from] barista_jose::error::UnknownAlgorithm),
}

/// Everything needed to authorize requests against one identity provider
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Tokens must carry exactly this `iss`
    pub issuer: Issuer,
    /// Tokens must list this in `aud`
    pub audience: Audience,
    /// Header algorithms that may be used to verify a token
    pub algorithms: Vec<jwa::Algorithm>,
    /// Grace period applied to `exp`
    pub leeway: Duration,
    /// Where the provider publishes its key document
    pub jwks_url: String,
    /// Key cache tuning
    pub cache: CacheOptions,
}

impl AuthConfig {
    /// Configuration for a provider hosted at `domain`
    ///
    /// The issuer defaults to `https://<domain>/`, the key document to
    /// `https://<domain>/.well-known/jwks.json`, and the only allowed
    /// algorithm to `RS256`.
    pub fn for_domain(domain: &str, audience: impl Into<String>) -> Self {
        let domain = domain.trim_end_matches('/');

        Self {
            issuer: Issuer::from(format!("https://{domain}/")),
            audience: Audience::from(audience.into()),
            algorithms: vec![jwa::Algorithm::RS256],
            leeway: Duration::ZERO,
            jwks_url: format!("https://{domain}/.well-known/jwks.json"),
            cache: CacheOptions::default(),
        }
    }

    /// Replaces the allowed algorithms with those named
    ///
    /// # Errors
    ///
    /// Returns an error if a name is not a supported algorithm.
    pub fn with_algorithm_names<I, S>(self, names: I) -> Result<Self, InvalidAuthConfig>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let algorithms = names
            .into_iter()
            .map(|n| n.as_ref().parse::<jwa::Algorithm>())
            .collect::<Result<_, _>>()?;

        Ok(Self { algorithms, ..self })
    }

    /// Checks that the configuration can authorize anything at all
    ///
    /// # Errors
    ///
    /// Returns an error if no algorithms are allowed.
    pub fn validate(&self) -> Result<(), InvalidAuthConfig> {
        if self.algorithms.is_empty() {
            return Err(InvalidAuthConfig::NoAlgorithms);
        }

        Ok(())
    }

    /// The claims validator described by this configuration
    pub fn validator(&self) -> jwt::CoreValidator {
        jwt::CoreValidator::default()
            .extend_approved_algorithms(self.algorithms.iter().copied())
            .add_allowed_audience(self.audience.clone())
            .require_issuer(self.issuer.clone())
            .with_leeway(self.leeway)
    }
}
