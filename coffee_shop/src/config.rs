//! Layered service settings

use std::{net::SocketAddr, time::Duration};

use barista_auth::{AuthConfig, CacheOptions, InvalidAuthConfig};
use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

/// Base name of the optional settings file in the working directory
pub const CONFIG_FILE: &str = "coffee_shop";

/// Prefix for environment overrides, e.g. `COFFEE_SHOP__AUTH__DOMAIN`
pub const ENV_PREFIX: &str = "COFFEE_SHOP";

/// Service settings
///
/// Only `auth.domain` and `auth.audience` are required; everything else has
/// a default.
///
/// ```toml
/// bind = "0.0.0.0:8080"
/// cors_origins = ["http://localhost:8100"]
///
/// [auth]
/// domain = "barista.eu.auth0.com"
/// audience = "coffee-api"
/// ```
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Address the HTTP server listens on
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Browser origins allowed to call the API
    ///
    /// Empty, or containing `*`, allows any origin. From the environment
    /// this is a comma-separated list.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Identity provider settings
    pub auth: AuthSettings,
}

/// How bearer tokens are verified
#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    /// Identity provider domain, e.g. `barista.eu.auth0.com`
    pub domain: String,

    /// Audience tokens must be issued for
    pub audience: String,

    /// Overrides the `https://<domain>/` issuer
    #[serde(default)]
    pub issuer: Option<String>,

    /// Overrides the `https://<domain>/.well-known/jwks.json` key document
    #[serde(default)]
    pub jwks_url: Option<String>,

    /// Allowed signing algorithms, `RS256` unless set
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<String>,

    /// Clock skew tolerated on `exp`
    #[serde(default)]
    pub leeway_secs: u64,

    /// How long a fetched key set is trusted
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Minimum gap between refetches caused by an unknown key ID
    #[serde(default = "default_refetch_cooldown_secs")]
    pub refetch_cooldown_secs: u64,

    /// Timeout for a single key set request
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Refresh the key set in the background at this interval
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_algorithms() -> Vec<String> {
    vec!["RS256".to_owned()]
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_refetch_cooldown_secs() -> u64 {
    30
}

fn default_fetch_timeout_secs() -> u64 {
    5
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("auth.algorithms")
        .with_list_parse_key("cors_origins")
        .try_parsing(true)
}

impl Settings {
    /// Loads settings from `coffee_shop.toml` (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or a required key is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(environment()),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

impl AuthSettings {
    /// Builds the authorization configuration these settings describe
    ///
    /// # Errors
    ///
    /// Returns an error if no algorithm is allowed or one is unknown.
    pub fn auth_config(&self) -> Result<AuthConfig, InvalidAuthConfig> {
        let mut config = AuthConfig::for_domain(&self.domain, self.audience.clone())
            .with_algorithm_names(&self.algorithms)?;

        if let Some(issuer) = &self.issuer {
            config.issuer = issuer.clone().into();
        }

        if let Some(url) = &self.jwks_url {
            config.jwks_url = url.clone();
        }

        config.leeway = Duration::from_secs(self.leeway_secs);
        config.cache = CacheOptions {
            ttl: Duration::from_secs(self.cache_ttl_secs),
            refetch_cooldown: Duration::from_secs(self.refetch_cooldown_secs),
            timeout: Duration::from_secs(self.fetch_timeout_secs),
        };

        config.validate()?;
        Ok(config)
    }

    /// The background refresh interval, if one is configured
    #[must_use]
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs.map(Duration::from_secs)
    }
}
