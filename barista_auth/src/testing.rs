//! Fixtures for tests: a fixed provider key set and a token mint
//!
//! The private keys in this module exist only so tests can produce signed
//! tokens. They are compiled in only for tests or with the `test-util`
//! feature.

use barista_jose::{clock::UnixTime, Jwks, Jwt};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ring::{
    rand::SystemRandom,
    signature::{self, RsaEncoding, RsaKeyPair},
};
use serde_json::{json, Value};

/// Issuer used by fixture tokens
pub const ISSUER: &str = "https://barista.test.auth0.com/";
/// Audience used by fixture tokens
pub const AUDIENCE: &str = "coffee-api";
/// Subject used by fixture tokens
pub const SUBJECT: &str = "auth0|barista";

/// Key ID of the key published in both fixture documents
pub const PRIMARY_KID: &str = "primary-2026";
/// Key ID of the key that only appears after rotation
pub const ROTATED_KID: &str = "rotated-2026";

/// The provider key document before rotation
///
/// Also contains an EC key, which is skipped when parsed.
pub const JWKS_DOCUMENT: &str = include_str!("../data/jwks.json");
/// The provider key document after rotation
pub const ROTATED_JWKS_DOCUMENT: &str = include_str!("../data/jwks-rotated.json");

const PRIMARY_PKCS8: &[u8] = include_bytes!("../data/primary.pk8");
const ROGUE_PKCS8: &[u8] = include_bytes!("../data/rogue.pk8");

/// The parsed key set before rotation
pub fn primary_jwks() -> Jwks {
    serde_json::from_str(JWKS_DOCUMENT).expect("fixture key document is valid")
}

/// The parsed key set after rotation
pub fn rotated_jwks() -> Jwks {
    serde_json::from_str(ROTATED_JWKS_DOCUMENT).expect("fixture key document is valid")
}

/// Claims accepted by a verifier configured with [`ISSUER`] and
/// [`AUDIENCE`], valid for an hour from `now`
pub fn claims_at(now: UnixTime, permissions: &[&str]) -> Value {
    json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": SUBJECT,
        "iat": now.0,
        "exp": now.0 + 3600,
        "azp": "barista-test-client",
        "permissions": permissions,
    })
}

/// [`claims_at`] the current system time
pub fn claims(permissions: &[&str]) -> Value {
    claims_at(UnixTime::from(std::time::SystemTime::now()), permissions)
}

/// Signs tokens with one of the fixture private keys
#[derive(Debug)]
pub struct TokenMint {
    key: RsaKeyPair,
    kid: Option<String>,
    alg: String,
}

impl TokenMint {
    /// Signs with the key published as [`PRIMARY_KID`]
    pub fn primary() -> Self {
        Self::from_pkcs8(PRIMARY_PKCS8, PRIMARY_KID)
    }

    /// Signs with the key published as [`ROTATED_KID`] after rotation
    pub fn rotated() -> Self {
        Self::from_pkcs8(ROGUE_PKCS8, ROTATED_KID)
    }

    /// Signs with a key that is absent from the initial document
    ///
    /// Combine with [`with_key_id`][Self::with_key_id] to forge a token for a
    /// published key ID.
    pub fn rogue() -> Self {
        Self::from_pkcs8(ROGUE_PKCS8, "rogue")
    }

    fn from_pkcs8(der: &[u8], kid: &str) -> Self {
        Self {
            key: RsaKeyPair::from_pkcs8(der).expect("fixture key is valid PKCS#8"),
            kid: Some(kid.to_owned()),
            alg: "RS256".to_owned(),
        }
    }

    /// Names a different key ID in the header
    pub fn with_key_id(self, kid: &str) -> Self {
        Self {
            kid: Some(kid.to_owned()),
            ..self
        }
    }

    /// Omits the key ID from the header
    pub fn without_key_id(self) -> Self {
        Self { kid: None, ..self }
    }

    /// Names `alg` in the header
    ///
    /// `RS*` and `PS*` names are honored when signing; any other name is
    /// written to the header while the signature is still RS256.
    pub fn with_header_algorithm(self, alg: &str) -> Self {
        Self {
            alg: alg.to_owned(),
            ..self
        }
    }

    /// Signs `claims` as the token payload
    pub fn sign(&self, claims: &Value) -> Jwt {
        let payload = serde_json::to_vec(claims).expect("claims serialize");
        self.sign_raw_payload(&payload)
    }

    /// Signs arbitrary bytes as the token payload
    pub fn sign_raw_payload(&self, payload: &[u8]) -> Jwt {
        let mut header = json!({ "alg": self.alg, "typ": "JWT" });
        if let Some(kid) = &self.kid {
            header["kid"] = json!(kid);
        }
        let header = serde_json::to_vec(&header).expect("header serializes");

        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );

        let mut sig = vec![0; self.key.public().modulus_len()];
        self.key
            .sign(
                self.encoding(),
                &SystemRandom::new(),
                message.as_bytes(),
                &mut sig,
            )
            .expect("fixture signing succeeds");

        Jwt::from(format!("{message}.{}", URL_SAFE_NO_PAD.encode(sig)))
    }

    fn encoding(&self) -> &'static dyn RsaEncoding {
        match self.alg.as_str() {
            "RS384" => &signature::RSA_PKCS1_SHA384,
            "RS512" => &signature::RSA_PKCS1_SHA512,
            "PS256" => &signature::RSA_PSS_SHA256,
            "PS384" => &signature::RSA_PSS_SHA384,
            "PS512" => &signature::RSA_PSS_SHA512,
            _ => &signature::RSA_PKCS1_SHA256,
        }
    }
}
