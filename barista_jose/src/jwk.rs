//! Implementations of the JSON Web Keys (JWK) standard
//!
//! The specifications for JSON Web Keys can be found in [RFC7517][].
//!
//! [RFC7517]: https://tools.ietf.org/html/rfc7517

use std::convert::TryFrom;

use aliri_braid::braid;
use serde::Deserialize;

use crate::{error, jwa, jws::Verifier};

/// An identifier for a JWK
#[braid(serde, ref_doc = "A borrowed reference to JWK identifier ([`KeyId`])")]
pub struct KeyId;

/// An identified JSON Web Key holding RSA public key material
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "JwkDto")]
#[must_use]
pub struct Jwk {
    key_id: Option<KeyId>,
    usage: Option<jwa::Usage>,
    algorithm: Option<jwa::Algorithm>,
    key: Key,
}

impl Jwk {
    /// The key ID
    #[must_use]
    pub fn key_id(&self) -> Option<&KeyIdRef> {
        self.key_id.as_deref()
    }

    /// The intended usage of the key
    #[must_use]
    pub fn usage(&self) -> Option<jwa::Usage> {
        self.usage
    }

    /// The algorithm to be used with this JWK
    #[must_use]
    pub fn algorithm(&self) -> Option<jwa::Algorithm> {
        self.algorithm
    }

    /// Whether the key may be used to verify signatures made with `alg`
    #[must_use]
    pub fn is_compatible(&self, alg: jwa::Algorithm) -> bool {
        let usage_ok = self.usage.map_or(true, |u| u == alg.to_usage());
        let alg_ok = self.algorithm.map_or(true, |a| a == alg);
        usage_ok && alg_ok && self.key.can_verify(alg)
    }
}

impl Verifier for Jwk {
    type Algorithm = jwa::Algorithm;
    type Error = error::JwkVerifyError;

    fn can_verify(&self, alg: Self::Algorithm) -> bool {
        self.is_compatible(alg)
    }

    fn verify(
        &self,
        alg: Self::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error> {
        if let Some(u) = self.usage {
            if u != jwa::Usage::Signing {
                return Err(error::JwkVerifyError::UsageMismatch);
            }
        }

        match self.algorithm {
            Some(key_alg) if key_alg != alg => {
                return Err(error::JwkVerifyError::IncompatibleAlgorithm(alg));
            }
            _ => {}
        }

        self.key.verify(alg, data, signature)?;

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct JwkDto {
    #[serde(rename = "kid", default)]
    key_id: Option<KeyId>,

    #[serde(rename = "use", default)]
    usage: Option<jwa::Usage>,

    #[serde(rename = "alg", default)]
    algorithm: Option<jwa::Algorithm>,

    #[serde(flatten)]
    key: Key,
}

impl TryFrom<JwkDto> for Jwk {
    type Error = error::JwkVerifyError;

    fn try_from(dto: JwkDto) -> Result<Self, Self::Error> {
        if let Some(alg) = dto.algorithm {
            if !dto.key.can_verify(alg) {
                return Err(error::JwkVerifyError::IncompatibleAlgorithm(alg));
            }
        }

        Ok(Self {
            key_id: dto.key_id,
            usage: dto.usage,
            algorithm: dto.algorithm,
            key: dto.key,
        })
    }
}

/// Key material, discriminated by the `kty` parameter
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(tag = "kty")]
enum Key {
    #[serde(rename = "RSA")]
    Rsa(jwa::rsa::PublicKey),
}

impl Verifier for Key {
    type Algorithm = jwa::Algorithm;
    type Error = error::JwkVerifyError;

    fn can_verify(&self, alg: Self::Algorithm) -> bool {
        match self {
            Self::Rsa(p) => p.can_verify(alg),
        }
    }

    fn verify(
        &self,
        alg: Self::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error> {
        match self {
            Self::Rsa(p) => p.verify(alg, data, signature)?,
        }

        Ok(())
    }
}
