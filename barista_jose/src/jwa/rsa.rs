//! RSA public keys

use std::convert::TryFrom;

use serde::Deserialize;

use super::Algorithm;
use crate::{b64, error, jws};

const MIN_MODULUS_BYTES: usize = 2048 / 8;
const MAX_MODULUS_BYTES: usize = 8192 / 8;

/// RSA public key components
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(try_from = "PublicKeyDto")]
pub struct PublicKey {
    modulus: Vec<u8>,
    exponent: Vec<u8>,
}

impl PublicKey {
    /// The public modulus, big-endian without leading zeros
    pub fn modulus(&self) -> &[u8] {
        &self.modulus
    }

    /// The public exponent, big-endian without leading zeros
    pub fn exponent(&self) -> &[u8] {
        &self.exponent
    }

    /// Constructs a public key from the big-endian modulus and exponent
    ///
    /// # Errors
    ///
    /// The modulus is outside of the 2048 to 8192 bit range, or the
    /// exponent is empty.
    pub fn from_components(
        modulus: impl Into<Vec<u8>>,
        exponent: impl Into<Vec<u8>>,
    ) -> Result<Self, error::KeyRejected> {
        let modulus = strip_leading_zeros(modulus.into());
        let exponent = strip_leading_zeros(exponent.into());

        if !(MIN_MODULUS_BYTES..=MAX_MODULUS_BYTES).contains(&modulus.len()) {
            return Err(error::key_rejected(
                "key modulus must be between 2048 and 8192 bits",
            ));
        }

        if exponent.is_empty() {
            return Err(error::key_rejected("key exponent must not be zero"));
        }

        Ok(Self { modulus, exponent })
    }
}

fn strip_leading_zeros(mut raw: Vec<u8>) -> Vec<u8> {
    let zeros = raw.iter().take_while(|&&b| b == 0).count();
    raw.drain(..zeros);
    raw
}

impl jws::Verifier for PublicKey {
    type Algorithm = Algorithm;
    type Error = error::JwkVerifyError;

    fn can_verify(&self, _alg: Self::Algorithm) -> bool {
        true
    }

    fn verify(
        &self,
        alg: Self::Algorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error> {
        let pk = ring::signature::RsaPublicKeyComponents {
            n: self.modulus.as_slice(),
            e: self.exponent.as_slice(),
        };

        pk.verify(alg.verification_params(), data, signature)
            .map_err(|_| error::JwkVerifyError::SignatureMismatch)
    }
}

impl TryFrom<PublicKeyDto> for PublicKey {
    type Error = error::KeyRejected;

    fn try_from(dto: PublicKeyDto) -> Result<Self, Self::Error> {
        let modulus = b64::decode_url(&dto.modulus).map_err(error::key_rejected)?;
        let exponent = b64::decode_url(&dto.exponent).map_err(error::key_rejected)?;
        Self::from_components(modulus, exponent)
    }
}

/// RSA public key components, as base64url text
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
struct PublicKeyDto {
    #[serde(rename = "n")]
    modulus: String,

    #[serde(rename = "e")]
    exponent: String,
}
