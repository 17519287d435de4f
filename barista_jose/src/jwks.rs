use serde::Deserialize;

use crate::{jwa, jwk, Jwk};

/// A JSON Web Key Set (JWKS)
///
/// Keys that cannot be used by this crate (other key types, encryption
/// algorithms, malformed parameters) are dropped while deserializing so
/// that one exotic entry in a provider's document does not invalidate the
/// whole set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Jwks {
    #[serde(deserialize_with = "deserialize_keys")]
    keys: Vec<Jwk>,
}

impl Jwks {
    /// The number of usable keys in this set
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether this set holds no usable keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether any key in the set carries the given key ID
    #[must_use]
    pub fn contains_key_id(&self, kid: &jwk::KeyIdRef) -> bool {
        self.keys.iter().any(|k| k.key_id() == Some(kid))
    }

    /// Gets the key with the given key ID that can verify `alg`
    ///
    /// Resolution must be unambiguous: if no compatible key or more than one
    /// compatible key carries the key ID, no key is returned.
    pub fn get_key_by_id(&self, kid: &jwk::KeyIdRef, alg: jwa::Algorithm) -> Option<&Jwk> {
        let mut candidates = self
            .keys
            .iter()
            .filter(|k| k.key_id() == Some(kid) && k.is_compatible(alg));

        let first = candidates.next()?;
        if candidates.next().is_some() {
            tracing::warn!(%kid, %alg, "multiple keys match key ID; refusing ambiguous key");
            return None;
        }

        Some(first)
    }
}

fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<Jwk>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct MaybeJwksVisitor;

    impl<'de> serde::de::Visitor<'de> for MaybeJwksVisitor {
        type Value = Vec<Jwk>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a list of JWK objects")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::SeqAccess<'de>,
        {
            let mut values = Vec::with_capacity(seq.size_hint().unwrap_or_default());
            let mut index = 0_usize;

            while let Some(value) = seq.next_element()? {
                match value {
                    MaybeJwk::Jwk(jwk) => values.push(jwk),
                    MaybeJwk::Unknown(key) => {
                        tracing::warn!(
                            jwks.idx = index,
                            jwk.kid = ?key.kid,
                            jwk.kty = ?key.kty,
                            jwk.alg = ?key.alg,
                            "ignoring unusable JWK"
                        );
                    }
                }
                index += 1;
            }

            Ok(values)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeJwk {
        Jwk(Jwk),
        Unknown(JwkLike),
    }

    #[derive(Deserialize)]
    struct JwkLike {
        #[serde(default)]
        kid: Option<jwk::KeyId>,
        #[serde(default)]
        kty: Option<String>,
        #[serde(default)]
        alg: Option<String>,
    }

    deserializer.deserialize_seq(MaybeJwksVisitor)
}
