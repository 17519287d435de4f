use std::collections::{btree_set, BTreeSet};

use aliri_braid::braid;
use barista_jose::{
    clock::UnixTime,
    jwt::{self, Audiences, Issuer, IssuerRef, Subject, SubjectRef},
};
use serde::{Deserialize, Serialize};

/// A permission string granted by the identity provider, e.g. `post:drinks`
///
/// The empty permission is never granted; requiring it means "any
/// authenticated caller".
#[braid(serde, ref_doc = "A borrowed reference to a [`Permission`]")]
pub struct Permission;

impl PermissionRef {
    /// The empty permission
    #[must_use]
    pub fn any() -> &'static PermissionRef {
        PermissionRef::from_str("")
    }

    /// Whether this is the empty permission
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.as_str().is_empty()
    }
}

/// The set of permissions carried by a token
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(BTreeSet<Permission>);

impl Permissions {
    /// Whether the set contains `permission`
    #[inline]
    #[must_use]
    pub fn contains(&self, permission: &PermissionRef) -> bool {
        self.0.contains(permission)
    }

    /// The number of distinct permissions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no permissions are granted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the permissions in lexical order
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.0.iter())
    }
}

impl FromIterator<Permission> for Permissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Permissions {
    type Item = &'a PermissionRef;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over a set of permissions
#[derive(Debug)]
pub struct Iter<'a>(btree_set::Iter<'a, Permission>);

impl<'a> Iterator for Iter<'a> {
    type Item = &'a PermissionRef;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|p| p.as_ref())
    }
}

/// The verified claims of an access token
///
/// Only produced by successful verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<Issuer>,
    #[serde(default, skip_serializing_if = "Audiences::is_empty")]
    aud: Audiences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<Subject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<UnixTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<UnixTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    azp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    permissions: Option<Permissions>,
}

impl Claims {
    /// The subject the token was issued to
    #[must_use]
    pub fn subject(&self) -> Option<&SubjectRef> {
        self.sub.as_deref()
    }

    /// The permissions granted, if the token carries a permission list at all
    #[must_use]
    pub fn permissions(&self) -> Option<&Permissions> {
        self.permissions.as_ref()
    }

    /// When the token was issued
    #[must_use]
    pub fn issued_at(&self) -> Option<UnixTime> {
        self.iat
    }

    /// The client the token was issued for
    #[must_use]
    pub fn authorized_party(&self) -> Option<&str> {
        self.azp.as_deref()
    }
}

impl jwt::CoreClaims for Claims {
    fn exp(&self) -> Option<UnixTime> {
        self.exp
    }

    fn aud(&self) -> &Audiences {
        &self.aud
    }

    fn iss(&self) -> Option<&IssuerRef> {
        self.iss.as_deref()
    }

    fn sub(&self) -> Option<&SubjectRef> {
        self.sub.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use barista_jose::jwt::CoreClaims;
    use color_eyre::Result;

    use super::*;

    #[test]
    fn provider_token_payload_deserializes() -> Result<()> {
        let claims: Claims = serde_json::from_str(
            r#"{
                "iss": "https://barista.test.auth0.com/",
                "sub": "auth0|barista",
                "aud": ["coffee-api", "https://barista.test.auth0.com/userinfo"],
                "iat": 1700000000,
                "exp": 1700086400,
                "azp": "spa-client",
                "scope": "openid profile",
                "permissions": ["post:drinks", "get:drinks-detail"]
            }"#,
        )?;

        assert_eq!(claims.subject().map(SubjectRef::as_str), Some("auth0|barista"));
        assert_eq!(claims.aud().iter().count(), 2);
        assert_eq!(claims.exp(), Some(UnixTime(1_700_086_400)));
        assert_eq!(claims.authorized_party(), Some("spa-client"));

        let permissions = claims.permissions().expect("permissions present");
        assert!(permissions.contains(PermissionRef::from_str("post:drinks")));
        assert!(!permissions.contains(PermissionRef::from_str("delete:drinks")));
        Ok(())
    }

    #[test]
    fn absent_and_empty_permissions_differ() -> Result<()> {
        let absent: Claims = serde_json::from_str(r#"{ "sub": "x" }"#)?;
        let empty: Claims = serde_json::from_str(r#"{ "sub": "x", "permissions": [] }"#)?;

        assert!(absent.permissions().is_none());
        assert!(empty.permissions().is_some_and(Permissions::is_empty));
        Ok(())
    }

    #[test]
    fn permissions_iterate_in_order() {
        let perms: Permissions = ["patch:drinks", "delete:drinks", "patch:drinks"]
            .into_iter()
            .map(Permission::from_static)
            .collect();

        let listed: Vec<_> = perms.iter().map(PermissionRef::as_str).collect();
        assert_eq!(listed, ["delete:drinks", "patch:drinks"]);
    }
}
