//! Permission enforcement

use crate::{claims::PermissionRef, AuthorizationError, Claims};

/// Checks that `claims` grant the `required` permission
///
/// A token without any permission list is rejected outright, even when
/// `required` is empty. Requiring the empty permission otherwise admits any
/// verified caller.
///
/// # Errors
///
/// * `invalid_claims` (400) if the token carries no permission list
/// * `unauthorized` (403) if the permission is not granted
pub fn check(required: &PermissionRef, claims: &Claims) -> Result<(), AuthorizationError> {
    let permissions = claims
        .permissions()
        .ok_or_else(AuthorizationError::permissions_missing)?;

    if required.is_any() || permissions.contains(required) {
        Ok(())
    } else {
        Err(AuthorizationError::permission_not_found())
    }
}
