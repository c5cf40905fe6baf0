//! API-side authorization guard.
//!
//! Checked in each handler before any work is done.

use inventree_auth::{AuthzError, Permission, Principal, Role, authorize_all};

use crate::context::PrincipalContext;

/// Check that the request principal holds every permission in `required`.
pub fn require(principal: &PrincipalContext, required: &[Permission]) -> Result<(), AuthzError> {
    let principal = Principal {
        principal_id: principal.principal_id(),
        roles: principal.roles().to_vec(),
        permissions: principal.permissions().to_vec(),
    };
    authorize_all(&principal, required)
}

/// Role→permission mapping.
///
/// `admin` grants everything; any other role grants the permission of the
/// same name (so a token with role `part.view` may view parts).
pub fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.iter().any(Role::is_admin) {
        return vec![Permission::WILDCARD];
    }

    roles
        .iter()
        .map(|r| Permission::new(r.as_str().to_string()))
        .collect()
}
