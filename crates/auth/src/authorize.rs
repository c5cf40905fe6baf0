use std::collections::HashSet;

use thiserror::Error;

use crate::{Permission, PrincipalId, Role};

/// A fully resolved principal for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Check a single permission.
///
/// Pure policy check: no IO, no panics.
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let perms: HashSet<&str> = principal.permissions.iter().map(|p| p.as_str()).collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Check that every permission in `required` is granted.
///
/// Fails on the first missing permission.
pub fn authorize_all(principal: &Principal, required: &[Permission]) -> Result<(), AuthzError> {
    required.iter().try_for_each(|perm| authorize(principal, perm))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(perms: &[&'static str]) -> Principal {
        Principal {
            principal_id: PrincipalId::new(),
            roles: Vec::new(),
            permissions: perms.iter().map(|p| Permission::from_static(p)).collect(),
        }
    }

    #[test]
    fn wildcard_grants_everything() {
        let p = principal(&["*"]);
        assert!(authorize(&p, &Permission::PART_VIEW).is_ok());
        assert!(authorize(&p, &Permission::new("stock.change")).is_ok());
    }

    #[test]
    fn exact_permission_required() {
        let p = principal(&["part.view"]);
        assert!(authorize(&p, &Permission::PART_VIEW).is_ok());
        assert_eq!(
            authorize(&p, &Permission::SALES_ORDER_VIEW),
            Err(AuthzError::Forbidden("sales_order.view".to_string()))
        );
    }

    #[test]
    fn all_permissions_must_be_granted() {
        let required = [Permission::SALES_ORDER_VIEW, Permission::PART_VIEW];
        assert!(authorize_all(&principal(&["part.view", "sales_order.view"]), &required).is_ok());
        assert_eq!(
            authorize_all(&principal(&["sales_order.view"]), &required),
            Err(AuthzError::Forbidden("part.view".to_string()))
        );
        assert!(authorize_all(&principal(&[]), &[]).is_ok());
    }
}
