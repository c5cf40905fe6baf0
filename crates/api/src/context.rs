use inventree_auth::{Permission, PrincipalId, Role};

/// Principal context for a request (authenticated identity, roles and the
/// permissions they grant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    roles: Vec<Role>,
    permissions: Vec<Permission>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        let permissions = crate::authz::permissions_from_roles(&roles);
        Self {
            principal_id,
            roles,
            permissions,
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }
}
