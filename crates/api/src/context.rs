use relaykey_auth::{PrincipalId, Role};

/// Authenticated administrator context for a request.
///
/// Inserted by the auth middleware; present on every `/admin` route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminContext {
    principal_id: PrincipalId,
    name: String,
    roles: Vec<Role>,
}

impl AdminContext {
    pub fn new(principal_id: PrincipalId, name: String, roles: Vec<Role>) -> Self {
        Self {
            principal_id,
            name,
            roles,
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    /// Display label recorded as the `owner` of admin-triggered audit entries.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}
