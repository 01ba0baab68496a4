//! Administrative authorization guard.
//!
//! This enforces the admin precondition at the request boundary while
//! keeping the core components auth-agnostic: by the time a call reaches
//! CodeStore or CommandGate, the question of *who may ask* is settled.

use thiserror::Error;

use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: administrative role required")]
    Forbidden,
}

/// Check that the authenticated principal carries the `admin` role.
///
/// - No IO
/// - No panics
/// - Pure policy check
pub fn ensure_admin(roles: &[Role]) -> Result<(), AuthzError> {
    if roles.iter().any(Role::is_admin) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}
