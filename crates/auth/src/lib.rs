//! `relaykey-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it decides
//! who a token belongs to and whether that identity may administer the
//! service, nothing more. Code-holder access is authorized by the codes
//! themselves, not by anything here.

pub mod authorize;
pub mod claims;
pub mod principal;
pub mod roles;
pub mod validator;

pub use authorize::{ensure_admin, AuthzError};
pub use claims::{validate_claims, AdminClaims, TokenValidationError};
pub use principal::PrincipalId;
pub use roles::Role;
pub use validator::{Hs256JwtValidator, JwtError, JwtValidator};
