//! `inventree-auth` — token validation and permission checks.
//!
//! Decoupled from HTTP and storage: the API layer extracts the bearer token,
//! this crate decides who the caller is and what they may do.

pub mod authorize;
pub mod claims;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, Principal, authorize, authorize_all};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use permissions::Permission;
pub use principal::PrincipalId;
pub use roles::Role;
