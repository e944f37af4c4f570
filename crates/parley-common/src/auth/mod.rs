//! Token verification
//!
//! The auth collaborator issues tokens elsewhere; this module only verifies
//! them against the shared secret and extracts the authenticated user id.

mod jwt;

pub use jwt::{Claims, JwtVerifier};
