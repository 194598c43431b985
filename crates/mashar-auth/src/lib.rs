//! # Mashar Auth
//!
//! - [`claims`]: the [`Role`] ladder and the JWT [`Claims`] carried by every
//!   authenticated request
//! - [`jwt`]: token creation and verification

pub mod claims;
pub mod jwt;

pub use claims::{Claims, Role, UnknownRole};
pub use jwt::{TokenSubject, create_access_token, verify_token};
