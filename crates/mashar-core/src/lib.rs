//! # Mashar Core
//!
//! Foundational types shared by every Mashar crate:
//!
//! - [`errors`]: `AppError`, the HTTP-mapped error returned by services and handlers
//! - [`pagination`]: page-based pagination parameters and response metadata
//! - [`password`]: bcrypt hashing and verification
//! - [`serde`]: deserializers for loosely typed front-end input
//! - [`uid`]: short random identifiers used in student-facing URLs
//!
//! # Example
//!
//! ```ignore
//! use mashar_core::{AppError, PageRequest};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Game not found"));
//! let page = PageRequest::new(2, 20);
//! assert_eq!(page.offset(), 20);
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;
pub mod uid;

pub use errors::AppError;
pub use pagination::{PageRequest, PaginationMeta};
pub use password::{hash_password, verify_password};
pub use uid::generate_uid;
