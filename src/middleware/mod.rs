//! Request extractors and middleware.
//!
//! - [`auth`]: bearer-token extraction and per-role extractors
//! - [`role`]: router-level role gates
//! - [`scope`]: effective-branch resolution for the current user

pub mod auth;
pub mod role;
pub mod scope;
