//! Shared helpers for the feature modules.
//!
//! - [`dates`]: display formats used by the front-end
//! - [`messages`]: user-facing message strings

pub mod dates;
pub mod messages;
