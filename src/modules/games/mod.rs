//! Treasure-hunt games: definitions, live runs and vector checks.

pub mod builder;
pub mod controller;
pub mod router;
pub mod service;
pub mod status;
pub mod store;
pub mod vector;

pub use router::{init_games_router, init_vector_router};
