//! # Mashar CLI
//!
//! Administrative commands and development data seeding.
//!
//! ```ignore
//! use mashar_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig { branches: 3, users_per_branch: 8, games_per_branch: 4 };
//! seed_all(&pool, config).await?;
//! ```

pub mod admin;
pub mod seeder;
