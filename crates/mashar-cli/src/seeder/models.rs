//! Seed rows and seeding configuration.

use mashar_auth::Role;
use mashar_models::TeamData;

/// Code prefix marking branches created by the seeder.
pub const SEED_BRANCH_PREFIX: &str = "seed-";

/// Domain of every seeded account.
pub const SEED_EMAIL_DOMAIN: &str = "example.com";

/// Password of every seeded account.
pub const SEED_PASSWORD: &str = "password123";

pub struct BranchSeed {
    pub code: String,
    pub name: String,
}

pub struct UserSeed {
    pub username: String,
    pub name: String,
    pub branch: String,
    pub role: Role,
}

pub struct GameSeed {
    pub uid: String,
    pub name: String,
    pub branch: String,
    pub teams: [TeamData; 3],
}

#[derive(Debug, Clone, Copy)]
pub struct SeedConfig {
    pub branches: usize,
    /// The first user of every branch is an admin, the rest are teachers.
    pub users_per_branch: usize,
    pub games_per_branch: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            branches: 3,
            users_per_branch: 8,
            games_per_branch: 4,
        }
    }
}
