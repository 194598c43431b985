//! Development data: branches, staff accounts and games.
//!
//! Seeded rows are recognisable by their branch code prefix and account
//! email domain, which is what [`clear_all`] relies on.

pub mod branches;
pub mod games;
pub mod models;
pub mod users;

use mashar_auth::Role;
use mashar_core::hash_password;
use sqlx::PgPool;
use std::time::Instant;

pub use models::{SEED_BRANCH_PREFIX, SEED_EMAIL_DOMAIN, SEED_PASSWORD, SeedConfig};

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🌱 Seeding database...\n");

    let password_hash = hash_password(SEED_PASSWORD)
        .map_err(|e| e.error.to_string())?;

    let branch_codes = branches::seed_branches(db, config.branches).await?;
    let users = users::seed_users(db, &branch_codes, config.users_per_branch, &password_hash).await?;
    let games = games::seed_games(db, &branch_codes, config.games_per_branch).await?;

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    println!("   Branches: {}", branch_codes.len());
    println!("   Users: {users} (password: {SEED_PASSWORD})");
    println!("   Games: {games}");

    Ok(())
}

/// Removes everything the seeder created. Superadmins are never deleted.
pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    println!("🗑️  Clearing seeded data...");
    let branch_pattern = format!("{SEED_BRANCH_PREFIX}%");
    let email_pattern = format!("%@{SEED_EMAIL_DOMAIN}");

    let mut tx = db.begin().await?;

    let statuses = sqlx::query("DELETE FROM game_statuses WHERE branch_code LIKE $1")
        .bind(&branch_pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let games = sqlx::query("DELETE FROM games WHERE branch LIKE $1")
        .bind(&branch_pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let users = sqlx::query("DELETE FROM users WHERE username LIKE $1 AND role <> $2")
        .bind(&email_pattern)
        .bind(Role::SuperAdmin.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let branches = sqlx::query(
        "DELETE FROM branches b WHERE b.code LIKE $1
         AND NOT EXISTS (SELECT 1 FROM users u WHERE u.branch = b.code)",
    )
    .bind(&branch_pattern)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    println!("   ✓ Deleted {statuses} game statuses, {games} games, {users} users, {branches} branches");
    Ok(())
}
