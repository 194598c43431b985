use fake::Fake;
use fake::faker::address::en::CityName;
use rayon::prelude::*;
use sqlx::PgPool;
use std::time::Instant;

use super::models::{BranchSeed, SEED_BRANCH_PREFIX};

pub fn generate_branches(count: usize) -> Vec<BranchSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let city: String = CityName().fake();
            BranchSeed {
                code: format!("{SEED_BRANCH_PREFIX}{}", idx + 1),
                name: city,
            }
        })
        .collect()
}

/// Inserts branches, skipping codes that already exist.
pub async fn seed_branches(
    db: &PgPool,
    count: usize,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🏫 Seeding {count} branches...");

    let branches = generate_branches(count);
    let mut tx = db.begin().await?;
    for branch in &branches {
        sqlx::query("INSERT INTO branches (code, name) VALUES ($1, $2) ON CONFLICT (code) DO NOTHING")
            .bind(&branch.code)
            .bind(&branch.name)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    println!("   ✓ Inserted {} branches in {:?}", branches.len(), start_time.elapsed());
    Ok(branches.into_iter().map(|b| b.code).collect())
}
