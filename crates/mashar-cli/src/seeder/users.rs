use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use mashar_auth::Role;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{SEED_EMAIL_DOMAIN, UserSeed};

// 5 params per user
const BATCH_SIZE: usize = 1000;

pub fn generate_users(branches: &[String], users_per_branch: usize) -> Vec<UserSeed> {
    branches
        .par_iter()
        .enumerate()
        .flat_map(|(branch_idx, branch)| {
            (0..users_per_branch)
                .map(|user_idx| {
                    let first_name: String = FirstName().fake();
                    let last_name: String = LastName().fake();
                    let role = if user_idx == 0 { Role::Admin } else { Role::Teacher };

                    UserSeed {
                        username: format!(
                            "{}.{}+{}@{SEED_EMAIL_DOMAIN}",
                            first_name.to_lowercase(),
                            last_name.to_lowercase(),
                            branch_idx * 1000 + user_idx
                        ),
                        name: format!("{first_name} {last_name}"),
                        branch: branch.clone(),
                        role,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn seed_users(
    db: &PgPool,
    branches: &[String],
    users_per_branch: usize,
    password_hash: &str,
) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "👥 Seeding {} users ({users_per_branch} per branch)...",
        branches.len() * users_per_branch
    );

    let users = generate_users(branches, users_per_branch);

    let mut tx = db.begin().await?;
    let mut inserted = 0;
    for chunk in users.chunks(BATCH_SIZE) {
        inserted += insert_users_chunk(&mut tx, chunk, password_hash).await?;
    }
    tx.commit().await?;

    println!("   ✓ Inserted {inserted} users in {:?}", start_time.elapsed());
    Ok(inserted)
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
    password_hash: &str,
) -> Result<u64, Box<dyn std::error::Error>> {
    if users.is_empty() {
        return Ok(0);
    }

    let mut query =
        String::from("INSERT INTO users (username, password, name, email, branch, role) VALUES ");
    for i in 0..users.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 5;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${})",
            p + 1,
            p + 2,
            p + 3,
            p + 1,
            p + 4,
            p + 5
        ));
    }
    query.push_str(" ON CONFLICT (username) DO NOTHING");

    let mut q = sqlx::query(&query);
    for user in users {
        q = q
            .bind(&user.username)
            .bind(password_hash)
            .bind(&user.name)
            .bind(&user.branch)
            .bind(user.role.as_str());
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}
