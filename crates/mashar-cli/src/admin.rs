//! Superadmin bootstrap. The API never grants the superadmin role to a
//! first account, so the first one is created here.

use mashar_auth::Role;
use mashar_core::hash_password;
use sqlx::PgPool;

pub struct NewSuperadmin<'a> {
    pub username: &'a str,
    pub name: &'a str,
    pub branch: &'a str,
    pub password: &'a str,
}

/// Inserts the account and makes sure its branch exists.
pub async fn create_superadmin(
    db: &PgPool,
    admin: NewSuperadmin<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let username = admin.username.trim().to_lowercase();
    let hashed_password = hash_password(admin.password)
        .map_err(|e| e.error.to_string())?;

    let mut tx = db.begin().await?;

    sqlx::query("INSERT INTO branches (code, name) VALUES ($1, $1) ON CONFLICT (code) DO NOTHING")
        .bind(admin.branch)
        .execute(&mut *tx)
        .await?;

    let inserted = sqlx::query(
        "INSERT INTO users (username, password, name, email, branch, role)
         VALUES ($1, $2, $3, $1, $4, $5)
         ON CONFLICT (username) DO NOTHING",
    )
    .bind(&username)
    .bind(&hashed_password)
    .bind(admin.name)
    .bind(admin.branch)
    .bind(Role::SuperAdmin.as_str())
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(format!("User {username} already exists").into());
    }

    tx.commit().await?;
    Ok(())
}
