mod common;

use axum::http::StatusCode;
use common::{
    create_test_user, generate_unique_username, get_auth_token, send, setup_test_app,
};
use mashar_auth::Role;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_login_success(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let user = create_test_user(&mut tx, &username, Role::Teacher, "ksv").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": user.password })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["username"], username);
    assert_eq!(body["user"]["role"], "teacher");
    assert_eq!(body["user"]["branch"], "ksv");
    assert!(body["user"].get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_is_case_insensitive_on_username(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let user = create_test_user(&mut tx, &username, Role::Admin, "ksv").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username.to_uppercase(), "password": user.password })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    create_test_user(&mut tx, &username, Role::Teacher, "ksv").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": "wrongpassword" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_unknown_user(pool: PgPool) {
    let app = setup_test_app(pool);
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "nobody@test.com", "password": "whatever" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_missing_fields(pool: PgPool) {
    let app = setup_test_app(pool);
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "", "password": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_returns_claims(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let user = create_test_user(&mut tx, &username, Role::Admin, "tlv").await;
    tx.commit().await.unwrap();

    let token = get_auth_token(setup_test_app(pool.clone()), &username, &user.password).await;

    let (status, body) = send(setup_test_app(pool), "GET", "/api/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sub"], username);
    assert_eq!(body["role"], "admin");
    assert_eq!(body["branch"], "tlv");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_without_token(pool: PgPool) {
    let (status, _) = send(setup_test_app(pool), "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_with_invalid_token(pool: PgPool) {
    let (status, _) = send(
        setup_test_app(pool),
        "GET",
        "/api/auth/me",
        Some("not-a-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_after_user_deleted(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let username = generate_unique_username();
    let user = create_test_user(&mut tx, &username, Role::Teacher, "ksv").await;
    tx.commit().await.unwrap();

    let token = get_auth_token(setup_test_app(pool.clone()), &username, &user.password).await;

    sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(&username)
        .execute(&pool)
        .await
        .unwrap();

    let (status, _) = send(setup_test_app(pool), "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
