mod common;

use axum::http::StatusCode;
use common::{create_test_branch, send, setup_test_app, user_with_token};
use mashar_auth::Role;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_superadmin_adds_branch(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::SuperAdmin, "hq").await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/mng/branch",
        Some(&token),
        Some(json!({ "code": "ksv", "name": "Kfar Saba" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], "ksv");
    assert_eq!(body["name"], "Kfar Saba");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_duplicate_branch_code(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    create_test_branch(&mut tx, "ksv", "Kfar Saba").await;
    tx.commit().await.unwrap();
    let (_, token) = user_with_token(&pool, Role::SuperAdmin, "hq").await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/mng/branch",
        Some(&token),
        Some(json!({ "code": "ksv", "name": "Another" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_cannot_manage_branches(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;

    let (status, _) = send(setup_test_app(pool.clone()), "GET", "/api/mng/branch", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/mng/branch",
        Some(&token),
        Some(json!({ "code": "tlv", "name": "Tel Aviv" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_branch_management_requires_token(pool: PgPool) {
    let (status, _) = send(setup_test_app(pool), "GET", "/api/mng/branch", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_branches_flags_usage(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    create_test_branch(&mut tx, "ksv", "Kfar Saba").await;
    create_test_branch(&mut tx, "tlv", "Tel Aviv").await;
    tx.commit().await.unwrap();
    let (_, token) = user_with_token(&pool, Role::SuperAdmin, "ksv").await;

    let (status, body) = send(setup_test_app(pool.clone()), "GET", "/api/mng/branch", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    let branches = body.as_array().unwrap();
    let used = |code: &str| {
        branches
            .iter()
            .find(|b| b["code"] == code)
            .map(|b| b["used"].as_bool().unwrap())
    };
    assert_eq!(used("ksv"), Some(true));
    assert_eq!(used("tlv"), Some(false));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_branch_in_use_is_refused(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    create_test_branch(&mut tx, "ksv", "Kfar Saba").await;
    tx.commit().await.unwrap();
    let (_, token) = user_with_token(&pool, Role::SuperAdmin, "ksv").await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "DELETE",
        "/api/mng/branch/ksv",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_unused_branch(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    create_test_branch(&mut tx, "tlv", "Tel Aviv").await;
    tx.commit().await.unwrap();
    let (_, token) = user_with_token(&pool, Role::SuperAdmin, "hq").await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "DELETE",
        "/api/mng/branch/tlv",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "DELETE",
        "/api/mng/branch/tlv",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
