mod common;

use axum::http::StatusCode;
use common::{send, setup_test_app, user_with_token};
use mashar_auth::Role;
use serde_json::{Value, json};
use sqlx::PgPool;

async fn add_playlist(pool: &PgPool, token: &str, code: &str) -> (StatusCode, Value) {
    send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/playlist",
        Some(token),
        Some(json!({ "code": code, "name": format!("Playlist {code}"), "topic": "Math", "grade": "7" })),
    )
    .await
}

async fn list(pool: &PgPool, token: &str) -> Vec<(String, i64)> {
    let (status, body) = send(
        setup_test_app(pool.clone()),
        "GET",
        "/api/playlist/list/0",
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["code"].as_str().unwrap().to_string(), p["order"].as_i64().unwrap()))
        .collect()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_playlists_appends_order(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;

    for code in ["PLa", "PLb", "PLc"] {
        let (status, _) = add_playlist(&pool, &token, code).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    assert_eq!(
        list(&pool, &token).await,
        vec![("PLa".into(), 1), ("PLb".into(), 2), ("PLc".into(), 3)]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_playlist_code(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;
    add_playlist(&pool, &token, "PLa").await;

    let (status, body) = add_playlist(&pool, &token, "PLa").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.to_string().contains("Playlist already exists"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_cannot_manage_playlists(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Teacher, "ksv").await;

    let (status, _) = add_playlist(&pool, &token, "PLa").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reorder_playlists(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;
    for code in ["PLa", "PLb", "PLc"] {
        add_playlist(&pool, &token, code).await;
    }

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/playlist/order",
        Some(&token),
        Some(json!({ "playlists": [
            { "code": "PLc", "order": 1 },
            { "code": "PLa", "order": 2 },
            { "code": "PLb", "order": 3 }
        ] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["code"], "PLc");
    assert_eq!(
        list(&pool, &token).await,
        vec![("PLc".into(), 1), ("PLa".into(), 2), ("PLb".into(), 3)]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reorder_with_unknown_code_changes_nothing(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;
    for code in ["PLa", "PLb"] {
        add_playlist(&pool, &token, code).await;
    }

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/playlist/order",
        Some(&token),
        Some(json!({ "playlists": [
            { "code": "PLb", "order": 1 },
            { "code": "ghost", "order": 2 }
        ] })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        list(&pool, &token).await,
        vec![("PLa".into(), 1), ("PLb".into(), 2)]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_renumbers(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;
    for code in ["PLa", "PLb", "PLc"] {
        add_playlist(&pool, &token, code).await;
    }

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "DELETE",
        "/api/playlist/PLa",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        list(&pool, &token).await,
        vec![("PLb".into(), 1), ("PLc".into(), 2)]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_edit_playlist(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;
    add_playlist(&pool, &token, "PLa").await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/playlist/PLa",
        Some(&token),
        Some(json!({ "code": "PLz", "name": "Geometry", "topic": "Math" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "PLz");
    assert_eq!(body["name"], "Geometry");
    assert_eq!(body["order"], 1);

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/playlist/missing",
        Some(&token),
        Some(json!({ "code": "missing", "name": "Nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
