mod common;

use axum::http::StatusCode;
use common::{send, setup_test_app, user_with_token};
use mashar_auth::Role;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_template_update_is_compare_and_swap(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Teacher, "ksv").await;

    let (status, created) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/template/ksv",
        Some(&token),
        Some(json!({ "name": "Grade 7", "grade": "7", "template": [{ "subject": "Math", "name": "Fractions" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["version"], 1);
    let uri = format!("/api/template/ksv/{}", created["id"].as_str().unwrap());

    let update = |version: i64, name: &str| {
        json!({ "name": name, "grade": "7", "version": version, "template": [] })
    };

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        &uri,
        Some(&token),
        Some(update(1, "Grade 7 A")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], 2);
    assert_eq!(body["name"], "Grade 7 A");

    // A second writer still holding version 1 loses
    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        &uri,
        Some(&token),
        Some(update(1, "Grade 7 B")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.to_string().contains("reload and try again"));

    let (_, body) = send(setup_test_app(pool.clone()), "GET", &uri, Some(&token), None).await;
    assert_eq!(body["name"], "Grade 7 A");
    assert_eq!(body["version"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_missing_template(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Teacher, "ksv").await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "PUT",
        &format!("/api/template/ksv/{}", uuid::Uuid::new_v4()),
        Some(&token),
        Some(json!({ "name": "Ghost", "version": 1, "template": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_planning_requires_token(pool: PgPool) {
    let (status, _) = send(setup_test_app(pool), "GET", "/api/school/ksv", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_schools_are_branch_scoped(pool: PgPool) {
    let (_, ksv) = user_with_token(&pool, Role::Teacher, "ksv").await;
    let (_, tlv) = user_with_token(&pool, Role::Teacher, "tlv").await;

    let (status, school) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/school/ksv",
        Some(&ksv),
        Some(json!({ "name": "Ort Hadar", "city": "Kfar Saba" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{school}");
    assert_eq!(school["branch"], "ksv");

    let (status, body) = send(setup_test_app(pool.clone()), "GET", "/api/school/ksv", Some(&ksv), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(setup_test_app(pool.clone()), "GET", "/api/school/ksv", Some(&tlv), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(setup_test_app(pool.clone()), "GET", "/api/school/tlv", Some(&tlv), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_private_exam_visible_to_author_and_admins(pool: PgPool) {
    let (_, author) = user_with_token(&pool, Role::Teacher, "ksv").await;
    let (_, colleague) = user_with_token(&pool, Role::Teacher, "ksv").await;
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;

    let (status, exam) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/exam/ksv",
        Some(&author),
        Some(json!({ "name": "Algebra midterm", "subject": ["Math"], "year": "2026", "isPrivate": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{exam}");
    let uri = format!("/api/exam/ksv/{}", exam["id"].as_str().unwrap());

    let (status, _) = send(setup_test_app(pool.clone()), "GET", &uri, Some(&author), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(setup_test_app(pool.clone()), "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(setup_test_app(pool.clone()), "GET", &uri, Some(&colleague), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/exam/ksv/filter",
        Some(&colleague),
        Some(json!({ "subject": "Math" })),
    )
    .await;
    assert!(body.as_array().unwrap().is_empty());

    let (_, body) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/exam/ksv/filter",
        Some(&author),
        Some(json!({ "subject": "Math" })),
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}
