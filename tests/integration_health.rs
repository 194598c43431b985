mod common;

use axum::http::StatusCode;
use common::{send, setup_test_app};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_health_reports_connected_database(pool: PgPool) {
    let (status, body) = send(setup_test_app(pool), "GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_openapi_document_is_served(pool: PgPool) {
    let (status, body) = send(setup_test_app(pool), "GET", "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Mashar API");
}
