use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mashar::router::init_router;
use mashar::state::AppState;
use mashar_auth::Role;
use mashar_config::RateLimitConfig;
use mashar_core::hash_password;
use mashar_db::ConnectionState;
use serde_json::{Value, json};
use sqlx::{PgPool, Postgres, Transaction};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "testpass123";

#[allow(dead_code)]
pub struct TestUser {
    pub username: String,
    pub password: String,
    pub branch: String,
    pub role: Role,
}

/// App with rate limiting off, so oneshot requests without a peer address work.
pub fn setup_test_app(pool: PgPool) -> axum::Router {
    setup_test_app_with_rate_limit(pool, RateLimitConfig::disabled())
}

pub fn setup_test_app_with_rate_limit(pool: PgPool, rate_limit: RateLimitConfig) -> axum::Router {
    dotenvy::dotenv().ok();
    let mut state = AppState::new(pool, ConnectionState::connected());
    state.rate_limit_config = rate_limit;
    init_router(state)
}

#[allow(dead_code)]
pub async fn create_test_branch(tx: &mut Transaction<'_, Postgres>, code: &str, name: &str) {
    sqlx::query("INSERT INTO branches (code, name) VALUES ($1, $2)")
        .bind(code)
        .bind(name)
        .execute(&mut **tx)
        .await
        .unwrap();
}

/// Inserts a user; the username doubles as the email address.
pub async fn create_test_user(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
    role: Role,
    branch: &str,
) -> TestUser {
    let hashed = hash_password(TEST_PASSWORD).unwrap();

    sqlx::query(
        "INSERT INTO users (username, password, name, email, branch, role)
         VALUES ($1, $2, $3, $1, $4, $5)",
    )
    .bind(username)
    .bind(hashed)
    .bind("Test User")
    .bind(branch)
    .bind(role.as_str())
    .execute(&mut **tx)
    .await
    .unwrap();

    TestUser {
        username: username.to_string(),
        password: TEST_PASSWORD.to_string(),
        branch: branch.to_string(),
        role,
    }
}

pub fn generate_unique_username() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

#[allow(dead_code)]
pub fn generate_unique_branch() -> String {
    format!("b{}", &Uuid::new_v4().simple().to_string()[..8])
}

/// Inserts a user of `role` in `branch` and logs them in.
#[allow(dead_code)]
pub async fn user_with_token(pool: &PgPool, role: Role, branch: &str) -> (TestUser, String) {
    let mut tx = pool.begin().await.unwrap();
    let user = create_test_user(&mut tx, &generate_unique_username(), role, branch).await;
    tx.commit().await.unwrap();

    let token = get_auth_token(setup_test_app(pool.clone()), &user.username, &user.password).await;
    (user, token)
}

pub async fn get_auth_token(app: axum::Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

/// Sends one request and returns the status with the JSON body (`Null` when empty).
pub async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
