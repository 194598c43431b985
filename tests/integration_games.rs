mod common;

use axum::http::StatusCode;
use common::{send, setup_test_app, user_with_token};
use mashar_auth::Role;
use serde_json::{Value, json};
use sqlx::PgPool;

async fn create_game(pool: &PgPool, token: &str, name: &str) -> String {
    let (status, body) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/game",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["uid"].as_str().unwrap().to_string()
}

async fn activate(pool: &PgPool, uid: &str) {
    sqlx::query("UPDATE games SET active = TRUE WHERE uid = $1")
        .bind(uid)
        .execute(pool)
        .await
        .unwrap();
}

async fn vector(pool: &PgPool, uri: &str) -> (StatusCode, Value) {
    send(setup_test_app(pool.clone()), "GET", uri, None, None).await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_game_uses_default_riddles(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_game(&pool, &token, "Park hunt").await;

    // The edit form is public
    let (status, body) = send(
        setup_test_app(pool.clone()),
        "GET",
        &format!("/api/game/form/{uid}"),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["readableName"], "Park hunt");
    assert_eq!(body["branchCode"], "ksv");
    assert_eq!(body["active"], false);
    assert_eq!(body["red"]["riddles"].as_array().unwrap().len(), 5);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_cannot_create_game(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Teacher, "ksv").await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/game",
        Some(&token),
        Some(json!({ "name": "Nope" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_games_marks_running_game(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let (_, teacher) = user_with_token(&pool, Role::Teacher, "ksv").await;
    let running = create_game(&pool, &admin, "Alpha").await;
    create_game(&pool, &admin, "Beta").await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "POST",
        &format!("/api/game/start/{running}/ksv"),
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(setup_test_app(pool.clone()), "GET", "/api/game/list/1", Some(&teacher), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
    let games = body["data"].as_array().unwrap();
    assert_eq!(games[0]["readableName"], "Alpha");
    assert_eq!(games[0]["activeGame"], true);
    assert_eq!(games[1]["activeGame"], false);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_start_game_in_other_branch_forbidden(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let (_, other) = user_with_token(&pool, Role::Teacher, "tlv").await;
    let uid = create_game(&pool, &admin, "Alpha").await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "POST",
        &format!("/api/game/start/{uid}/ksv"),
        Some(&other),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_vector_run_records_attempts(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_game(&pool, &admin, "Alpha").await;
    activate(&pool, &uid).await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "POST",
        &format!("/api/game/start/{uid}/ksv"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["started"], true);
    assert_eq!(body["red"]["numTries"], 0);

    // Default riddles accept size 100 at 30 degrees
    let (status, body) = vector(&pool, &format!("/api/vector/{uid}/red/1/90/30")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["errMsg"], "Wrong vector, try again");

    let (status, body) = vector(&pool, &format!("/api/vector/{uid}/red/1?vectorSize=100&vectorAngle=390")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["infoMsg"], "Well done, the vector is correct");
    assert_eq!(body["result"]["errMsg"], "");

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "GET",
        &format!("/api/game/status/{uid}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["started"], true);
    assert_eq!(body["status"]["red"]["stage"], 1);
    assert_eq!(body["status"]["red"]["success"], true);
    assert_eq!(body["status"]["red"]["numTries"], 2);
    assert_eq!(body["status"]["blue"]["numTries"], 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_restart_clears_attempts(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_game(&pool, &admin, "Alpha").await;
    activate(&pool, &uid).await;
    let start = format!("/api/game/start/{uid}/ksv");

    send(setup_test_app(pool.clone()), "POST", &start, Some(&admin), None).await;
    vector(&pool, &format!("/api/vector/{uid}/green/2/100/30")).await;

    let (_, body) = send(setup_test_app(pool.clone()), "POST", &start, Some(&admin), None).await;
    assert_eq!(body["green"]["numTries"], 0);
    assert_eq!(body["green"]["stage"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_stop_game_reports_not_started(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_game(&pool, &admin, "Alpha").await;

    send(
        setup_test_app(pool.clone()),
        "POST",
        &format!("/api/game/start/{uid}/ksv"),
        Some(&admin),
        None,
    )
    .await;
    let (status, body) = send(
        setup_test_app(pool.clone()),
        "POST",
        &format!("/api/game/stop/{uid}/ksv"),
        Some(&admin),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "started": false }));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_vector_on_inactive_game(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_game(&pool, &admin, "Alpha").await;

    let (status, body) = vector(&pool, &format!("/api/vector/{uid}/red/1/100/30")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["result"]["errMsg"], "no such game");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_vector_with_missing_values(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_game(&pool, &admin, "Alpha").await;
    activate(&pool, &uid).await;

    let (status, body) = vector(&pool, &format!("/api/vector/{uid}/red/1?vectorSize=100")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["errMsg"], "Please fill in both vector size and angle");

    let (status, body) = vector(&pool, &format!("/api/vector/{uid}/purple/1/100/30")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["errMsg"], "Please fill in both vector size and angle");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_vector_without_status_still_answers(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_game(&pool, &admin, "Alpha").await;
    activate(&pool, &uid).await;

    let (status, body) = vector(&pool, &format!("/api/vector/{uid}/blue/3/100/30")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["infoMsg"], "Well done, the vector is correct");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_save_game_bumps_version(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_game(&pool, &admin, "Alpha").await;

    let (_, form) = send(
        setup_test_app(pool.clone()),
        "GET",
        &format!("/api/game/form/{uid}"),
        None,
        None,
    )
    .await;

    let mut red = form["red"].clone();
    red["riddles"][0]["vecSize"] = json!(["50", 70]);
    red["riddles"][0]["vecAngle"] = json!(["0", "180"]);
    red["riddles"][0]["img"] = json!("/uploads/ksv/map.png");

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        &format!("/api/game/{uid}"),
        Some(&admin),
        Some(json!({
            "readableName": "Alpha v2",
            "active": true,
            "version": form["version"],
            "red": red,
            "blue": form["blue"],
            "green": form["green"]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["readableName"], "Alpha v2");
    assert_eq!(body["version"], "1.1");
    assert_eq!(body["active"], true);

    let (_, body) = vector(&pool, &format!("/api/vector/{uid}/red/1/70/180")).await;
    assert_eq!(body["result"]["infoMsg"], "Well done, the vector is correct");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_save_game_rejects_swapped_teams(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_game(&pool, &admin, "Alpha").await;
    let (_, form) = send(
        setup_test_app(pool.clone()),
        "GET",
        &format!("/api/game/form/{uid}"),
        None,
        None,
    )
    .await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "PUT",
        &format!("/api/game/{uid}"),
        Some(&admin),
        Some(json!({
            "readableName": "Alpha",
            "active": false,
            "version": "1.0",
            "red": form["blue"],
            "blue": form["red"],
            "green": form["green"]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_save_game_rejects_team_without_stages(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_game(&pool, &admin, "Alpha").await;
    let (_, form) = send(
        setup_test_app(pool.clone()),
        "GET",
        &format!("/api/game/form/{uid}"),
        None,
        None,
    )
    .await;

    let mut red = form["red"].clone();
    red["riddles"] = json!([]);
    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        &format!("/api/game/{uid}"),
        Some(&admin),
        Some(json!({
            "readableName": "Alpha",
            "active": true,
            "version": "1.0",
            "red": red,
            "blue": form["blue"],
            "green": form["green"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("riddles"));

    // Stored game is untouched
    let (_, after) = send(
        setup_test_app(pool.clone()),
        "GET",
        &format!("/api/game/form/{uid}"),
        None,
        None,
    )
    .await;
    assert_eq!(after["red"]["riddles"].as_array().unwrap().len(), 5);
    assert_eq!(after["version"], "1.0");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_clone_and_delete_game(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_game(&pool, &admin, "Alpha").await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/game/clone",
        Some(&admin),
        Some(json!({ "origGame": uid, "newGame": "Alpha copy" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let copy = body["uid"].as_str().unwrap().to_string();
    assert_ne!(copy, uid);

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "DELETE",
        &format!("/api/game/{uid}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "GET",
        &format!("/api/game/form/{uid}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "GET",
        &format!("/api/game/form/{copy}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["readableName"], "Alpha copy");
}
