mod common;

use axum::http::StatusCode;
use common::{send, setup_test_app, user_with_token};
use mashar_auth::Role;
use serde_json::{Value, json};
use sqlx::PgPool;

async fn add_group(pool: &PgPool, token: &str, name: &str) -> Value {
    let (status, body) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/lsn/groups/ksv/add",
        Some(token),
        Some(json!({ "name": name, "grade": "5" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

fn questions() -> Value {
    json!([
        { "qid": "q1", "q": "Student name", "type": "text", "validation": { "required": true, "minlength": 2 } },
        { "qid": "q2", "q": "Notes", "type": "text" }
    ])
}

/// Saves a new form with two questions and returns its uid.
async fn create_form(pool: &PgPool, token: &str, group: &str, active: bool) -> String {
    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/lsn/form/ksv",
        Some(token),
        Some(json!({
            "uid": "-1",
            "name": "Robotics signup",
            "group": group,
            "active": active,
            "title": "Robotics",
            "qa": questions()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["uid"].as_str().unwrap().to_string()
}

fn registration(form_id: &str, when: &str, email: &str, name: &str) -> Value {
    json!({
        "formId": form_id,
        "lessonDateTime": when,
        "grade": "5",
        "teacher": { "name": "Dana", "email": email },
        "data": [
            { "qid": "q1", "answer": name },
            { "qid": "q2", "answer": "" }
        ]
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_group_lifecycle(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;
    let created = add_group(&pool, &token, "Robotics").await;
    let gid = created["gid"].as_str().unwrap().to_string();
    assert_ne!(gid, "-1");
    add_group(&pool, &token, "Chess").await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/lsn/groups/ksv",
        Some(&token),
        Some(json!({ "gid": gid, "name": "Drones", "active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Drones");

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "GET",
        "/api/lsn/groups/ksv/page/0",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["data"][0]["name"], "Drones");
    assert_eq!(body["data"][0]["active"], false);

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "DELETE",
        &format!("/api/lsn/groups/ksv/{gid}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "DELETE",
        &format!("/api/lsn/groups/ksv/{gid}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_save_unknown_group_not_found(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/lsn/groups/ksv",
        Some(&token),
        Some(json!({ "gid": "missing", "name": "Ghost" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_cannot_edit_other_branch_groups(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "tlv").await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/lsn/groups/ksv/add",
        Some(&token),
        Some(json!({ "name": "Robotics" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_new_form_template(pool: PgPool) {
    let (status, body) = send(setup_test_app(pool), "GET", "/api/lsn/form/ksv/-1", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uid"], "-1");
    assert_eq!(body["active"], false);
    assert_eq!(body["qa"], json!([]));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_inactive_forms_hidden_from_public(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;
    create_form(&pool, &token, "", true).await;
    create_form(&pool, &token, "", false).await;

    let (status, body) = send(setup_test_app(pool.clone()), "GET", "/api/lsn/form/ksv", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(setup_test_app(pool.clone()), "GET", "/api/lsn/form/ksv", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_form_view_names_group(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;
    let group = add_group(&pool, &token, "Robotics").await;
    let uid = create_form(&pool, &token, group["gid"].as_str().unwrap(), true).await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "GET",
        &format!("/api/lsn/form/ksv/{uid}"),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["groupName"], "Robotics");
    assert_eq!(body["qa"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_save_form_rejects_duplicate_qids(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/lsn/form/ksv",
        Some(&token),
        Some(json!({
            "uid": "-1",
            "name": "Broken",
            "qa": [
                { "qid": "q1", "q": "A", "type": "text" },
                { "qid": "q1", "q": "B", "type": "text" }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_clone_form_starts_inactive(pool: PgPool) {
    let (_, token) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_form(&pool, &token, "", true).await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "POST",
        &format!("/api/lsn/form/ksv/{uid}/clone"),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(body["uid"], uid.as_str());
    assert_eq!(body["name"], "Robotics signup - copy");
    assert_eq!(body["active"], false);
    assert_eq!(body["qa"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_and_list_registrations(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let (teacher, teacher_token) = user_with_token(&pool, Role::Teacher, "ksv").await;
    let group = add_group(&pool, &admin, "Robotics").await;
    let gid = group["gid"].as_str().unwrap().to_string();
    let uid = create_form(&pool, &admin, &gid, true).await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/lsn/reg/ksv",
        None,
        Some(registration(&uid, "2030-03-02T14:00:00Z", &teacher.username, "  Noa  ")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["msg"], "Registration received");

    send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/lsn/reg/ksv",
        None,
        Some(registration(&uid, "2030-03-03T14:00:00Z", "other@test.com", "Omer")),
    )
    .await;

    let range = json!({ "from": "2030-03-01T00:00:00Z", "to": "2030-03-31T00:00:00Z" });

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/lsn/reglist/ksv",
        Some(&admin),
        Some(range.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let all = body.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["groupName"], "Robotics");
    assert_eq!(all[0]["data"], json!([{ "qid": "q1", "answer": "Noa", "question": "Student name" }]));

    // Teachers only see their own lessons
    let (status, body) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/lsn/reglist/ksv",
        Some(&teacher_token),
        Some(range),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["teacher"]["email"], teacher.username);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_validates_answers(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_form(&pool, &admin, "", true).await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/lsn/reg/ksv",
        None,
        Some(registration(&uid, "2030-03-02T14:00:00Z", "t@test.com", "N")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.to_string().contains("is too short, minimum length is 2"));

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/lsn/reg/ksv",
        None,
        Some(registration(&uid, "2030-03-02T14:00:00Z", "t@test.com", " ")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.to_string().contains("Please fill in all fields"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_to_closed_or_missing_form(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let uid = create_form(&pool, &admin, "", false).await;

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/lsn/reg/ksv",
        None,
        Some(registration(&uid, "2030-03-02T14:00:00Z", "t@test.com", "Noa")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Forms are looked up within the branch in the path
    let (status, _) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/lsn/reg/tlv",
        None,
        Some(registration(&uid, "2030-03-02T14:00:00Z", "t@test.com", "Noa")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn count_registrations(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM lesson_registrations")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_registrations(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let (_, super_token) = user_with_token(&pool, Role::SuperAdmin, "hq").await;
    let group = add_group(&pool, &admin, "Robotics").await;
    let gid = group["gid"].as_str().unwrap().to_string();
    let uid = create_form(&pool, &admin, &gid, true).await;

    for (when, email) in [
        ("2030-03-02T14:00:00Z", "a@test.com"),
        ("2030-03-02T14:00:00Z", "a@test.com"),
        ("2030-03-09T14:00:00Z", "a@test.com"),
        ("2020-03-09T14:00:00Z", "b@test.com"),
    ] {
        let (status, _) = send(
            setup_test_app(pool.clone()),
            "PUT",
            "/api/lsn/reg/ksv",
            None,
            Some(registration(&uid, when, email, "Noa")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Whole slot: both registrations of that lesson go
    let (status, _) = send(
        setup_test_app(pool.clone()),
        "DELETE",
        &format!("/api/lsn/reg/all/ksv/{gid}/2030-03-02T14:00:00Z/a@test.com"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count_registrations(&pool).await, 2);

    let id: uuid::Uuid = sqlx::query_scalar(
        "SELECT id FROM lesson_registrations WHERE lesson_date_time > NOW()",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let (status, _) = send(
        setup_test_app(pool.clone()),
        "DELETE",
        &format!("/api/lsn/reg/single/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count_registrations(&pool).await, 1);

    // Purges are for superadmins only
    let (status, _) = send(
        setup_test_app(pool.clone()),
        "DELETE",
        "/api/lsn/reg/superold/ksv",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "DELETE",
        "/api/lsn/reg/superold/ksv",
        Some(&super_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count_registrations(&pool).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_availability_for_teacher(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, Role::Admin, "ksv").await;
    let (teacher, token) = user_with_token(&pool, Role::Teacher, "ksv").await;
    add_group(&pool, &admin, "Robotics").await;

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "GET",
        &format!("/api/lsn/avail/ksv/{}", teacher.username),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["groups"].as_array().unwrap().len(), 1);
    assert_eq!(body["user"]["username"], teacher.username);
}
