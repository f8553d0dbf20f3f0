//! Web API permission tests.
//!
//! Integration tests for the role/permission authorizer on gated routes,
//! including mid-session permission grants.

use axum::http::StatusCode;
use axum_test::TestServer;
use campus::auth::Permission;
use campus::db::{NewUser, Role, UserRepository, WhitelistRepository};
use campus::web::handlers::AppState;
use campus::web::middleware::RateLimitState;
use campus::web::router::create_router;
use campus::Database;
use serde_json::{json, Value};
use std::sync::Arc;

/// Build a server over the given database, with its own cookie jar.
fn build_server(db: &Database) -> TestServer {
    let app_state = Arc::new(AppState::new(
        db.clone(),
        "test-secret-key-for-testing-only",
        3600,
        false,
    ));
    let rate_limit = Arc::new(RateLimitState::new(100, 1000));
    let router = create_router(app_state, rate_limit, &[]);

    let mut server = TestServer::new(router).expect("Failed to create test server");
    server.save_cookies();
    server
}

async fn setup_db() -> Database {
    Database::open_in_memory()
        .await
        .expect("Failed to create test database")
}

/// Seed a user directly in the credential store.
async fn seed_user(
    db: &Database,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
    permissions: Vec<Permission>,
    student_id: Option<&str>,
) -> campus::User {
    let hash = campus::hash_password(password).expect("Failed to hash password");
    let mut new_user = NewUser::new(name, email, hash)
        .with_role(role)
        .with_permissions(permissions);
    if let Some(sid) = student_id {
        new_user = new_user.with_student_id(sid);
    }

    UserRepository::new(db.pool())
        .create(&new_user)
        .await
        .expect("Failed to seed user")
}

async fn seed_admin(db: &Database, email: &str, password: &str) -> campus::User {
    let admin = seed_user(db, "Ada Admin", email, password, Role::Admin, vec![], None).await;
    WhitelistRepository::new(db.pool())
        .add(email)
        .await
        .expect("Failed to whitelist admin");
    admin
}

// ============================================================================
// Gated Route Tests
// ============================================================================

#[tokio::test]
async fn test_gated_route_requires_session() {
    let db = setup_db().await;
    let server = build_server(&db);

    let response = server
        .post("/api/records/attendance")
        .json(&json!({
            "studentId": "S-1001",
            "date": "2026-08-24",
            "status": "present"
        }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_gated_route_rejects_student_role() {
    let db = setup_db().await;
    let server = build_server(&db);
    seed_user(
        &db,
        "Sam Student",
        "sam@school.edu",
        "password123",
        Role::Student,
        vec![],
        Some("S-1001"),
    )
    .await;

    server
        .post("/api/auth/login")
        .json(&json!({ "studentId": "S-1001", "password": "password123" }))
        .await
        .assert_status_ok();

    // Students are outside the allowed role set regardless of permissions
    let response = server
        .post("/api/records/attendance")
        .json(&json!({
            "studentId": "S-1001",
            "date": "2026-08-24",
            "status": "present"
        }))
        .await;

    response.assert_status_forbidden();
}

#[tokio::test]
async fn test_permission_grant_applies_without_relogin() {
    let db = setup_db().await;

    // Teacher with no permissions, per the canonical scenario
    seed_user(
        &db,
        "Tess Teacher",
        "t@school.edu",
        "changeme123",
        Role::Teacher,
        vec![],
        None,
    )
    .await;
    seed_user(
        &db,
        "Sam Student",
        "sam@school.edu",
        "password123",
        Role::Student,
        vec![],
        Some("S-1001"),
    )
    .await;
    seed_admin(&db, "admin@school.com", "admin-pass-123").await;

    let teacher_server = build_server(&db);
    let admin_server = build_server(&db);

    let login = teacher_server
        .post("/api/auth/login")
        .json(&json!({ "email": "t@school.edu", "password": "changeme123" }))
        .await;
    login.assert_status_ok();
    let login_body: Value = login.json();
    assert_eq!(login_body["data"]["role"], "teacher");
    let teacher_id = login_body["data"]["id"].as_i64().unwrap();

    let attempt = json!({
        "studentId": "S-1001",
        "date": "2026-08-24",
        "status": "present"
    });

    // Without TAKE_ATTENDANCE the teacher is rejected
    teacher_server
        .post("/api/records/attendance")
        .json(&attempt)
        .await
        .assert_status_forbidden();

    // An admin grants the permission
    admin_server
        .post("/api/auth/admin-login")
        .json(&json!({ "email": "admin@school.com", "password": "admin-pass-123" }))
        .await
        .assert_status_ok();
    admin_server
        .put(&format!("/api/staff/{}/permissions", teacher_id))
        .json(&json!({ "permissions": ["TAKE_ATTENDANCE"] }))
        .await
        .assert_status_ok();

    // Same session, no re-login: the retry now succeeds
    let retry = teacher_server
        .post("/api/records/attendance")
        .json(&attempt)
        .await;
    retry.assert_status_ok();

    let body: Value = retry.json();
    assert_eq!(body["data"]["studentId"], "S-1001");
    assert_eq!(body["data"]["status"], "present");
}

#[tokio::test]
async fn test_results_route_gated_by_manage_results() {
    let db = setup_db().await;
    let server = build_server(&db);

    // Holds TAKE_ATTENDANCE but not MANAGE_RESULTS
    seed_user(
        &db,
        "Tess Teacher",
        "t@school.edu",
        "changeme123",
        Role::Teacher,
        vec![Permission::TakeAttendance],
        None,
    )
    .await;
    seed_user(
        &db,
        "Sam Student",
        "sam@school.edu",
        "password123",
        Role::Student,
        vec![],
        Some("S-1001"),
    )
    .await;

    server
        .post("/api/auth/login")
        .json(&json!({ "email": "t@school.edu", "password": "changeme123" }))
        .await
        .assert_status_ok();

    let result = json!({
        "studentId": "S-1001",
        "subject": "Mathematics",
        "term": "2026-T1",
        "score": 87.5
    });

    server
        .post("/api/records/results")
        .json(&result)
        .await
        .assert_status_forbidden();

    // But the attendance route accepts the permission they do hold
    server
        .post("/api/records/attendance")
        .json(&json!({
            "studentId": "S-1001",
            "date": "2026-08-24",
            "status": "late"
        }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_publish_result_success() {
    let db = setup_db().await;
    let server = build_server(&db);

    seed_user(
        &db,
        "Pat Principal",
        "p@school.edu",
        "changeme123",
        Role::Principal,
        vec![Permission::ManageResults],
        None,
    )
    .await;
    seed_user(
        &db,
        "Sam Student",
        "sam@school.edu",
        "password123",
        Role::Student,
        vec![],
        Some("S-1001"),
    )
    .await;

    server
        .post("/api/auth/login")
        .json(&json!({ "email": "p@school.edu", "password": "changeme123" }))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/records/results")
        .json(&json!({
            "studentId": "S-1001",
            "subject": "Mathematics",
            "term": "2026-T1",
            "score": 87.5
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["subject"], "Mathematics");
    assert_eq!(body["data"]["score"], 87.5);
}

#[tokio::test]
async fn test_attendance_unknown_student() {
    let db = setup_db().await;
    let server = build_server(&db);

    seed_user(
        &db,
        "Tess Teacher",
        "t@school.edu",
        "changeme123",
        Role::Teacher,
        vec![Permission::TakeAttendance],
        None,
    )
    .await;

    server
        .post("/api/auth/login")
        .json(&json!({ "email": "t@school.edu", "password": "changeme123" }))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/records/attendance")
        .json(&json!({
            "studentId": "S-9999",
            "date": "2026-08-24",
            "status": "present"
        }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_attendance_invalid_status() {
    let db = setup_db().await;
    let server = build_server(&db);

    seed_user(
        &db,
        "Tess Teacher",
        "t@school.edu",
        "changeme123",
        Role::Teacher,
        vec![Permission::TakeAttendance],
        None,
    )
    .await;
    seed_user(
        &db,
        "Sam Student",
        "sam@school.edu",
        "password123",
        Role::Student,
        vec![],
        Some("S-1001"),
    )
    .await;

    server
        .post("/api/auth/login")
        .json(&json!({ "email": "t@school.edu", "password": "changeme123" }))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/records/attendance")
        .json(&json!({
            "studentId": "S-1001",
            "date": "2026-08-24",
            "status": "vacationing"
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_attendance_overwrites_same_day() {
    let db = setup_db().await;
    let server = build_server(&db);

    seed_user(
        &db,
        "Tess Teacher",
        "t@school.edu",
        "changeme123",
        Role::Teacher,
        vec![Permission::TakeAttendance],
        None,
    )
    .await;
    seed_user(
        &db,
        "Sam Student",
        "sam@school.edu",
        "password123",
        Role::Student,
        vec![],
        Some("S-1001"),
    )
    .await;

    server
        .post("/api/auth/login")
        .json(&json!({ "email": "t@school.edu", "password": "changeme123" }))
        .await
        .assert_status_ok();

    server
        .post("/api/records/attendance")
        .json(&json!({
            "studentId": "S-1001",
            "date": "2026-08-24",
            "status": "absent"
        }))
        .await
        .assert_status_ok();

    let corrected = server
        .post("/api/records/attendance")
        .json(&json!({
            "studentId": "S-1001",
            "date": "2026-08-24",
            "status": "late"
        }))
        .await;
    corrected.assert_status_ok();

    let body: Value = corrected.json();
    assert_eq!(body["data"]["status"], "late");

    // Still one record for that day
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM attendance_records WHERE student_id = ? AND date = ?",
    )
    .bind("S-1001")
    .bind("2026-08-24")
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(count.0, 1);
}

#[tokio::test]
async fn test_role_revocation_applies_mid_session() {
    let db = setup_db().await;

    let teacher = seed_user(
        &db,
        "Tess Teacher",
        "t@school.edu",
        "changeme123",
        Role::Teacher,
        vec![Permission::TakeAttendance],
        None,
    )
    .await;
    seed_user(
        &db,
        "Sam Student",
        "sam@school.edu",
        "password123",
        Role::Student,
        vec![],
        Some("S-1001"),
    )
    .await;

    let server = build_server(&db);
    server
        .post("/api/auth/login")
        .json(&json!({ "email": "t@school.edu", "password": "changeme123" }))
        .await
        .assert_status_ok();

    let attempt = json!({
        "studentId": "S-1001",
        "date": "2026-08-24",
        "status": "present"
    });

    server
        .post("/api/records/attendance")
        .json(&attempt)
        .await
        .assert_status_ok();

    // Demote the teacher to student directly in the store
    UserRepository::new(db.pool())
        .set_role(teacher.id, Role::Student)
        .await
        .unwrap();

    // The live session is immediately bound by the new role
    server
        .post("/api/records/attendance")
        .json(&attempt)
        .await
        .assert_status_forbidden();
}
