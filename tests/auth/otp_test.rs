use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use crate::common::{test_email, test_password, TestContext};

async fn register_with_phone(ctx: &TestContext, phone: &str) {
    ctx.server
        .post("/api/register")
        .json(&json!({
            "email": test_email(),
            "password": test_password(),
            "firstName": "Ravi",
            "phone": phone
        }))
        .await
        .assert_status(StatusCode::CREATED);
}

async fn is_verified(ctx: &TestContext, phone: &str) -> bool {
    let row: (bool,) = sqlx::query_as("SELECT is_verified FROM users WHERE phone = ?")
        .bind(phone)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    row.0
}

#[tokio::test]
#[serial]
async fn correct_code_verifies_phone_and_is_consumed() {
    let Some(ctx) = TestContext::new().await else { return };
    register_with_phone(&ctx, "9876511111").await;
    let code = ctx.notifier.wait_for_code("9876511111").await;

    let response = ctx
        .server
        .post("/api/verify-otp")
        .json(&json!({ "phone": "9876511111", "code": code }))
        .await;
    response.assert_status(StatusCode::OK);
    assert!(is_verified(&ctx, "9876511111").await);

    // Consumed on first use.
    ctx.server
        .post("/api/verify-otp")
        .json(&json!({ "phone": "9876511111", "code": code }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn wrong_code_is_rejected_and_counted() {
    let Some(ctx) = TestContext::new().await else { return };
    register_with_phone(&ctx, "9876522222").await;
    let code = ctx.notifier.wait_for_code("9876522222").await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    ctx.server
        .post("/api/verify-otp")
        .json(&json!({ "phone": "9876522222", "code": wrong }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let attempts: (i32,) = sqlx::query_as("SELECT attempts FROM one_time_codes WHERE destination = ?")
        .bind("9876522222")
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(attempts.0, 1);
    assert!(!is_verified(&ctx, "9876522222").await);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn code_is_burned_after_max_attempts() {
    let Some(ctx) = TestContext::new().await else { return };
    register_with_phone(&ctx, "9876533333").await;
    let code = ctx.notifier.wait_for_code("9876533333").await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    for _ in 0..ctx.state.otp.max_attempts {
        ctx.server
            .post("/api/verify-otp")
            .json(&json!({ "phone": "9876533333", "code": wrong }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    // Even the right code no longer works.
    ctx.server
        .post("/api/verify-otp")
        .json(&json!({ "phone": "9876533333", "code": code }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn expired_code_is_rejected() {
    let Some(ctx) = TestContext::new().await else { return };

    ctx.server
        .post("/api/send-otp")
        .json(&json!({ "phone": "9876544444" }))
        .await
        .assert_status(StatusCode::OK);
    let code = ctx.notifier.wait_for_code("9876544444").await;

    sqlx::query("UPDATE one_time_codes SET expires_at = ? WHERE destination = ?")
        .bind(chrono::Utc::now() - chrono::Duration::minutes(1))
        .bind("9876544444")
        .execute(&ctx.db)
        .await
        .unwrap();

    let response = ctx
        .server
        .post("/api/verify-otp")
        .json(&json!({ "phone": "9876544444", "code": code }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Verification code has expired");

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn new_code_replaces_previous_one() {
    let Some(ctx) = TestContext::new().await else { return };

    for _ in 0..2 {
        ctx.server
            .post("/api/send-otp")
            .json(&json!({ "phone": "9876555555" }))
            .await
            .assert_status(StatusCode::OK);
    }

    let rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM one_time_codes WHERE destination = ?")
        .bind("9876555555")
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(rows.0, 1);

    ctx.cleanup().await;
}
