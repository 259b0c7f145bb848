use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use crate::common::{test_password, TestContext};

#[tokio::test]
#[serial]
async fn forgot_password_for_unknown_email_still_succeeds() {
    let Some(ctx) = TestContext::new().await else { return };

    let response = ctx
        .server
        .post("/api/forgot-password")
        .json(&json!({ "email": "ghost@example.com" }))
        .await;

    response.assert_status(StatusCode::OK);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(ctx.notifier.sent_to("ghost@example.com").is_empty());

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn reset_with_emailed_code_changes_password() {
    let Some(ctx) = TestContext::new().await else { return };
    let (_, _, email) = ctx.register("owner").await;

    ctx.server
        .post("/api/forgot-password")
        .json(&json!({ "email": &email }))
        .await
        .assert_status(StatusCode::OK);
    let code = ctx.notifier.wait_for_code(&email).await;

    ctx.server
        .post("/api/reset-password")
        .json(&json!({ "email": &email, "code": code, "password": "BrandNewPass1" }))
        .await
        .assert_status(StatusCode::OK);

    ctx.server
        .post("/api/login")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .post("/api/login")
        .json(&json!({ "email": &email, "password": "BrandNewPass1" }))
        .await
        .assert_status(StatusCode::OK);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn reset_with_wrong_code_fails() {
    let Some(ctx) = TestContext::new().await else { return };
    let (_, _, email) = ctx.register("owner").await;

    ctx.server
        .post("/api/forgot-password")
        .json(&json!({ "email": &email }))
        .await;
    let code = ctx.notifier.wait_for_code(&email).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    ctx.server
        .post("/api/reset-password")
        .json(&json!({ "email": &email, "code": wrong, "password": "BrandNewPass1" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}
