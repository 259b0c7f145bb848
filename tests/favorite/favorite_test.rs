use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use crate::common::TestContext;

#[tokio::test]
#[serial]
async fn toggle_adds_then_removes() {
    let Some(ctx) = TestContext::new().await else { return };
    let (owner, _, _) = ctx.register("owner").await;
    let (tenant, _, _) = ctx.register("tenant").await;
    let id = ctx.list_property(&owner, json!({})).await;

    let on: serde_json::Value = ctx
        .server
        .post(&format!("/api/favorites/{}", id))
        .authorization_bearer(&tenant)
        .await
        .json();
    assert_eq!(on["favorited"], true);

    let listed: serde_json::Value = ctx
        .server
        .get("/api/favorites")
        .authorization_bearer(&tenant)
        .await
        .json();
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["properties"][0]["_id"], id);

    let me: serde_json::Value = ctx.server.get("/api/me").authorization_bearer(&tenant).await.json();
    assert_eq!(me["favorites"], json!([id]));

    let off: serde_json::Value = ctx
        .server
        .post(&format!("/api/favorites/{}", id))
        .authorization_bearer(&tenant)
        .await
        .json();
    assert_eq!(off["favorited"], false);

    let listed: serde_json::Value = ctx
        .server
        .get("/api/favorites")
        .authorization_bearer(&tenant)
        .await
        .json();
    assert_eq!(listed["count"], 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn unknown_listing_cannot_be_favorited() {
    let Some(ctx) = TestContext::new().await else { return };
    let (tenant, _, _) = ctx.register("tenant").await;

    ctx.server
        .post("/api/favorites/00000000-0000-0000-0000-000000000000")
        .authorization_bearer(&tenant)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn deleted_listing_drops_out_of_favorites() {
    let Some(ctx) = TestContext::new().await else { return };
    let (owner, _, _) = ctx.register("owner").await;
    let (tenant, _, _) = ctx.register("tenant").await;
    let id = ctx.list_property(&owner, json!({})).await;

    ctx.server
        .post(&format!("/api/favorites/{}", id))
        .authorization_bearer(&tenant)
        .await
        .assert_status(StatusCode::OK);
    ctx.server
        .delete(&format!("/api/delete-property/{}", id))
        .authorization_bearer(&owner)
        .await
        .assert_status(StatusCode::OK);

    let listed: serde_json::Value = ctx
        .server
        .get("/api/favorites")
        .authorization_bearer(&tenant)
        .await
        .json();
    assert_eq!(listed["count"], 0);

    ctx.cleanup().await;
}
