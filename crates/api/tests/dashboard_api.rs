//! Role-shaped dashboard aggregates over HTTP.

mod common;

use axum::http::StatusCode;
use common::{
    expect_status, get_auth, post_json_auth, post_multipart_auth, seed_user, token_for,
    MultipartBuilder,
};
use sqlx::PgPool;

/// Create a workflow, submit one form, and optionally finalize it.
async fn build_workflow(pool: &PgPool, token: &str, title: &str, finish: bool) -> String {
    let body = serde_json::json!({ "title": title });
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/workflows",
        token,
        body,
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;
    let workflow_id = json["data"]["id"].as_str().unwrap().to_string();

    let builder = MultipartBuilder::new()
        .text("workflow_id", &workflow_id)
        .text("restoration_opinion", "step");
    let response = post_multipart_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/forms",
        token,
        builder,
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;
    let form_id = json["data"]["id"].as_str().unwrap().to_string();

    if finish {
        let body = serde_json::json!({ "final_form_id": form_id });
        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/workflows/{workflow_id}/finalize"),
            token,
            body,
        )
        .await;
        expect_status(response, StatusCode::OK).await;
    }

    workflow_id
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_dashboard_aggregates_everything(pool: PgPool) {
    let maria = seed_user(&pool, "maria", "restorer").await;
    let nadia = seed_user(&pool, "nadia", "restorer").await;
    let admin = seed_user(&pool, "root", "admin").await;

    build_workflow(&pool, &token_for(&maria), "Chapel vault", true).await;
    build_workflow(&pool, &token_for(&nadia), "Crypt fresco", false).await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/dashboard",
        &token_for(&admin),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;

    assert_eq!(json["data"]["totals"]["workflows"], 2);
    assert_eq!(json["data"]["totals"]["forms"], 2);
    assert_eq!(json["data"]["totals"]["evaluations"], 0);

    let rate = json["data"]["completion_rate"].as_f64().unwrap();
    assert!((rate - 0.5).abs() < 1e-9, "one of two is finished: {rate}");

    // Recent activity covers both workflows, newest first.
    let activity = json["data"]["recent_activity"].as_array().unwrap();
    assert_eq!(activity.len(), 3);
    assert_eq!(activity[0]["action"], "submit");

    // Evaluator-only sections are absent for admins.
    assert!(json["data"].get("evaluations_pending").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn restorer_dashboard_is_scoped_to_own_workflows(pool: PgPool) {
    let maria = seed_user(&pool, "maria", "restorer").await;
    let nadia = seed_user(&pool, "nadia", "restorer").await;

    build_workflow(&pool, &token_for(&maria), "Chapel vault", true).await;
    build_workflow(&pool, &token_for(&nadia), "Crypt fresco", false).await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/dashboard",
        &token_for(&maria),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;

    assert_eq!(json["data"]["totals"]["workflows"], 1);
    let rate = json["data"]["completion_rate"].as_f64().unwrap();
    assert!((rate - 1.0).abs() < 1e-9);
    assert_eq!(json["data"]["recent_activity"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn evaluator_dashboard_counts_the_backlog(pool: PgPool) {
    let maria = seed_user(&pool, "maria", "restorer").await;
    let elena = seed_user(&pool, "elena", "evaluator").await;
    let elena_token = token_for(&elena);

    let finished = build_workflow(&pool, &token_for(&maria), "Chapel vault", true).await;
    build_workflow(&pool, &token_for(&maria), "Crypt fresco", true).await;
    build_workflow(&pool, &token_for(&maria), "Nave mural", false).await;

    // Two finished workflows, none evaluated yet.
    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/dashboard",
        &elena_token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["evaluations_submitted"], 0);
    assert_eq!(json["data"]["evaluations_pending"], 2);
    assert!(json["data"].get("totals").is_none());

    // Scoring one moves it from pending to submitted.
    let builder = MultipartBuilder::new()
        .text("workflow_id", &finished)
        .text("score", "90");
    let response = post_multipart_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/evaluations",
        &elena_token,
        builder,
    )
    .await;
    expect_status(response, StatusCode::CREATED).await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/dashboard",
        &elena_token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["evaluations_submitted"], 1);
    assert_eq!(json["data"]["evaluations_pending"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn privacy_agreement_is_served_from_seeded_config(pool: PgPool) {
    let response = common::get(
        common::build_test_app(pool),
        "/api/v1/system/privacy-agreement",
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;

    assert_eq!(json["data"]["key"], "privacy_agreement");
    assert!(!json["data"]["value"].as_str().unwrap().is_empty());
}
