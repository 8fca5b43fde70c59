//! Rollback request flow over HTTP: file, list, resolve, withdraw.

mod common;

use axum::http::StatusCode;
use common::{
    expect_status, get_auth, post_json_auth, post_multipart_auth, seed_user, token_for,
    MultipartBuilder,
};
use sqlx::PgPool;

/// Drive a workflow to `finished` with two steps and return
/// `(workflow_id, first_form_id)`.
async fn finished_workflow(pool: &PgPool, token: &str) -> (String, String) {
    let body = serde_json::json!({ "title": "Chapel vault" });
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/workflows",
        token,
        body,
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;
    let workflow_id = json["data"]["id"].as_str().unwrap().to_string();

    let mut form_ids = Vec::new();
    for opinion in ["Surface cleaning", "Retouching"] {
        let builder = MultipartBuilder::new()
            .text("workflow_id", &workflow_id)
            .text("restoration_opinion", opinion);
        let response = post_multipart_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/forms",
            token,
            builder,
        )
        .await;
        let json = expect_status(response, StatusCode::CREATED).await;
        form_ids.push(json["data"]["id"].as_str().unwrap().to_string());
    }

    let body = serde_json::json!({ "final_form_id": form_ids[1] });
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/workflows/{workflow_id}/finalize"),
        token,
        body,
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    (workflow_id, form_ids.remove(0))
}

/// File a rollback request against `target_form_id` and return its id.
async fn file_request(pool: &PgPool, token: &str, workflow_id: &str, target_form_id: &str) -> i64 {
    let builder = MultipartBuilder::new()
        .text("workflow_id", workflow_id)
        .text("target_form_id", target_form_id)
        .text("reason", "Retouching tone mismatch under UV")
        .file("support_file", "uv.jpg", "image/jpeg", b"jpeg bytes");
    let response = post_multipart_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/rollback-requests",
        token,
        builder,
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"]["support_file_url"].is_string());
    json["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn approval_clones_the_target_and_reopens_the_workflow(pool: PgPool) {
    let restorer = seed_user(&pool, "maria", "restorer").await;
    let admin = seed_user(&pool, "root", "admin").await;
    let restorer_token = token_for(&restorer);
    let admin_token = token_for(&admin);

    let (workflow_id, target) = finished_workflow(&pool, &restorer_token).await;
    let request_id = file_request(&pool, &restorer_token, &workflow_id, &target).await;

    let body = serde_json::json!({ "approve": true });
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rollback-requests/{request_id}/approve"),
        &admin_token,
        body,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["request"]["status"], "approved");
    let clone_id = json["data"]["cloned_form_id"].as_str().unwrap().to_string();

    // The clone sits at the next step and points back at its origin.
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/forms/{clone_id}"),
        &restorer_token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["step_no"], 3);
    assert_eq!(json["data"]["is_rollback_from"], target.as_str());
    assert_eq!(json["data"]["restoration_opinion"], "Surface cleaning");

    // The workflow is running again and accepts submissions.
    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/workflows/{workflow_id}"),
        &restorer_token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["status"], "running");
    assert_eq!(json["data"]["is_finalized"], false);
    assert_eq!(json["data"]["current_step"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn resolution_is_single_shot(pool: PgPool) {
    let restorer = seed_user(&pool, "maria", "restorer").await;
    let admin = seed_user(&pool, "root", "admin").await;
    let restorer_token = token_for(&restorer);
    let admin_token = token_for(&admin);

    let (workflow_id, target) = finished_workflow(&pool, &restorer_token).await;
    let request_id = file_request(&pool, &restorer_token, &workflow_id, &target).await;

    let body = serde_json::json!({ "approve": false });
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rollback-requests/{request_id}/approve"),
        &admin_token,
        body.clone(),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["request"]["status"], "rejected");
    assert!(json["data"]["cloned_form_id"].is_null());

    // A resolved request reads as absent for further resolutions.
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rollback-requests/{request_id}/approve"),
        &admin_token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Rejection left the workflow finished.
    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/workflows/{workflow_id}"),
        &restorer_token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["status"], "finished");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_admins_resolve_requests(pool: PgPool) {
    let restorer = seed_user(&pool, "maria", "restorer").await;
    let restorer_token = token_for(&restorer);

    let (workflow_id, target) = finished_workflow(&pool, &restorer_token).await;
    let request_id = file_request(&pool, &restorer_token, &workflow_id, &target).await;

    let body = serde_json::json!({ "approve": true });
    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/rollback-requests/{request_id}/approve"),
        &restorer_token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn target_form_must_belong_to_the_workflow(pool: PgPool) {
    let restorer = seed_user(&pool, "maria", "restorer").await;
    let restorer_token = token_for(&restorer);

    let (workflow_id, _) = finished_workflow(&pool, &restorer_token).await;
    let (_, foreign_form) = finished_workflow(&pool, &restorer_token).await;

    let builder = MultipartBuilder::new()
        .text("workflow_id", &workflow_id)
        .text("target_form_id", &foreign_form)
        .text("reason", "wrong form");
    let response = post_multipart_auth(
        common::build_test_app(pool),
        "/api/v1/rollback-requests",
        &restorer_token,
        builder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn approval_of_a_deleted_target_reports_not_found(pool: PgPool) {
    let restorer = seed_user(&pool, "maria", "restorer").await;
    let admin = seed_user(&pool, "root", "admin").await;
    let restorer_token = token_for(&restorer);
    let admin_token = token_for(&admin);

    let (workflow_id, target) = finished_workflow(&pool, &restorer_token).await;
    let request_id = file_request(&pool, &restorer_token, &workflow_id, &target).await;

    let response = common::delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/forms/{target}"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "approve": true });
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rollback-requests/{request_id}/approve"),
        &admin_token,
        body,
    )
    .await;
    let json = expect_status(response, StatusCode::NOT_FOUND).await;
    assert_eq!(json["code"], "NOT_FOUND");

    // Nothing was resolved; the request is still pending.
    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/rollback-requests/{request_id}"),
        &admin_token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["status"], "pending");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn requester_withdraws_only_while_pending(pool: PgPool) {
    let restorer = seed_user(&pool, "maria", "restorer").await;
    let admin = seed_user(&pool, "root", "admin").await;
    let restorer_token = token_for(&restorer);
    let admin_token = token_for(&admin);

    let (workflow_id, target) = finished_workflow(&pool, &restorer_token).await;

    // Pending: the requester may withdraw.
    let request_id = file_request(&pool, &restorer_token, &workflow_id, &target).await;
    let response = common::delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rollback-requests/{request_id}"),
        &restorer_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Resolved: withdrawal is refused for the requester, allowed for admins.
    let request_id = file_request(&pool, &restorer_token, &workflow_id, &target).await;
    let body = serde_json::json!({ "approve": false });
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rollback-requests/{request_id}/approve"),
        &admin_token,
        body,
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let response = common::delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rollback-requests/{request_id}"),
        &restorer_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = common::delete_auth(
        common::build_test_app(pool),
        &format!("/api/v1/rollback-requests/{request_id}"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn requesters_see_only_their_own_requests(pool: PgPool) {
    let maria = seed_user(&pool, "maria", "restorer").await;
    let nadia = seed_user(&pool, "nadia", "restorer").await;
    let maria_token = token_for(&maria);
    let nadia_token = token_for(&nadia);

    let (workflow_id, target) = finished_workflow(&pool, &maria_token).await;
    let request_id = file_request(&pool, &maria_token, &workflow_id, &target).await;

    // The other restorer's list is empty and direct reads are refused.
    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/rollback-requests",
        &nadia_token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rollback-requests/{request_id}"),
        &nadia_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/rollback-requests/{request_id}"),
        &maria_token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["requester_name"], maria.full_name);
}
