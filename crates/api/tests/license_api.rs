//! HTTP-level tests for the `/licenses` endpoints.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    build_test_app, create_asset, delete_auth, expect_data, get_auth, post_json_auth,
    put_json_auth, user_with_token,
};
use serde_json::json;
use sqlx::PgPool;

fn date_in(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

async fn create_license(pool: &PgPool, token: &str, body: serde_json::Value) -> i64 {
    let response = post_json_auth(build_test_app(pool.clone()), "/api/v1/licenses", body, token).await;
    let data = expect_data(response, StatusCode::CREATED).await;
    data["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_license_with_defaults(pool: PgPool) {
    let (_mgr, token) = user_with_token(&pool, "mgr", "Asset Manager", "IT").await;

    let body = json!({ "software_name": "Office 365", "vendor": "Microsoft", "cost": 99.5 });
    let response = post_json_auth(build_test_app(pool), "/api/v1/licenses", body, &token).await;
    let data = expect_data(response, StatusCode::CREATED).await;

    assert_eq!(data["software_name"], "Office 365");
    assert_eq!(data["seats"], 1);
    assert_eq!(data["status"], "Active");
    assert_eq!(data["cost"], 99.5);
    assert!(data["asset"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_license_attached_to_asset(pool: PgPool) {
    let (_mgr, token) = user_with_token(&pool, "mgr", "Asset Manager", "IT").await;
    let asset_id = create_asset(
        &pool,
        &token,
        json!({ "name": "Workstation", "category": "Desktop", "serial_number": "WS-001" }),
    )
    .await;

    let body = json!({ "software_name": "AutoCAD", "asset_id": asset_id, "seats": 3 });
    let response = post_json_auth(build_test_app(pool.clone()), "/api/v1/licenses", body, &token).await;
    let data = expect_data(response, StatusCode::CREATED).await;
    assert_eq!(data["asset"]["id"], asset_id);
    assert_eq!(data["asset"]["name"], "Workstation");
    assert_eq!(data["asset"]["serial_number"], "WS-001");
    assert_eq!(data["seats"], 3);

    let uri = format!("/api/v1/licenses?asset_id={asset_id}");
    let response = get_auth(build_test_app(pool.clone()), &uri, &token).await;
    let data = expect_data(response, StatusCode::OK).await;
    assert_eq!(data[0]["asset"]["serial_number"], "WS-001");

    let missing = json!({ "software_name": "AutoCAD", "asset_id": 999999 });
    let response = post_json_auth(build_test_app(pool), "/api/v1/licenses", missing, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_license_validation(pool: PgPool) {
    let (_mgr, token) = user_with_token(&pool, "mgr", "Asset Manager", "IT").await;

    let cases = [
        json!({ "vendor": "No name" }),
        json!({ "software_name": "X", "seats": 0 }),
        json!({ "software_name": "X", "status": "Lapsed" }),
        json!({ "software_name": "X", "cost": -1.0 }),
        json!({ "software_name": "X", "expiration_date": "31/12/2025" }),
    ];
    for body in cases {
        let response =
            post_json_auth(build_test_app(pool.clone()), "/api/v1/licenses", body.clone(), &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_managers_write_licenses(pool: PgPool) {
    let (_mgr, mgr_token) = user_with_token(&pool, "mgr", "Asset Manager", "IT").await;
    let (_hr, hr_token) = user_with_token(&pool, "hr", "HR", "People").await;
    let license_id = create_license(&pool, &mgr_token, json!({ "software_name": "Slack" })).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/licenses",
        json!({ "software_name": "Zoom" }),
        &hr_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let uri = format!("/api/v1/licenses/{license_id}");
    let response = delete_auth(build_test_app(pool.clone()), &uri, &hr_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Reading is open to any authenticated user.
    let response = get_auth(build_test_app(pool), &uri, &hr_token).await;
    let data = expect_data(response, StatusCode::OK).await;
    assert_eq!(data["software_name"], "Slack");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_status_and_name(pool: PgPool) {
    let (_mgr, token) = user_with_token(&pool, "mgr", "Asset Manager", "IT").await;
    create_license(&pool, &token, json!({ "software_name": "Adobe Photoshop" })).await;
    create_license(&pool, &token, json!({ "software_name": "Adobe Acrobat", "status": "Cancelled" })).await;
    create_license(&pool, &token, json!({ "software_name": "JetBrains" })).await;

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/licenses", &token).await;
    let data = expect_data(response, StatusCode::OK).await;
    assert_eq!(data.as_array().unwrap().len(), 3);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/licenses?software_name=adobe", &token).await;
    let data = expect_data(response, StatusCode::OK).await;
    assert_eq!(data.as_array().unwrap().len(), 2);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/licenses?status=Cancelled", &token).await;
    let data = expect_data(response, StatusCode::OK).await;
    let licenses = data.as_array().unwrap();
    assert_eq!(licenses.len(), 1);
    assert_eq!(licenses[0]["software_name"], "Adobe Acrobat");

    let response = get_auth(build_test_app(pool), "/api/v1/licenses?status=Bogus", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expiring_lists_active_licenses_soonest_first(pool: PgPool) {
    let (_mgr, token) = user_with_token(&pool, "mgr", "Asset Manager", "IT").await;
    create_license(&pool, &token, json!({ "software_name": "Later", "expiration_date": date_in(20) })).await;
    create_license(&pool, &token, json!({ "software_name": "Sooner", "expiration_date": date_in(5) })).await;
    create_license(&pool, &token, json!({ "software_name": "Far", "expiration_date": date_in(90) })).await;
    create_license(&pool, &token, json!({ "software_name": "Lapsed", "expiration_date": date_in(-3) })).await;
    create_license(
        &pool,
        &token,
        json!({ "software_name": "Cancelled", "expiration_date": date_in(3), "status": "Cancelled" }),
    )
    .await;

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/licenses/expiring", &token).await;
    let data = expect_data(response, StatusCode::OK).await;
    let names: Vec<&str> = data
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["software_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Sooner", "Later"]);
    assert_eq!(data[0]["days_until_expiry"], 5);
    assert_eq!(data[1]["days_until_expiry"], 20);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/licenses/expiring?days=100", &token).await;
    let data = expect_data(response, StatusCode::OK).await;
    assert_eq!(data.as_array().unwrap().len(), 3);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/licenses/expiring?days=-1", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response =
        get_auth(build_test_app(pool), "/api/v1/licenses/expiring?days=100000000", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_and_delete_license(pool: PgPool) {
    let (_mgr, token) = user_with_token(&pool, "mgr", "Asset Manager", "IT").await;
    let license_id = create_license(&pool, &token, json!({ "software_name": "Figma", "seats": 2 })).await;
    let uri = format!("/api/v1/licenses/{license_id}");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "seats": 10, "status": "Expired" }),
        &token,
    )
    .await;
    let data = expect_data(response, StatusCode::OK).await;
    assert_eq!(data["seats"], 10);
    assert_eq!(data["status"], "Expired");
    assert_eq!(data["software_name"], "Figma");

    let response = put_json_auth(build_test_app(pool.clone()), "/api/v1/licenses/999999", json!({ "seats": 1 }), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
