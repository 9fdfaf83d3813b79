//! HTTP-level tests against the in-memory store

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::{NaiveTime, Utc};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::{
    AvailableShiftSlot, Employee, EmployeeBranchAssignment, ScheduledShift, Week,
};
use shift_portal::api::create_router;
use shift_portal::db::MemoryShiftStore;
use shift_portal::state::{AppState, PortalSettings};
use tower::ServiceExt;

const ADMIN_KEY: &str = "test-admin-key";
const BUSINESS_ID: i64 = 10;
const ANA: i64 = 1;
const CARO: i64 = 3;
const BRANCH_A: i64 = 100;
const BRANCH_B: i64 = 200;

/// Next week, so tokens issued now stay valid for the whole test
fn week() -> Week {
    Week::containing(Utc::now().date_naive()).next()
}

fn time(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

fn slot(id: i64, branch_id: i64, day_of_week: i16, shift_type: &str) -> AvailableShiftSlot {
    AvailableShiftSlot {
        id,
        business_id: BUSINESS_ID,
        branch_id,
        week_start_date: week().start,
        week_end_date: week().end,
        day_of_week,
        shift_type: shift_type.to_string(),
        start_time: time(8),
        end_time: time(16),
    }
}

async fn seed(store: &MemoryShiftStore) {
    for (id, name) in [(ANA, "Ana"), (CARO, "Caro")] {
        store
            .add_employee(Employee {
                id,
                business_id: BUSINESS_ID,
                name: name.to_string(),
                is_active: true,
                shift_quota: None,
            })
            .await;
    }
    store
        .add_assignment(EmployeeBranchAssignment {
            id: 1,
            employee_id: ANA,
            branch_id: BRANCH_A,
            branch_name: "Center".to_string(),
            role_name: "barista".to_string(),
            shift_types: vec!["morning".to_string()],
            available_days: vec![1, 2, 3, 4, 5],
            is_active: true,
        })
        .await;
    for s in [
        slot(501, BRANCH_A, 1, "morning"),
        slot(502, BRANCH_A, 2, "morning"),
        slot(503, BRANCH_B, 2, "morning"),
        slot(504, BRANCH_A, 3, "morning"),
        slot(505, BRANCH_A, 4, "morning"),
    ] {
        store.add_slot(s).await;
    }
}

async fn app_with(settings: PortalSettings) -> (Router, Arc<MemoryShiftStore>) {
    let store = Arc::new(MemoryShiftStore::new());
    seed(&store).await;
    let state = AppState::with_store(store.clone(), settings, ADMIN_KEY);
    (create_router(state), store)
}

async fn app() -> (Router, Arc<MemoryShiftStore>) {
    app_with(PortalSettings::default()).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_KEY}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Issue a token through the admin API and return its secret
async fn issue(app: &Router, employee_id: i64) -> String {
    let (status, body) = send(
        app,
        admin_post(
            "/api/admin/tokens",
            json!({ "employeeId": employee_id, "weekStartDate": week().start }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_storage() {
    let (app, _) = app().await;
    let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "shift-portal");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn admin_routes_require_key() {
    let (app, _) = app().await;
    let body = json!({ "employeeId": ANA, "weekStartDate": week().start });

    let (status, resp) = send(&app, post("/api/admin/tokens", body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp["code"], 1001);

    let wrong = Request::post("/api/admin/tokens")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer nope")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn issue_returns_link_and_reuses_live_token() {
    let (app, _) = app().await;
    let request = || {
        admin_post(
            "/api/admin/tokens",
            json!({ "employeeId": ANA, "weekStartDate": week().start }),
        )
    };

    let (status, first) = send(&app, request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["code"], 0);
    let token = first["data"]["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);
    assert_eq!(
        first["data"]["link"],
        format!("http://localhost:5173/shifts/{token}")
    );
    assert_eq!(first["data"]["reused"], false);
    assert_eq!(first["data"]["contextType"], "open");
    assert_eq!(first["data"]["status"], "live");

    let (_, second) = send(&app, request()).await;
    assert_eq!(second["data"]["reused"], true);
    assert_eq!(second["data"]["id"], first["data"]["id"]);
}

#[tokio::test]
async fn issue_rejects_non_sunday_week() {
    let (app, _) = app().await;
    let monday = week().start + chrono::Duration::days(1);
    let (status, body) = send(
        &app,
        admin_post(
            "/api/admin/tokens",
            json!({ "employeeId": ANA, "weekStartDate": monday }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4201);
}

#[tokio::test]
async fn context_lists_only_assigned_branch_slots() {
    let (app, _) = app().await;
    let token = issue(&app, ANA).await;

    let (status, body) = send(
        &app,
        post("/api/shift-token/context", json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let data = &body["data"];
    assert_eq!(data["tokenData"]["maxSubmissions"], 2);
    assert_eq!(data["context"]["employeeName"], "Ana");
    assert_eq!(data["context"]["mode"], "open");
    assert_eq!(data["context"]["quota"], 3);
    assert_eq!(data["context"]["canSubmit"], true);
    assert!(data["context"]["submission"].is_null());

    let ids: Vec<i64> = data["shifts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![501, 502, 504, 505]);
    assert_eq!(data["shifts"][1]["dayOfWeek"], 2);
    assert_eq!(data["shifts"][1]["branchId"], BRANCH_A);
    assert_eq!(
        data["shifts"][1]["date"],
        json!(week().date_of(2).unwrap())
    );
}

#[tokio::test]
async fn unknown_token_is_invalid() {
    let (app, _) = app().await;
    let (status, body) = send(
        &app,
        post("/api/shift-token/context", json!({ "token": "f".repeat(64) })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);
}

#[tokio::test]
async fn unassigned_employee_gets_distinct_error() {
    let (app, _) = app().await;
    let token = issue(&app, CARO).await;

    let (status, body) = send(
        &app,
        post("/api/shift-token/context", json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 4101);
}

#[tokio::test]
async fn submit_resubmit_then_exhausted() {
    let (app, store) = app().await;
    let token = issue(&app, ANA).await;

    let payload = json!({
        "token": token,
        "choices": [{ "slotId": 501 }, { "slotId": 502 }],
        "preferenceLevel": 2,
    });
    let (status, body) = send(&app, post("/api/shift-token/submit", payload.clone())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["success"], true);
    assert_eq!(body["data"]["choicesCount"], 2);
    assert_eq!(body["data"]["remainingSubmissions"], 1);

    // Bare slot ids are accepted too
    let (status, _) = send(
        &app,
        post(
            "/api/shift-token/submit",
            json!({ "token": token, "choices": [501, 502], "preferenceLevel": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.submission_count().await, 1);

    let (status, body) = send(&app, post("/api/shift-token/submit", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4103);

    // Exhausted tokens can still read their submission
    let (status, body) = send(
        &app,
        post("/api/shift-token/context", json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["context"]["canSubmit"], false);
    assert_eq!(body["data"]["tokenData"]["status"], "exhausted");
    let choices = body["data"]["context"]["submission"]["choices"]
        .as_array()
        .unwrap();
    assert_eq!(choices.len(), 2);
    assert_eq!(choices[0]["slotId"], 501);
}

#[tokio::test]
async fn submit_over_quota_is_rejected() {
    let (app, store) = app().await;
    let token = issue(&app, ANA).await;

    let (status, body) = send(
        &app,
        post(
            "/api/shift-token/submit",
            json!({ "token": token, "choices": [501, 502, 504, 505] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4102);
    assert_eq!(body["details"]["submitted"], 4);
    assert_eq!(body["details"]["allowed"], 3);
    assert_eq!(store.submission_count().await, 0);
}

#[tokio::test]
async fn submit_slot_from_other_branch_is_rejected() {
    let (app, _) = app().await;
    let token = issue(&app, ANA).await;

    let (status, body) = send(
        &app,
        post(
            "/api/shift-token/submit",
            json!({ "token": token, "choices": [503] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4105);
    assert_eq!(body["details"]["slot_id"], 503);
}

#[tokio::test]
async fn published_week_shows_assignment_and_blocks_submit() {
    let (app, store) = app().await;
    let token = issue(&app, ANA).await;
    store
        .add_scheduled_shift(ScheduledShift {
            id: 901,
            business_id: BUSINESS_ID,
            employee_id: ANA,
            branch_id: BRANCH_A,
            shift_date: week().date_of(3).unwrap(),
            shift_type: "morning".to_string(),
            start_time: time(8),
            end_time: time(16),
            role_name: Some("barista".to_string()),
        })
        .await;

    let (status, body) = send(
        &app,
        post("/api/shift-token/context", json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["context"]["mode"], "assigned");
    assert_eq!(body["data"]["shifts"][0]["id"], 901);
    assert_eq!(body["data"]["shifts"][0]["dayOfWeek"], 3);
    assert_eq!(body["data"]["shifts"][0]["roleName"], "barista");

    let (status, body) = send(
        &app,
        post(
            "/api/shift-token/submit",
            json!({ "token": token, "choices": [501] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4104);
}

#[tokio::test]
async fn revoke_is_idempotent_and_invalidates_token() {
    let (app, _) = app().await;
    let (_, issued) = send(
        &app,
        admin_post(
            "/api/admin/tokens",
            json!({ "employeeId": ANA, "weekStartDate": week().start }),
        ),
    )
    .await;
    let token_id = issued["data"]["id"].clone();
    let token = issued["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        admin_post("/api/admin/tokens/revoke", json!({ "tokenId": token_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], true);
    assert_eq!(body["data"]["revoked"], true);

    let (_, body) = send(
        &app,
        admin_post("/api/admin/tokens/revoke", json!({ "tokenId": token_id })),
    )
    .await;
    assert_eq!(body["data"]["success"], true);
    assert_eq!(body["data"]["revoked"], false);

    let (status, body) = send(
        &app,
        post("/api/shift-token/context", json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);

    let (status, _) = send(
        &app,
        admin_post("/api/admin/tokens/revoke", json!({ "tokenId": 424242 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_issue_and_list() {
    let (app, _) = app().await;
    let (status, body) = send(
        &app,
        admin_post(
            "/api/admin/tokens/batch",
            json!({ "businessId": BUSINESS_ID, "weekStartDate": week().start }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let issued = body["data"]["issued"].as_array().unwrap();
    assert_eq!(issued.len(), 1);
    assert_eq!(issued[0]["employeeId"], ANA);
    let skipped = body["data"]["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["employeeId"], CARO);
    assert_eq!(skipped[0]["reason"], 4101);

    let list = Request::get(format!("/api/admin/employees/{ANA}/tokens"))
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_KEY}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, list).await;
    assert_eq!(status, StatusCode::OK);
    let tokens = body["data"].as_array().unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0]["id"], issued[0]["id"]);
}

#[tokio::test]
async fn malformed_body_uses_error_envelope() {
    let (app, _) = app().await;
    let request = Request::post("/api/shift-token/context")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5);
}

#[tokio::test]
async fn public_routes_are_rate_limited() {
    let settings = PortalSettings {
        rate_limit_per_minute: 2,
        ..PortalSettings::default()
    };
    let (app, _) = app_with(settings).await;
    let request = || post("/api/shift-token/context", json!({ "token": "f".repeat(64) }));

    let (first, _) = send(&app, request()).await;
    let (second, _) = send(&app, request()).await;
    let (third, body) = send(&app, request()).await;
    assert_eq!(first, StatusCode::NOT_FOUND);
    assert_eq!(second, StatusCode::NOT_FOUND);
    assert_eq!(third, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], 9405);
}

#[tokio::test]
async fn rotating_forwarded_header_does_not_reset_limit() {
    let settings = PortalSettings {
        rate_limit_per_minute: 1,
        ..PortalSettings::default()
    };
    let (app, _) = app_with(settings).await;
    let request = |ip: &str| {
        let mut request = post("/api/shift-token/context", json!({ "token": "f".repeat(64) }));
        request
            .headers_mut()
            .insert("x-forwarded-for", ip.parse().unwrap());
        request
    };

    let (first, _) = send(&app, request("198.51.100.1")).await;
    let (second, _) = send(&app, request("198.51.100.2")).await;
    assert_eq!(first, StatusCode::NOT_FOUND);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn trusted_proxy_limits_per_forwarded_client() {
    let settings = PortalSettings {
        rate_limit_per_minute: 1,
        trust_forwarded_for: true,
        ..PortalSettings::default()
    };
    let (app, _) = app_with(settings).await;
    let request = |ip: &str| {
        let mut request = post("/api/shift-token/context", json!({ "token": "f".repeat(64) }));
        request
            .headers_mut()
            .insert("x-forwarded-for", ip.parse().unwrap());
        request
    };

    let (first, _) = send(&app, request("198.51.100.1")).await;
    let (other_client, _) = send(&app, request("198.51.100.2")).await;
    let (repeat, _) = send(&app, request("198.51.100.1")).await;
    assert_eq!(first, StatusCode::NOT_FOUND);
    assert_eq!(other_client, StatusCode::NOT_FOUND);
    assert_eq!(repeat, StatusCode::TOO_MANY_REQUESTS);
}
