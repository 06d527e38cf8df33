//! Integration tests for the hive API endpoints, covering auth, the full
//! report → triage → alert flow, and the metrics surface.

use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum_test::TestServer;
use hive_api::{create_router, ApiConfig, AppState};
use hive_core::types::Role;
use hive_store::SeedUser;
use serde_json::{json, Value};

fn seed(email: &str, role: Role) -> SeedUser {
    SeedUser {
        email: email.to_string(),
        password: "correct-horse-battery".to_string(),
        role,
        display_name: email.split('@').next().unwrap().to_string(),
    }
}

async fn create_test_server() -> TestServer {
    let config = ApiConfig {
        seed_users: vec![
            seed("admin@hive.test", Role::Admin),
            seed("triager@hive.test", Role::Triager),
            seed("auditor@hive.test", Role::Auditor),
            seed("educator@hive.test", Role::Educator),
        ],
        ..ApiConfig::default()
    };
    let state = AppState::new(&config).await.unwrap();
    TestServer::new(create_router(state)).unwrap()
}

async fn login(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/v1/auth/login")
        .json(&json!({ "email": email, "password": "correct-horse-battery" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

fn report_payload() -> Value {
    json!({
        "category": "scam_phishing",
        "severitySuggested": "S2",
        "areaHint": "Night market, east gate",
        "timeWindow": "19:00-21:00",
        "description": "QR code stickers over the payment signs",
        "evidence": ["https://example.org/photo1.jpg"]
    })
}

async fn submit_report(server: &TestServer) -> String {
    let response = server.post("/v1/reports").json(&report_payload()).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["status"], "submitted");
    body["id"].as_str().unwrap().to_string()
}

// ============ Health & Auth ============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server().await;

    let response = server.get("/healthz").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_login_and_me() {
    let server = create_test_server().await;
    let token = login(&server, "triager@hive.test").await;

    let response = server
        .get("/v1/auth/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["email"], "triager@hive.test");
    assert_eq!(body["role"], "triager");
}

#[tokio::test]
async fn test_bad_credentials_rejected() {
    let server = create_test_server().await;

    let response = server
        .post("/v1/auth/login")
        .json(&json!({ "email": "triager@hive.test", "password": "wrong" }))
        .await;
    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let server = create_test_server().await;

    let response = server.get("/v1/reports").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_role_gate_on_kpi() {
    let server = create_test_server().await;
    let triager = login(&server, "triager@hive.test").await;

    let response = server
        .get("/v1/metrics/kpi")
        .add_header(AUTHORIZATION, bearer(&triager))
        .await;
    response.assert_status_forbidden();
    let body: Value = response.json();
    assert_eq!(body["code"], "FORBIDDEN");
}

// ============ Reports ============

#[tokio::test]
async fn test_report_intake_is_public() {
    let server = create_test_server().await;
    submit_report(&server).await;
}

#[tokio::test]
async fn test_intake_rejects_unknown_category() {
    let server = create_test_server().await;

    let mut payload = report_payload();
    payload["category"] = json!("urban_legends");
    let response = server.post("/v1/reports").json(&payload).await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_report_list_pagination_envelope() {
    let server = create_test_server().await;
    for _ in 0..3 {
        submit_report(&server).await;
    }
    let token = login(&server, "auditor@hive.test").await;

    let response = server
        .get("/v1/reports?page=1&pageSize=2")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["pageSize"], 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["totalPages"], 2);
}

#[tokio::test]
async fn test_report_list_rejects_oversized_page() {
    let server = create_test_server().await;
    let token = login(&server, "auditor@hive.test").await;

    let response = server
        .get("/v1/reports?pageSize=999")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_get_unknown_report_is_not_found() {
    let server = create_test_server().await;
    let token = login(&server, "triager@hive.test").await;

    let response = server
        .get("/v1/reports/00000000-0000-0000-0000-000000000000")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

// ============ Triage ============

#[tokio::test]
async fn test_triage_accept_flow() {
    let server = create_test_server().await;
    let report_id = submit_report(&server).await;
    let token = login(&server, "triager@hive.test").await;

    let response = server
        .post(&format!("/v1/reports/{report_id}/triage"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "decision": "accept",
            "severityFinal": "S2",
            "evidenceLevel": "E1"
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["report"]["status"], "triaged");
    assert_eq!(body["decision"]["decision"], "accept");
    assert_eq!(body["decision"]["auditDigest"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_reject_without_rationale_is_validation_error() {
    let server = create_test_server().await;
    let report_id = submit_report(&server).await;
    let token = login(&server, "triager@hive.test").await;

    let response = server
        .post(&format!("/v1/reports/{report_id}/triage"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "decision": "reject", "severityFinal": "S1" }))
        .await;
    response.assert_status_bad_request();

    // Status unchanged, nothing persisted.
    let report = server
        .get(&format!("/v1/reports/{report_id}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    let body: Value = report.json();
    assert_eq!(body["status"], "submitted");
}

#[tokio::test]
async fn test_review_and_reopen() {
    let server = create_test_server().await;
    let report_id = submit_report(&server).await;
    let token = login(&server, "triager@hive.test").await;

    let review = server
        .post(&format!("/v1/reports/{report_id}/review"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    review.assert_status_ok();
    let body: Value = review.json();
    assert_eq!(body["report"]["status"], "under_review");

    let reopen = server
        .post(&format!("/v1/reports/{report_id}/reopen"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    reopen.assert_status_ok();
    let body: Value = reopen.json();
    assert_eq!(body["report"]["status"], "submitted");

    // Reopening a submitted report is a conflict.
    let again = server
        .post(&format!("/v1/reports/{report_id}/reopen"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    again.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_triage_requires_staff_role() {
    let server = create_test_server().await;
    let report_id = submit_report(&server).await;
    let educator = login(&server, "educator@hive.test").await;

    let response = server
        .post(&format!("/v1/reports/{report_id}/triage"))
        .add_header(AUTHORIZATION, bearer(&educator))
        .json(&json!({ "decision": "accept", "severityFinal": "S0" }))
        .await;
    response.assert_status_forbidden();
}

// ============ Alerts ============

fn alert_payload() -> Value {
    json!({
        "event": "Phishing wave targeting market vendors",
        "urgency": "Expected",
        "severity": "Moderate",
        "certainty": "Likely",
        "area": "Central district",
        "instruction": "Do not scan unverified QR codes",
        "channels": ["web"]
    })
}

async fn create_draft_alert(server: &TestServer, token: &str) -> String {
    let response = server
        .post("/v1/alerts")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&alert_payload())
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["status"], "draft");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_alert_lifecycle() {
    let server = create_test_server().await;
    let admin = login(&server, "admin@hive.test").await;
    let alert_id = create_draft_alert(&server, &admin).await;

    let approve = server
        .patch(&format!("/v1/alerts/{alert_id}"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .json(&json!({ "status": "approved" }))
        .await;
    approve.assert_status_ok();
    let body: Value = approve.json();
    assert_eq!(body["status"], "approved");
    assert!(body["approvedBy"].is_string());

    let publish = server
        .patch(&format!("/v1/alerts/{alert_id}"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .json(&json!({ "status": "published" }))
        .await;
    publish.assert_status_ok();
    let body: Value = publish.json();
    let published_at = body["publishedAt"].as_str().unwrap().to_string();
    assert!(body["capXml"].as_str().unwrap().contains("<urgency>Expected</urgency>"));

    let withdraw = server
        .patch(&format!("/v1/alerts/{alert_id}"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .json(&json!({ "status": "withdrawn" }))
        .await;
    withdraw.assert_status_ok();
    let body: Value = withdraw.json();
    assert_eq!(body["status"], "withdrawn");
    assert_eq!(body["publishedAt"], published_at.as_str());
}

#[tokio::test]
async fn test_alert_cannot_skip_approval() {
    let server = create_test_server().await;
    let admin = login(&server, "admin@hive.test").await;
    let alert_id = create_draft_alert(&server, &admin).await;

    let response = server
        .patch(&format!("/v1/alerts/{alert_id}"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .json(&json!({ "status": "published" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_alert_edits_locked_after_approval() {
    let server = create_test_server().await;
    let admin = login(&server, "admin@hive.test").await;
    let alert_id = create_draft_alert(&server, &admin).await;

    server
        .patch(&format!("/v1/alerts/{alert_id}"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .json(&json!({ "status": "approved" }))
        .await
        .assert_status_ok();

    let response = server
        .patch(&format!("/v1/alerts/{alert_id}"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .json(&json!({ "event": "Edited after approval" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_alert_patch_requires_admin() {
    let server = create_test_server().await;
    let triager = login(&server, "triager@hive.test").await;
    let alert_id = create_draft_alert(&server, &triager).await;

    let response = server
        .patch(&format!("/v1/alerts/{alert_id}"))
        .add_header(AUTHORIZATION, bearer(&triager))
        .json(&json!({ "status": "approved" }))
        .await;
    response.assert_status_forbidden();
}

#[tokio::test]
async fn test_draft_alert_delete() {
    let server = create_test_server().await;
    let admin = login(&server, "admin@hive.test").await;
    let alert_id = create_draft_alert(&server, &admin).await;

    let response = server
        .delete(&format!("/v1/alerts/{alert_id}"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);

    server
        .get(&format!("/v1/alerts/{alert_id}"))
        .add_header(AUTHORIZATION, bearer(&admin))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_alert_reads_require_token() {
    let server = create_test_server().await;
    let admin = login(&server, "admin@hive.test").await;
    let alert_id = create_draft_alert(&server, &admin).await;

    // Drafts must not be enumerable without a token.
    server.get("/v1/alerts").await.assert_status_unauthorized();
    server
        .get(&format!("/v1/alerts/{alert_id}"))
        .await
        .assert_status_unauthorized();

    let listed = server
        .get("/v1/alerts?status=draft")
        .add_header(AUTHORIZATION, bearer(&admin))
        .await;
    listed.assert_status_ok();
    let body: Value = listed.json();
    assert_eq!(body["pagination"]["total"], 1);
}

// ============ Training & Metrics ============

#[tokio::test]
async fn test_training_flow_and_stats() {
    let server = create_test_server().await;
    let educator = login(&server, "educator@hive.test").await;

    let create = server
        .post("/v1/training-events")
        .add_header(AUTHORIZATION, bearer(&educator))
        .json(&json!({
            "title": "Spotting phishing QR codes",
            "eventDate": "2025-06-14",
            "attendanceCount": 28
        }))
        .await;
    create.assert_status(axum::http::StatusCode::CREATED);
    let event: Value = create.json();
    let event_id = event["id"].as_str().unwrap();

    for (participant, quiz_type, score) in
        [("p1", "pre", 40.0), ("p1", "post", 80.0), ("p2", "pre", 60.0)]
    {
        server
            .post(&format!("/v1/training-events/{event_id}/results"))
            .add_header(AUTHORIZATION, bearer(&educator))
            .json(&json!({
                "participantRef": participant,
                "quizType": quiz_type,
                "score": score
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    // Stats are public.
    let stats = server.get("/v1/training-events/stats").await;
    stats.assert_status_ok();
    let body: Value = stats.json();
    assert_eq!(body["totalEvents"], 1);
    assert_eq!(body["totalParticipants"], 28);
    assert_eq!(body["avgPreScore"], 50.0);
    assert_eq!(body["avgPostScore"], 80.0);
}

#[tokio::test]
async fn test_kpi_report_shape() {
    let server = create_test_server().await;
    let report_id = submit_report(&server).await;
    let triager = login(&server, "triager@hive.test").await;
    server
        .post(&format!("/v1/reports/{report_id}/triage"))
        .add_header(AUTHORIZATION, bearer(&triager))
        .json(&json!({ "decision": "accept", "severityFinal": "S2" }))
        .await
        .assert_status_ok();

    let auditor = login(&server, "auditor@hive.test").await;
    let response = server
        .get("/v1/metrics/kpi")
        .add_header(AUTHORIZATION, bearer(&auditor))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["pipeline"]["verifiedRatio"]["current"], 100.0);
    assert_eq!(body["pipeline"]["verifiedRatio"]["met"], true);
    assert_eq!(body["pipeline"]["abuseRate"]["current"], 0.0);
    assert_eq!(body["education"]["workshops"]["target"], 12.0);
    assert_eq!(body["adoption"]["partnerOrgs"]["inverse"], false);
}

#[tokio::test]
async fn test_dashboard_is_public() {
    let server = create_test_server().await;
    submit_report(&server).await;

    let response = server.get("/v1/metrics/dashboard").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["totalReports"], 1);
    assert_eq!(body["recentReports"], 1);
    assert_eq!(body["publishedAlerts"], 0);
    assert!(body["categoryBreakdown"].is_array());
}
