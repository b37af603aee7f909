mod helpers;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{
    Request, StatusCode,
    header::{AUTHORIZATION, CONTENT_DISPOSITION},
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use db::models::attendance_record::{Event, Model as Record, NewSubmission, Section};
use db::models::attendance_window::Model as Window;
use helpers::app::{admin_token, make_test_app, student_token};
use util::geo::VENUE_LOCATION;
use util::state::AppState;

async fn seed_record(state: &AppState, name: &str, roll: &str, section: Section, device: &str) {
    Record::submit(
        state.db(),
        NewSubmission {
            student_name: name.to_string(),
            roll_number: roll.to_string(),
            section,
            event: Event::TechnicalTraining,
            device_id: device.to_string(),
            location: Some(VENUE_LOCATION),
        },
        Utc::now(),
    )
    .await
    .expect("Failed to seed attendance record");
}

async fn seed_records(state: &AppState) {
    Window::set_window(state.db(), 1, "00:00:00", "23:59:59", true)
        .await
        .expect("Failed to configure attendance window");
    seed_record(state, "Asha Verma", "2301730001", Section::Csai1, "d1").await;
    seed_record(state, "Bhanu Singh", "2301730002", Section::Csai1, "d2").await;
    seed_record(state, "Chitra Rao", "2301730003", Section::Csai2, "d3").await;
}

async fn get_json(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::get(uri);
    if let Some(token) = token {
        req = req.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let res = app
        .clone()
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn records_require_admin() {
    let (app, _state) = make_test_app().await;

    let (status, _) = get_json(&app, "/api/attendance/records", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) =
        get_json(&app, "/api/attendance/records", Some(&student_token())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Admin access required");
}

#[tokio::test]
async fn window_status_is_public() {
    let (app, _state) = make_test_app().await;

    let (status, json) = get_json(&app, "/api/attendance/window/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["allowed"], false);
    assert_eq!(json["data"]["message"], "Attendance settings not configured");
}

#[tokio::test]
async fn list_records_returns_all() {
    let (app, state) = make_test_app().await;
    seed_records(&state).await;

    let (status, json) =
        get_json(&app, "/api/attendance/records", Some(&admin_token())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["records"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn list_records_filters_by_section() {
    let (app, state) = make_test_app().await;
    seed_records(&state).await;

    let (status, json) = get_json(
        &app,
        "/api/attendance/records?section=CSAI-1",
        Some(&admin_token()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 2);
    for record in json["data"]["records"].as_array().unwrap() {
        assert_eq!(record["section"], "CSAI-1");
    }
}

#[tokio::test]
async fn list_records_searches_name_and_roll() {
    let (app, state) = make_test_app().await;
    seed_records(&state).await;

    let (status, json) = get_json(
        &app,
        "/api/attendance/records?q=Asha",
        Some(&admin_token()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["records"][0]["student_name"], "Asha Verma");

    let (_, json) = get_json(
        &app,
        "/api/attendance/records?q=2301730003",
        Some(&admin_token()),
    )
    .await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["records"][0]["roll_number"], "2301730003");
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let (app, state) = make_test_app().await;
    seed_records(&state).await;

    for query in ["asha", "ASHA", "aShA"] {
        let (status, json) = get_json(
            &app,
            &format!("/api/attendance/records?q={query}"),
            Some(&admin_token()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["total"], 1, "query {query:?} missed");
        assert_eq!(json["data"]["records"][0]["student_name"], "Asha Verma");
    }
}

#[tokio::test]
async fn list_records_paginates() {
    let (app, state) = make_test_app().await;
    seed_records(&state).await;

    let (_, json) = get_json(
        &app,
        "/api/attendance/records?per_page=2&page=1",
        Some(&admin_token()),
    )
    .await;
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["records"].as_array().unwrap().len(), 2);

    let (_, json) = get_json(
        &app,
        "/api/attendance/records?per_page=2&page=2",
        Some(&admin_token()),
    )
    .await;
    assert_eq!(json["data"]["records"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn export_produces_quoted_csv() {
    let (app, state) = make_test_app().await;
    seed_records(&state).await;

    let res = app
        .clone()
        .oneshot(
            Request::get("/api/attendance/records/export")
                .header(AUTHORIZATION, format!("Bearer {}", admin_token()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let disposition = res
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"attendance-"));

    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "Student Name,Roll Number,Section,Event,Date,Time,Location"
    );
    for line in &lines[1..] {
        assert!(line.starts_with('"') && line.ends_with('"'));
        assert_eq!(line.matches("\",\"").count(), 6, "bad row: {line}");
    }
    // Newest first: the last seeded record leads.
    assert!(lines[1].starts_with("\"Chitra Rao\",\"2301730003\",\"CSAI-2\""));
}

#[tokio::test]
async fn export_respects_filters() {
    let (app, state) = make_test_app().await;
    seed_records(&state).await;

    let res = app
        .clone()
        .oneshot(
            Request::get("/api/attendance/records/export?section=CSAI-2")
                .header(AUTHORIZATION, format!("Bearer {}", admin_token()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("\"Chitra Rao\""));
    assert!(!csv.contains("\"Asha Verma\""));
}

#[tokio::test]
async fn qr_link_requires_both_params() {
    let (app, _state) = make_test_app().await;

    let (status, json) = get_json(
        &app,
        "/api/attendance/qr-link?section=CSAI-1",
        Some(&admin_token()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "Both section and event are required to generate a QR link"
    );
}

#[tokio::test]
async fn qr_link_encodes_section_and_event() {
    let (app, _state) = make_test_app().await;

    let (status, json) = get_json(
        &app,
        "/api/attendance/qr-link?section=CSAI-1&event=Technical%20Training",
        Some(&admin_token()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let url = json["data"]["url"].as_str().unwrap();
    assert!(url.contains("section=CSAI-1"), "unexpected url: {url}");
    assert!(
        url.contains("event=Technical+Training"),
        "unexpected url: {url}"
    );
}
