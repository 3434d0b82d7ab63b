mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{parse_body, upcoming_date, TestApp};
use serde_json::json;
use tower::ServiceExt;

async fn get_slots(app: &TestApp, tenant_id: &str, query: &str) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/{}/slots?{}", tenant_id, query))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn book(
    app: &TestApp,
    tenant_id: &str,
    service_id: &str,
    date: &str,
    time: &str,
    phone: &str,
) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/{}/appointments", tenant_id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "service_id": service_id,
                        "date": date,
                        "time": time,
                        "first_name": "Maria",
                        "last_name": "Silva",
                        "phone": phone,
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_booked_window_blocks_every_overlapping_slot() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Studio Glow", "studio-glow").await;
    let service_id = app.create_service(&tenant_id, "Manicure", 30).await;
    app.create_rule(&tenant_id, 2, "09:00", "11:00", 30).await;
    let date = upcoming_date(2);

    // 09:15-09:45 straddles the 09:00 and 09:30 slots.
    let res = book(&app, &tenant_id, &service_id, &date, "09:15", "11988887777").await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = get_slots(&app, &tenant_id, &format!("date={}&service_id={}", date, service_id)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;

    let slots = body["slots"].as_array().unwrap();
    let availability: Vec<(&str, bool)> = slots
        .iter()
        .map(|s| (s["time"].as_str().unwrap(), s["available"].as_bool().unwrap()))
        .collect();

    assert_eq!(
        availability,
        vec![
            ("09:00", false),
            ("09:30", false),
            ("10:00", true),
            ("10:30", true),
        ]
    );
}

#[tokio::test]
async fn test_window_shorter_than_step_yields_no_slots() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Tiny Window", "tiny-window").await;
    app.create_rule(&tenant_id, 3, "09:00", "09:20", 30).await;
    let date = upcoming_date(3);

    let res = get_slots(&app, &tenant_id, &format!("date={}", date)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert!(body["slots"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_overlapping_rules_are_deduped_and_sorted() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Two Rules", "two-rules").await;
    app.create_rule(&tenant_id, 4, "09:00", "11:00", 60).await;
    app.create_rule(&tenant_id, 4, "09:30", "10:30", 30).await;
    let date = upcoming_date(4);

    let res = get_slots(&app, &tenant_id, &format!("date={}&duration=30", date)).await;
    let body = parse_body(res).await;

    let times: Vec<&str> = body["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["time"].as_str().unwrap())
        .collect();
    // 10:00 appears in both rules but is listed once.
    assert_eq!(times, vec!["09:00", "09:30", "10:00"]);
}

#[tokio::test]
async fn test_slot_starting_exactly_at_booking_end_is_free() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Boundary", "boundary").await;
    let service_id = app.create_service(&tenant_id, "Cut", 30).await;
    app.create_rule(&tenant_id, 5, "09:00", "10:30", 30).await;
    let date = upcoming_date(5);

    let res = book(&app, &tenant_id, &service_id, &date, "09:00", "11988887777").await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = get_slots(&app, &tenant_id, &format!("date={}&service_id={}", date, service_id)).await;
    let body = parse_body(res).await;
    let slots = body["slots"].as_array().unwrap();

    assert_eq!(slots[0]["time"], "09:00");
    assert_eq!(slots[0]["available"], false);
    // Half-open windows: a slot starting at the booking's end does not conflict.
    assert_eq!(slots[1]["time"], "09:30");
    assert_eq!(slots[1]["available"], true);
}

#[tokio::test]
async fn test_only_slot_starts_are_bounded_by_the_window() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Trailing", "trailing").await;
    app.create_rule(&tenant_id, 1, "09:00", "10:00", 45).await;
    let date = upcoming_date(1);

    let res = get_slots(&app, &tenant_id, &format!("date={}&duration=45", date)).await;
    let body = parse_body(res).await;
    let times: Vec<&str> = body["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["time"].as_str().unwrap())
        .collect();
    // 09:45 starts inside the window even though it runs past closing.
    assert_eq!(times, vec!["09:00", "09:45"]);
}

#[tokio::test]
async fn test_slots_query_is_idempotent() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Stable", "stable").await;
    let service_id = app.create_service(&tenant_id, "Pedicure", 30).await;
    app.create_rule(&tenant_id, 2, "09:00", "12:00", 30).await;
    let date = upcoming_date(2);

    book(&app, &tenant_id, &service_id, &date, "09:00", "11988887777").await;

    let first = parse_body(
        get_slots(&app, &tenant_id, &format!("date={}&service_id={}", date, service_id)).await,
    )
    .await;
    let second = parse_body(
        get_slots(&app, &tenant_id, &format!("date={}&service_id={}", date, service_id)).await,
    )
    .await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_tenant_and_bad_date() {
    let app = TestApp::new().await;

    let res = get_slots(&app, "missing-tenant", "date=2030-01-01").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let tenant_id = app.create_tenant("Real", "real").await;
    let res = get_slots(&app, &tenant_id, "date=not-a-date").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
