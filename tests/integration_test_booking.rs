mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{parse_body, upcoming_date, TestApp};
use serde_json::{json, Value};
use tower::ServiceExt;

fn booking_request(tenant_id: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/v1/{}/appointments", tenant_id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn payload(service_id: &str, date: &str, time: &str, phone: &str) -> Value {
    json!({
        "service_id": service_id,
        "date": date,
        "time": time,
        "first_name": "Maria",
        "last_name": "Silva",
        "phone": phone,
    })
}

#[tokio::test]
async fn test_create_appointment_stores_canonical_phone() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Salon", "salon").await;
    let service_id = app.create_service(&tenant_id, "Manicure", 30).await;
    let date = upcoming_date(2);

    let res = app
        .router
        .clone()
        .oneshot(booking_request(
            &tenant_id,
            payload(&service_id, &date, "09:00", "(11) 98888-7777"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = parse_body(res).await;
    assert_eq!(body["status"], "booked");
    assert_eq!(body["client_phone"], "11988887777");
    assert!(body["id"].as_str().is_some());

    // The formatted and digits-only forms address the same history.
    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!(
                    "/api/v1/{}/appointments/by-phone?phone=11988887777",
                    tenant_id
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = parse_body(res).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_fields_are_reported_per_field() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Salon", "salon").await;
    let service_id = app.create_service(&tenant_id, "Manicure", 30).await;
    let date = upcoming_date(2);

    let res = app
        .router
        .clone()
        .oneshot(booking_request(
            &tenant_id,
            json!({
                "service_id": service_id,
                "date": date,
                "time": "09:00",
                "first_name": "M",
                "last_name": "Si1va",
                "phone": "123",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = parse_body(res).await;
    assert_eq!(body["error"], "Validation failed");
    let fields = body["fields"].as_object().unwrap();
    assert!(fields.contains_key("first_name"));
    assert!(fields.contains_key("last_name"));
    assert!(fields.contains_key("phone"));
}

#[tokio::test]
async fn test_cannot_book_in_the_past() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Salon", "salon").await;
    let service_id = app.create_service(&tenant_id, "Manicure", 30).await;

    let yesterday = (chrono::Utc::now() - chrono::Duration::days(2))
        .format("%Y-%m-%d")
        .to_string();
    let res = app
        .router
        .clone()
        .oneshot(booking_request(
            &tenant_id,
            payload(&service_id, &yesterday, "09:00", "11988887777"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert_eq!(body["error"], "Cannot book in the past");
}

#[tokio::test]
async fn test_second_booking_same_phone_same_day_rejected() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Salon", "salon").await;
    let service_id = app.create_service(&tenant_id, "Manicure", 30).await;
    let date = upcoming_date(2);

    let res = app
        .router
        .clone()
        .oneshot(booking_request(
            &tenant_id,
            payload(&service_id, &date, "09:00", "11988887777"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Different, non-overlapping time; same client, same day.
    let res = app
        .router
        .clone()
        .oneshot(booking_request(
            &tenant_id,
            payload(&service_id, &date, "14:00", "(11) 98888-7777"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = parse_body(res).await;
    assert_eq!(body["error"], "Client already has an appointment on this day");
}

#[tokio::test]
async fn test_overlapping_booking_rejected() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Salon", "salon").await;
    let service_id = app.create_service(&tenant_id, "Massage", 60).await;
    let date = upcoming_date(2);

    let res = app
        .router
        .clone()
        .oneshot(booking_request(
            &tenant_id,
            payload(&service_id, &date, "09:00", "11988887777"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .router
        .clone()
        .oneshot(booking_request(
            &tenant_id,
            payload(&service_id, &date, "09:30", "11977776666"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = parse_body(res).await;
    assert_eq!(body["error"], "Time slot is no longer available");
}

#[tokio::test]
async fn test_back_to_back_bookings_allowed() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Salon", "salon").await;
    let service_id = app.create_service(&tenant_id, "Manicure", 30).await;
    let date = upcoming_date(2);

    let res = app
        .router
        .clone()
        .oneshot(booking_request(
            &tenant_id,
            payload(&service_id, &date, "09:00", "11988887777"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .router
        .clone()
        .oneshot(booking_request(
            &tenant_id,
            payload(&service_id, &date, "09:30", "11977776666"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_concurrent_identical_bookings_one_wins() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Salon", "salon").await;
    let service_id = app.create_service(&tenant_id, "Manicure", 30).await;
    let date = upcoming_date(2);

    let first = app
        .router
        .clone()
        .oneshot(booking_request(
            &tenant_id,
            payload(&service_id, &date, "09:00", "11988887777"),
        ));
    let second = app
        .router
        .clone()
        .oneshot(booking_request(
            &tenant_id,
            payload(&service_id, &date, "09:00", "11977776666"),
        ));

    let (first, second) = tokio::join!(first, second);
    let statuses = [first.unwrap().status(), second.unwrap().status()];

    assert!(statuses.contains(&StatusCode::CREATED), "statuses: {statuses:?}");
    assert!(statuses.contains(&StatusCode::CONFLICT), "statuses: {statuses:?}");
}

#[tokio::test]
async fn test_unknown_service_rejected() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Salon", "salon").await;
    let date = upcoming_date(2);

    let res = app
        .router
        .clone()
        .oneshot(booking_request(
            &tenant_id,
            payload("missing-service", &date, "09:00", "11988887777"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
