use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{appointment, availability_rule, health, notification, service, slots, tenant};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Tenants
        .route("/api/v1/tenants", post(tenant::create_tenant))
        .route("/api/v1/tenants/by-slug/{slug}", get(tenant::get_tenant_by_slug))

        // Services
        .route("/api/v1/{tenant_id}/services", get(service::list_services).post(service::create_service))
        .route("/api/v1/{tenant_id}/services/{service_id}", axum::routing::put(service::update_service).delete(service::delete_service))

        // Availability rules
        .route("/api/v1/{tenant_id}/availability-rules", get(availability_rule::list_rules).post(availability_rule::create_rule))
        .route("/api/v1/{tenant_id}/availability-rules/{rule_id}", axum::routing::put(availability_rule::update_rule).delete(availability_rule::delete_rule))

        // Public booking flow
        .route("/api/v1/{tenant_id}/slots", get(slots::get_slots))
        .route("/api/v1/{tenant_id}/appointments", post(appointment::create_appointment).get(appointment::list_agenda))
        .route("/api/v1/{tenant_id}/appointments/by-phone", get(appointment::list_by_phone))
        .route("/api/v1/{tenant_id}/appointments/{appointment_id}/cancel", post(appointment::cancel_appointment))
        .route("/api/v1/{tenant_id}/appointments/{appointment_id}/reschedule", post(appointment::reschedule_appointment))

        // Signed-in clients
        .route("/api/v1/me/appointments", get(appointment::my_appointments))
        .route("/api/v1/me/appointments/{appointment_id}/cancel", post(appointment::cancel_own))
        .route("/api/v1/me/notifications", get(notification::list_notifications))
        .route("/api/v1/me/notifications/read-all", post(notification::mark_all_read))
        .route("/api/v1/me/notifications/{notification_id}/read", post(notification::mark_read))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        tenant_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
