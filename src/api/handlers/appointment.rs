use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::api::dtos::requests::{
    AgendaQuery, CancelAppointmentRequest, CreateAppointmentRequest, PhoneQuery,
    RescheduleAppointmentRequest,
};
use crate::api::extractors::{auth::AuthUser, maybe_auth::MaybeAuthUser};
use crate::domain::services::booking::CreateAppointmentParams;
use crate::domain::services::validation;
use crate::error::AppError;
use crate::state::AppState;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::info;

fn parse_local_start(tz: Tz, date: &str, time: &str) -> Result<DateTime<Utc>, AppError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))?;

    tz.from_local_datetime(&date.and_time(time))
        .single()
        .ok_or(AppError::Validation("Invalid local time (ambiguous or skipped due to DST)".into()))
        .map(|dt| dt.with_timezone(&Utc))
}

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    user: MaybeAuthUser,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.tenant_repo.find_by_id(&tenant_id).await?
        .ok_or(AppError::NotFound("Tenant not found".into()))?;

    let start_at = parse_local_start(state.config.timezone, &payload.date, &payload.time)?;

    let created = state
        .booking_service
        .create(CreateAppointmentParams {
            tenant_id,
            service_id: payload.service_id,
            staff_id: payload.staff_id,
            client_user_id: user.0.map(|claims| claims.sub),
            start_at,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            notes: payload.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Phone-gated cancel for guests. Always answers 200; the outcome body
/// carries success or a generic denial.
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Path((tenant_id, appointment_id)): Path<(String, String)>,
    Json(payload): Json<CancelAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .booking_service
        .cancel_by_phone(&appointment_id, &tenant_id, &payload.phone)
        .await?;
    Ok(Json(outcome))
}

pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((tenant_id, appointment_id)): Path<(String, String)>,
    Json(payload): Json<RescheduleAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_owner(&tenant_id)?;

    let new_start = parse_local_start(state.config.timezone, &payload.date, &payload.time)?;

    let replacement = state
        .booking_service
        .reschedule(
            &tenant_id,
            &appointment_id,
            new_start,
            payload.service_id,
            payload.staff_id,
        )
        .await?;

    info!("Appointment rescheduled: {} -> {}", appointment_id, replacement.id);
    Ok(Json(replacement))
}

pub async fn list_agenda(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(tenant_id): Path<String>,
    Query(query): Query<AgendaQuery>,
) -> Result<impl IntoResponse, AppError> {
    user.require_owner(&tenant_id)?;

    let range = match &query.date {
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::Validation("Invalid date format".into()))?;
            let day_start = state
                .config
                .timezone
                .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
                .single()
                .ok_or(AppError::Validation("Invalid date for tenant timezone".into()))?
                .with_timezone(&Utc);
            Some((day_start, day_start + Duration::days(1)))
        }
        None => None,
    };

    let appointments = state.appointment_repo.list_by_tenant(&tenant_id, range).await?;
    Ok(Json(appointments))
}

/// Phone-gated history lookup for guests. The phone is canonicalized the
/// same way the create path stores it, so formatted input still matches.
pub async fn list_by_phone(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    Query(query): Query<PhoneQuery>,
) -> Result<impl IntoResponse, AppError> {
    let phone = validation::sanitize_phone(&query.phone);
    let appointments = state.appointment_repo.list_by_phone(&tenant_id, &phone).await?;
    Ok(Json(appointments))
}

pub async fn my_appointments(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let appointments = state.appointment_repo.list_by_client(&user.0.sub).await?;
    Ok(Json(appointments))
}

pub async fn cancel_own(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(appointment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .booking_service
        .cancel_by_client(&appointment_id, &user.0.sub)
        .await?;
    Ok(Json(outcome))
}
