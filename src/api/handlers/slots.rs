use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::api::dtos::{requests::SlotsQuery, responses::SlotsResponse};
use crate::domain::services::availability::compute_slots;
use crate::error::AppError;
use crate::state::AppState;
use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

const DEFAULT_DURATION_MIN: i32 = 30;

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let tz = state.config.timezone;

    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;

    state.tenant_repo.find_by_id(&tenant_id).await?
        .ok_or(AppError::NotFound("Tenant not found".into()))?;

    let duration = match &query.service_id {
        Some(service_id) => {
            let service = state.service_repo.find_by_id(&tenant_id, service_id).await?
                .ok_or(AppError::NotFound("Service not found".into()))?;
            service.duration_minutes
        }
        None => query.duration.unwrap_or(DEFAULT_DURATION_MIN),
    };
    if duration <= 0 {
        return Err(AppError::Validation("duration must be positive".into()));
    }

    let weekday = date.weekday().num_days_from_sunday() as i32;
    let rules = state.rule_repo.list_active_for_weekday(&tenant_id, weekday).await?;

    let day_start = tz
        .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
        .single()
        .ok_or(AppError::Validation("Invalid date for tenant timezone".into()))?
        .with_timezone(&Utc);
    let day_end = day_start + Duration::days(1);

    let appointments = state
        .appointment_repo
        .list_booked_in_range(&tenant_id, day_start, day_end)
        .await?;

    let slots = compute_slots(
        &rules,
        date,
        duration,
        &appointments,
        query.staff_id.as_deref(),
        tz,
    );

    Ok(Json(SlotsResponse { date: query.date, slots }))
}
