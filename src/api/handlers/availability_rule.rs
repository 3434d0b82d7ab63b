use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::api::dtos::requests::{CreateRuleRequest, UpdateRuleRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::availability_rule::AvailabilityRule;
use crate::error::AppError;
use crate::state::AppState;
use chrono::NaiveTime;
use std::sync::Arc;
use tracing::info;

fn parse_time(value: &str, field: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid {} (expected HH:MM)", field)))
}

fn check_rule(weekday: i32, start: NaiveTime, end: NaiveTime, slot_minutes: i32) -> Result<(), AppError> {
    if !(0..=6).contains(&weekday) {
        return Err(AppError::Validation("weekday must be between 0 (Sunday) and 6".into()));
    }
    if end <= start {
        return Err(AppError::Validation("end_time must be after start_time".into()));
    }
    if slot_minutes <= 0 {
        return Err(AppError::Validation("slot_minutes must be positive".into()));
    }
    Ok(())
}

pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(tenant_id): Path<String>,
    Json(payload): Json<CreateRuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_owner(&tenant_id)?;

    let start = parse_time(&payload.start_time, "start_time")?;
    let end = parse_time(&payload.end_time, "end_time")?;
    check_rule(payload.weekday, start, end, payload.slot_minutes)?;

    let mut rule = AvailabilityRule::new(tenant_id, payload.weekday, start, end, payload.slot_minutes);
    if let Some(is_active) = payload.is_active {
        rule.is_active = is_active;
    }

    let created = state.rule_repo.create(&rule).await?;
    info!("Availability rule created: {}", created.id);
    Ok(Json(created))
}

pub async fn list_rules(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rules = state.rule_repo.list(&tenant_id).await?;
    Ok(Json(rules))
}

pub async fn update_rule(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((tenant_id, rule_id)): Path<(String, String)>,
    Json(payload): Json<UpdateRuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_owner(&tenant_id)?;

    let mut rule = state.rule_repo.find_by_id(&tenant_id, &rule_id).await?
        .ok_or(AppError::NotFound("Availability rule not found".into()))?;

    if let Some(weekday) = payload.weekday {
        rule.weekday = weekday;
    }
    if let Some(ref start) = payload.start_time {
        rule.start_time = parse_time(start, "start_time")?;
    }
    if let Some(ref end) = payload.end_time {
        rule.end_time = parse_time(end, "end_time")?;
    }
    if let Some(slot_minutes) = payload.slot_minutes {
        rule.slot_minutes = slot_minutes;
    }
    if let Some(is_active) = payload.is_active {
        rule.is_active = is_active;
    }

    check_rule(rule.weekday, rule.start_time, rule.end_time, rule.slot_minutes)?;

    let updated = state.rule_repo.update(&rule).await?;
    Ok(Json(updated))
}

pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((tenant_id, rule_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    user.require_owner(&tenant_id)?;

    state.rule_repo.delete(&tenant_id, &rule_id).await?;
    info!("Availability rule deleted: {}", rule_id);
    Ok(Json(serde_json::json!({ "success": true })))
}
