use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::api::dtos::requests::{CreateServiceRequest, UpdateServiceRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::service::Service;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(tenant_id): Path<String>,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_owner(&tenant_id)?;

    if payload.duration_minutes <= 0 {
        return Err(AppError::Validation("duration_minutes must be positive".into()));
    }

    let mut service = Service::new(tenant_id, payload.name, payload.duration_minutes);
    if let Some(sort_order) = payload.sort_order {
        service.sort_order = sort_order;
    }

    let created = state.service_repo.create(&service).await?;
    info!("Service created: {}", created.id);
    Ok(Json(created))
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let services = state.service_repo.list_active(&tenant_id).await?;
    Ok(Json(services))
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((tenant_id, service_id)): Path<(String, String)>,
    Json(payload): Json<UpdateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_owner(&tenant_id)?;

    let mut service = state.service_repo.find_by_id(&tenant_id, &service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;

    if let Some(name) = payload.name {
        service.name = name;
    }
    if let Some(duration) = payload.duration_minutes {
        if duration <= 0 {
            return Err(AppError::Validation("duration_minutes must be positive".into()));
        }
        service.duration_minutes = duration;
    }
    if let Some(is_active) = payload.is_active {
        service.is_active = is_active;
    }
    if let Some(sort_order) = payload.sort_order {
        service.sort_order = sort_order;
    }

    let updated = state.service_repo.update(&service).await?;
    Ok(Json(updated))
}

pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((tenant_id, service_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    user.require_owner(&tenant_id)?;

    state.service_repo.delete(&tenant_id, &service_id).await?;
    info!("Service deleted: {}", service_id);
    Ok(Json(serde_json::json!({ "success": true })))
}
