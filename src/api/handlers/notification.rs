use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;

const LIST_LIMIT: i64 = 50;

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let notifications = state
        .notification_repo
        .list_for_user(&user.0.sub, LIST_LIMIT)
        .await?;
    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(notification_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .notification_repo
        .mark_read(&notification_id, &user.0.sub)
        .await?
        .ok_or(AppError::NotFound("Notification not found".into()))?;
    Ok(Json(updated))
}

pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    state.notification_repo.mark_all_read(&user.0.sub).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
