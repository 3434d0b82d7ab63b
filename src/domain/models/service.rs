use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bookable offering. Inactive services are hidden from the booking flow
/// but kept for historic appointments.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Service {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl Service {
    pub fn new(tenant_id: String, name: String, duration_minutes: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            name,
            duration_minutes,
            is_active: true,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }
}
