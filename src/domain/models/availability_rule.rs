use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A recurring weekly availability window. Several rules may target the same
/// weekday (morning and afternoon blocks); they are expanded independently
/// and merged by the slot compositor.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AvailabilityRule {
    pub id: String,
    pub tenant_id: String,
    /// 0 = Sunday .. 6 = Saturday, evaluated in the tenant timezone.
    pub weekday: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityRule {
    pub fn new(
        tenant_id: String,
        weekday: i32,
        start_time: NaiveTime,
        end_time: NaiveTime,
        slot_minutes: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            weekday,
            start_time,
            end_time,
            slot_minutes,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
