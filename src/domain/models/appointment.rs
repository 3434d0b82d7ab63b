use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_BOOKED: &str = "booked";
pub const STATUS_CANCELED: &str = "canceled";

/// The atomic booking unit. Rows are never hard-deleted: cancellation is a
/// soft status transition and rescheduling inserts a replacement row that
/// points back at the original through `rescheduled_from_id`.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Appointment {
    pub id: String,
    pub tenant_id: String,
    pub service_id: String,
    pub staff_id: Option<String>,
    pub client_user_id: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Calendar day of `start_at` in the tenant timezone. Backs the
    /// one-booked-appointment-per-client-per-day uniqueness gate.
    pub appointment_date: NaiveDate,
    pub status: String,
    pub canceled_at: Option<DateTime<Utc>>,
    pub rescheduled_from_id: Option<String>,
    pub client_first_name: String,
    pub client_last_name: String,
    /// Canonical digits-only form. The stable client identity key.
    pub client_phone: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewAppointmentParams {
    pub tenant_id: String,
    pub service_id: String,
    pub staff_id: Option<String>,
    pub client_user_id: Option<String>,
    pub start: DateTime<Utc>,
    pub duration_min: i32,
    pub appointment_date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub notes: Option<String>,
    pub rescheduled_from_id: Option<String>,
}

impl Appointment {
    pub fn new(params: NewAppointmentParams) -> Self {
        let end_at = params.start + chrono::Duration::minutes(params.duration_min as i64);

        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: params.tenant_id,
            service_id: params.service_id,
            staff_id: params.staff_id,
            client_user_id: params.client_user_id,
            start_at: params.start,
            end_at,
            appointment_date: params.appointment_date,
            status: STATUS_BOOKED.to_string(),
            canceled_at: None,
            rescheduled_from_id: params.rescheduled_from_id,
            client_first_name: params.first_name,
            client_last_name: params.last_name,
            client_phone: params.phone,
            notes: params.notes,
            created_at: Utc::now(),
        }
    }
}
