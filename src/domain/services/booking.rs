use crate::domain::models::appointment::{
    Appointment, NewAppointmentParams, STATUS_BOOKED,
};
use crate::domain::models::notification::Notification;
use crate::domain::ports::{AppointmentRepository, NotificationRepository, ServiceRepository};
use crate::domain::services::validation::{self, AppointmentForm};
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

pub struct CreateAppointmentParams {
    pub tenant_id: String,
    pub service_id: String,
    pub staff_id: Option<String>,
    pub client_user_id: Option<String>,
    pub start_at: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelOutcome {
    pub success: bool,
    pub message: String,
}

/// A denial must read the same whether the appointment never existed, the
/// phone was wrong, or the row was already canceled, so callers cannot probe
/// phone numbers against appointment ids.
const CANCEL_DENIED: &str = "Not authorized or appointment already canceled";
const CANCEL_OK: &str = "Appointment canceled";

/// The write-path gate. Every appointment mutation goes through here; the
/// repositories it holds are injected so tests can run it against an
/// in-memory store.
pub struct BookingService {
    appointments: Arc<dyn AppointmentRepository>,
    services: Arc<dyn ServiceRepository>,
    notifications: Arc<dyn NotificationRepository>,
    tz: Tz,
}

impl BookingService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        services: Arc<dyn ServiceRepository>,
        notifications: Arc<dyn NotificationRepository>,
        tz: Tz,
    ) -> Self {
        Self {
            appointments,
            services,
            notifications,
            tz,
        }
    }

    /// Create-path validations, applied in order, each a hard reject:
    /// field validation, service resolution, past check, overlap pre-check,
    /// per-day-per-client pre-check, then the transactional insert. The
    /// pre-checks exist to produce friendly errors; the database constraints
    /// behind `insert` are the authoritative gate against concurrent
    /// creators.
    pub async fn create(&self, params: CreateAppointmentParams) -> Result<Appointment, AppError> {
        validation::validate_appointment_form(&AppointmentForm {
            first_name: &params.first_name,
            last_name: &params.last_name,
            phone: &params.phone,
            notes: params.notes.as_deref(),
        })?;

        let service = self
            .services
            .find_by_id(&params.tenant_id, &params.service_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".into()))?;

        if params.start_at < Utc::now() {
            return Err(AppError::Validation("Cannot book in the past".into()));
        }

        let end_at = params.start_at + Duration::minutes(service.duration_minutes as i64);

        let overlapping = self
            .appointments
            .find_overlapping(
                &params.tenant_id,
                params.staff_id.as_deref(),
                params.start_at,
                end_at,
                None,
            )
            .await?;
        if !overlapping.is_empty() {
            return Err(AppError::Conflict("Time slot is no longer available".into()));
        }

        let phone = validation::sanitize_phone(&params.phone);
        let local_day = params.start_at.with_timezone(&self.tz).date_naive();

        let same_day = self
            .appointments
            .count_booked_on_day(&params.tenant_id, &phone, local_day, None)
            .await?;
        if same_day > 0 {
            return Err(AppError::Conflict(
                "Client already has an appointment on this day".into(),
            ));
        }

        let appointment = Appointment::new(NewAppointmentParams {
            tenant_id: params.tenant_id.clone(),
            service_id: params.service_id,
            staff_id: params.staff_id,
            client_user_id: params.client_user_id.clone(),
            start: params.start_at,
            duration_min: service.duration_minutes,
            appointment_date: local_day,
            first_name: params.first_name.trim().to_string(),
            last_name: params.last_name.trim().to_string(),
            phone,
            notes: params
                .notes
                .map(|n| validation::clamp_len(&n, validation::NOTES_MAX)),
            rescheduled_from_id: None,
        });

        let notifications = self.booking_notice(&appointment, "appointment_booked", "Appointment confirmed");
        let created = self.appointments.insert(&appointment, notifications).await?;

        info!(
            "Appointment created: {} tenant {} at {}",
            created.id, created.tenant_id, created.start_at
        );
        Ok(created)
    }

    /// Operator/walk-in cancel. Authorization is proved by the exact match
    /// of id, tenant and canonical phone against a still-booked row.
    pub async fn cancel_by_phone(
        &self,
        appointment_id: &str,
        tenant_id: &str,
        phone_raw: &str,
    ) -> Result<CancelOutcome, AppError> {
        let phone = validation::sanitize_phone(phone_raw);
        let canceled = self
            .appointments
            .cancel_matching_phone(appointment_id, tenant_id, &phone)
            .await?;
        self.finish_cancel(appointment_id, canceled).await
    }

    /// Client self-service cancel, bound to the authenticated user id.
    pub async fn cancel_by_client(
        &self,
        appointment_id: &str,
        client_user_id: &str,
    ) -> Result<CancelOutcome, AppError> {
        let canceled = self
            .appointments
            .cancel_matching_client(appointment_id, client_user_id)
            .await?;
        self.finish_cancel(appointment_id, canceled).await
    }

    async fn finish_cancel(
        &self,
        appointment_id: &str,
        canceled: Option<Appointment>,
    ) -> Result<CancelOutcome, AppError> {
        let Some(appointment) = canceled else {
            return Ok(CancelOutcome {
                success: false,
                message: CANCEL_DENIED.to_string(),
            });
        };

        info!("Appointment canceled: {}", appointment_id);

        if let Some(user_id) = appointment.client_user_id.clone() {
            let notice = Notification::new(
                appointment.tenant_id.clone(),
                user_id,
                "appointment_canceled",
                "Appointment canceled",
                Some(format!("Your appointment at {} was canceled", appointment.start_at)),
            );
            if let Err(err) = self.notifications.create(&notice).await {
                warn!("Failed to record cancellation notification: {err}");
            }
        }

        Ok(CancelOutcome {
            success: true,
            message: CANCEL_OK.to_string(),
        })
    }

    /// Reschedule: insert a replacement appointment inheriting the client
    /// identity of the original and cancel the original, as one transaction.
    /// The replacement carries `rescheduled_from_id` back to the original.
    pub async fn reschedule(
        &self,
        tenant_id: &str,
        appointment_id: &str,
        new_start: DateTime<Utc>,
        service_id: Option<String>,
        staff_id: Option<String>,
    ) -> Result<Appointment, AppError> {
        let original = self
            .appointments
            .find_by_id(tenant_id, appointment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;

        if original.status != STATUS_BOOKED {
            return Err(AppError::Conflict("Appointment is no longer active".into()));
        }

        let service_id = service_id.unwrap_or_else(|| original.service_id.clone());
        let service = self
            .services
            .find_by_id(tenant_id, &service_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".into()))?;

        if new_start < Utc::now() {
            return Err(AppError::Validation("Cannot book in the past".into()));
        }

        let staff_id = staff_id.or_else(|| original.staff_id.clone());
        let new_end = new_start + Duration::minutes(service.duration_minutes as i64);

        // The original row still occupies its old window until the swap
        // commits, so it is excluded from both pre-checks.
        let overlapping = self
            .appointments
            .find_overlapping(
                tenant_id,
                staff_id.as_deref(),
                new_start,
                new_end,
                Some(appointment_id),
            )
            .await?;
        if !overlapping.is_empty() {
            return Err(AppError::Conflict("Time slot is no longer available".into()));
        }

        let local_day = new_start.with_timezone(&self.tz).date_naive();
        let same_day = self
            .appointments
            .count_booked_on_day(
                tenant_id,
                &original.client_phone,
                local_day,
                Some(appointment_id),
            )
            .await?;
        if same_day > 0 {
            return Err(AppError::Conflict(
                "Client already has an appointment on this day".into(),
            ));
        }

        let replacement = Appointment::new(NewAppointmentParams {
            tenant_id: tenant_id.to_string(),
            service_id,
            staff_id,
            client_user_id: original.client_user_id.clone(),
            start: new_start,
            duration_min: service.duration_minutes,
            appointment_date: local_day,
            first_name: original.client_first_name.clone(),
            last_name: original.client_last_name.clone(),
            phone: original.client_phone.clone(),
            notes: original.notes.clone(),
            rescheduled_from_id: Some(original.id.clone()),
        });

        let notifications =
            self.booking_notice(&replacement, "appointment_rescheduled", "Appointment rescheduled");
        let created = self
            .appointments
            .reschedule(&replacement, &original.id, notifications)
            .await?;

        info!(
            "Appointment rescheduled: {} -> {} tenant {}",
            original.id, created.id, tenant_id
        );
        Ok(created)
    }

    fn booking_notice(&self, appointment: &Appointment, kind: &str, title: &str) -> Vec<Notification> {
        appointment
            .client_user_id
            .clone()
            .map(|user_id| {
                let local = appointment.start_at.with_timezone(&self.tz);
                Notification::new(
                    appointment.tenant_id.clone(),
                    user_id,
                    kind,
                    title,
                    Some(local.format("%d/%m/%Y %H:%M").to_string()),
                )
            })
            .into_iter()
            .collect()
    }
}
