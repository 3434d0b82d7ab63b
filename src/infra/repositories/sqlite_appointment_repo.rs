use crate::domain::models::appointment::Appointment;
use crate::domain::models::notification::Notification;
use crate::domain::ports::AppointmentRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool, Sqlite, Transaction};

pub struct SqliteAppointmentRepo {
    pool: SqlitePool,
}

impl SqliteAppointmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_row(
        tx: &mut Transaction<'_, Sqlite>,
        appointment: &Appointment,
    ) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments (id, tenant_id, service_id, staff_id, client_user_id,
                 start_at, end_at, appointment_date, status, canceled_at, rescheduled_from_id,
                 client_first_name, client_last_name, client_phone, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&appointment.id)
        .bind(&appointment.tenant_id)
        .bind(&appointment.service_id)
        .bind(&appointment.staff_id)
        .bind(&appointment.client_user_id)
        .bind(appointment.start_at)
        .bind(appointment.end_at)
        .bind(appointment.appointment_date)
        .bind(&appointment.status)
        .bind(appointment.canceled_at)
        .bind(&appointment.rescheduled_from_id)
        .bind(&appointment.client_first_name)
        .bind(&appointment.client_last_name)
        .bind(&appointment.client_phone)
        .bind(&appointment.notes)
        .bind(appointment.created_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::Database)
    }

    /// SQLite has no exclusion constraints, so the overlap invariant is
    /// re-verified inside the write transaction after the row is in. WAL
    /// mode serializes writers, making this recheck see any competing row
    /// that committed first.
    async fn verify_no_overlap(
        tx: &mut Transaction<'_, Sqlite>,
        appointment: &Appointment,
    ) -> Result<(), AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS conflicts FROM appointments
             WHERE tenant_id = ? AND status = 'booked' AND id <> ?
               AND start_at < ? AND end_at > ?
               AND (? IS NULL OR staff_id = ?)",
        )
        .bind(&appointment.tenant_id)
        .bind(&appointment.id)
        .bind(appointment.end_at)
        .bind(appointment.start_at)
        .bind(&appointment.staff_id)
        .bind(&appointment.staff_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::Database)?;

        if row.get::<i64, _>("conflicts") > 0 {
            return Err(AppError::Conflict("Time slot is no longer available".into()));
        }
        Ok(())
    }

    async fn insert_notifications(
        tx: &mut Transaction<'_, Sqlite>,
        notifications: &[Notification],
    ) -> Result<(), AppError> {
        for notification in notifications {
            sqlx::query(
                "INSERT INTO notifications (id, tenant_id, user_id, kind, title, body, read_at, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&notification.id)
            .bind(&notification.tenant_id)
            .bind(&notification.user_id)
            .bind(&notification.kind)
            .bind(&notification.title)
            .bind(&notification.body)
            .bind(notification.read_at)
            .bind(notification.created_at)
            .execute(&mut **tx)
            .await
            .map_err(AppError::Database)?;
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepo {
    async fn insert(
        &self,
        appointment: &Appointment,
        notifications: Vec<Notification>,
    ) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = Self::insert_row(&mut tx, appointment).await?;
        Self::verify_no_overlap(&mut tx, &created).await?;
        Self::insert_notifications(&mut tx, &notifications).await?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE tenant_id = ? AND id = ?",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_booked_in_range(
        &self,
        tenant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments
             WHERE tenant_id = ? AND status = 'booked' AND start_at >= ? AND start_at < ?
             ORDER BY start_at ASC",
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_by_tenant(
        &self,
        tenant_id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Appointment>, AppError> {
        let (start, end) = match range {
            Some((s, e)) => (Some(s), Some(e)),
            None => (None, None),
        };
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments
             WHERE tenant_id = ?
               AND (? IS NULL OR start_at >= ?)
               AND (? IS NULL OR start_at < ?)
             ORDER BY start_at ASC",
        )
        .bind(tenant_id)
        .bind(start)
        .bind(start)
        .bind(end)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_by_phone(
        &self,
        tenant_id: &str,
        phone: &str,
    ) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments
             WHERE tenant_id = ? AND client_phone = ?
             ORDER BY start_at DESC",
        )
        .bind(tenant_id)
        .bind(phone)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_by_client(&self, client_user_id: &str) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE client_user_id = ? ORDER BY start_at DESC",
        )
        .bind(client_user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_overlapping(
        &self,
        tenant_id: &str,
        staff_id: Option<&str>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments
             WHERE tenant_id = ? AND status = 'booked'
               AND start_at < ? AND end_at > ?
               AND (? IS NULL OR staff_id = ?)
               AND (? IS NULL OR id <> ?)",
        )
        .bind(tenant_id)
        .bind(end)
        .bind(start)
        .bind(staff_id)
        .bind(staff_id)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn count_booked_on_day(
        &self,
        tenant_id: &str,
        phone: &str,
        day: NaiveDate,
        exclude_id: Option<&str>,
    ) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM appointments
             WHERE tenant_id = ? AND client_phone = ? AND status = 'booked'
               AND appointment_date = ?
               AND (? IS NULL OR id <> ?)",
        )
        .bind(tenant_id)
        .bind(phone)
        .bind(day)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count"))
    }

    async fn cancel_matching_phone(
        &self,
        id: &str,
        tenant_id: &str,
        phone: &str,
    ) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status = 'canceled', canceled_at = ?
             WHERE id = ? AND tenant_id = ? AND client_phone = ? AND status = 'booked'
             RETURNING *",
        )
        .bind(Utc::now())
        .bind(id)
        .bind(tenant_id)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn cancel_matching_client(
        &self,
        id: &str,
        client_user_id: &str,
    ) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status = 'canceled', canceled_at = ?
             WHERE id = ? AND client_user_id = ? AND status = 'booked'
             RETURNING *",
        )
        .bind(Utc::now())
        .bind(id)
        .bind(client_user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn reschedule(
        &self,
        replacement: &Appointment,
        original_id: &str,
        notifications: Vec<Notification>,
    ) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Cancel first so the replacement cannot collide with the row it
        // replaces under the partial unique indexes.
        let canceled = sqlx::query(
            "UPDATE appointments SET status = 'canceled', canceled_at = ?
             WHERE id = ? AND tenant_id = ? AND status = 'booked'",
        )
        .bind(Utc::now())
        .bind(original_id)
        .bind(&replacement.tenant_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if canceled.rows_affected() == 0 {
            return Err(AppError::Conflict("Appointment is no longer active".into()));
        }

        let created = Self::insert_row(&mut tx, replacement).await?;
        Self::verify_no_overlap(&mut tx, &created).await?;
        Self::insert_notifications(&mut tx, &notifications).await?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }
}
