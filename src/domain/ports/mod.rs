use crate::domain::models::{
    appointment::Appointment, availability_rule::AvailabilityRule, notification::Notification,
    service::Service, tenant::Tenant,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, tenant: &Tenant) -> Result<Tenant, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &Service) -> Result<Service, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Service>, AppError>;
    async fn list_active(&self, tenant_id: &str) -> Result<Vec<Service>, AppError>;
    async fn update(&self, service: &Service) -> Result<Service, AppError>;
    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AvailabilityRuleRepository: Send + Sync {
    async fn create(&self, rule: &AvailabilityRule) -> Result<AvailabilityRule, AppError>;
    async fn find_by_id(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> Result<Option<AvailabilityRule>, AppError>;
    async fn list(&self, tenant_id: &str) -> Result<Vec<AvailabilityRule>, AppError>;
    async fn list_active_for_weekday(
        &self,
        tenant_id: &str,
        weekday: i32,
    ) -> Result<Vec<AvailabilityRule>, AppError>;
    async fn update(&self, rule: &AvailabilityRule) -> Result<AvailabilityRule, AppError>;
    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Inserts the appointment and any notifications in one transaction.
    /// The database constraints (overlap exclusion, per-day uniqueness) make
    /// this call the authoritative conflict gate; violations surface as
    /// conflict errors.
    async fn insert(
        &self,
        appointment: &Appointment,
        notifications: Vec<Notification>,
    ) -> Result<Appointment, AppError>;
    async fn find_by_id(&self, tenant_id: &str, id: &str)
        -> Result<Option<Appointment>, AppError>;
    /// Booked appointments whose start falls inside `[start, end)`.
    async fn list_booked_in_range(
        &self,
        tenant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppError>;
    async fn list_by_tenant(
        &self,
        tenant_id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Appointment>, AppError>;
    /// Exact canonical-phone match only; substring matching is forbidden.
    async fn list_by_phone(
        &self,
        tenant_id: &str,
        phone: &str,
    ) -> Result<Vec<Appointment>, AppError>;
    async fn list_by_client(&self, client_user_id: &str) -> Result<Vec<Appointment>, AppError>;
    /// Booked appointments overlapping `[start, end)` under the staff scope:
    /// unscoped queries conflict with every row, scoped queries only with
    /// rows assigned to the same staff member (unassigned rows are treated
    /// as non-conflicting under a scope).
    async fn find_overlapping(
        &self,
        tenant_id: &str,
        staff_id: Option<&str>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Appointment>, AppError>;
    async fn count_booked_on_day(
        &self,
        tenant_id: &str,
        phone: &str,
        day: NaiveDate,
        exclude_id: Option<&str>,
    ) -> Result<i64, AppError>;
    /// Soft-cancels iff id, tenant and canonical phone all match a row that
    /// is still booked. Returns None when no row matched, without revealing
    /// which predicate failed.
    async fn cancel_matching_phone(
        &self,
        id: &str,
        tenant_id: &str,
        phone: &str,
    ) -> Result<Option<Appointment>, AppError>;
    async fn cancel_matching_client(
        &self,
        id: &str,
        client_user_id: &str,
    ) -> Result<Option<Appointment>, AppError>;
    /// Cancels the original and inserts its replacement in one transaction.
    async fn reschedule(
        &self,
        replacement: &Appointment,
        original_id: &str,
        notifications: Vec<Notification>,
    ) -> Result<Appointment, AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError>;
    async fn list_for_user(&self, user_id: &str, limit: i64)
        -> Result<Vec<Notification>, AppError>;
    async fn mark_read(&self, id: &str, user_id: &str) -> Result<Option<Notification>, AppError>;
    async fn mark_all_read(&self, user_id: &str) -> Result<(), AppError>;
}
