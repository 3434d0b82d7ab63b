pub mod sqlite_appointment_repo;
pub mod sqlite_notification_repo;
pub mod sqlite_rule_repo;
pub mod sqlite_service_repo;
pub mod sqlite_tenant_repo;

pub mod postgres_appointment_repo;
pub mod postgres_notification_repo;
pub mod postgres_rule_repo;
pub mod postgres_service_repo;
pub mod postgres_tenant_repo;
