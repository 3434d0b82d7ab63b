use crate::config::Config;
use crate::domain::ports::{
    AppointmentRepository, AvailabilityRuleRepository, NotificationRepository, ServiceRepository,
    TenantRepository,
};
use crate::domain::services::booking::BookingService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tenant_repo: Arc<dyn TenantRepository>,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub rule_repo: Arc<dyn AvailabilityRuleRepository>,
    pub appointment_repo: Arc<dyn AppointmentRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub booking_service: Arc<BookingService>,
}
