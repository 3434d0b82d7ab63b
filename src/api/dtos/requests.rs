use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub slug: String,
}

#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub duration_minutes: i32,
    pub sort_order: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub duration_minutes: Option<i32>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Deserialize)]
pub struct CreateRuleRequest {
    pub weekday: i32,
    pub start_time: String,
    pub end_time: String,
    pub slot_minutes: i32,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateRuleRequest {
    pub weekday: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub slot_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
    pub service_id: Option<String>,
    pub duration: Option<i32>,
    pub staff_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub service_id: String,
    pub date: String,
    pub time: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub notes: Option<String>,
    pub staff_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CancelAppointmentRequest {
    pub phone: String,
}

#[derive(Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub date: String,
    pub time: String,
    pub service_id: Option<String>,
    pub staff_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AgendaQuery {
    pub date: Option<String>,
}

#[derive(Deserialize)]
pub struct PhoneQuery {
    pub phone: String,
}
