pub mod appointment;
pub mod availability_rule;
pub mod health;
pub mod notification;
pub mod service;
pub mod slots;
pub mod tenant;
