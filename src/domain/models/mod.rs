pub mod appointment;
pub mod availability_rule;
pub mod notification;
pub mod service;
pub mod tenant;
