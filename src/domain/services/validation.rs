use crate::error::AppError;
use std::collections::BTreeMap;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 60;
pub const PHONE_MIN: usize = 10;
pub const PHONE_MAX: usize = 15;
pub const NOTES_MAX: usize = 200;

/// Reduces a phone number to its canonical digits-only form. Every
/// comparison and every stored value uses this form; mixing canonical and
/// raw phones breaks both the per-day gate and cancel authorization.
pub fn sanitize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn is_valid_phone(raw: &str) -> bool {
    let digits = sanitize_phone(raw);
    (PHONE_MIN..=PHONE_MAX).contains(&digits.len())
}

/// Letters (any Unicode script), spaces and hyphens, trimmed length 2-60.
pub fn is_valid_name(name: &str) -> bool {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return false;
    }
    trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || c == '-')
}

pub fn clamp_len(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub struct AppointmentForm<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
    pub notes: Option<&'a str>,
}

/// Validates all client-supplied fields at once, aggregating failures into
/// a per-field error map so the caller can surface every problem in one
/// round-trip.
pub fn validate_appointment_form(form: &AppointmentForm<'_>) -> Result<(), AppError> {
    let mut errors = BTreeMap::new();

    if !is_valid_name(form.first_name) {
        errors.insert(
            "first_name".to_string(),
            format!("First name must be {NAME_MIN}-{NAME_MAX} letters, spaces or hyphens"),
        );
    }
    if !is_valid_name(form.last_name) {
        errors.insert(
            "last_name".to_string(),
            format!("Last name must be {NAME_MIN}-{NAME_MAX} letters, spaces or hyphens"),
        );
    }
    if !is_valid_phone(form.phone) {
        errors.insert(
            "phone".to_string(),
            format!("Phone must have between {PHONE_MIN} and {PHONE_MAX} digits"),
        );
    }
    if let Some(notes) = form.notes {
        if notes.chars().count() > NOTES_MAX {
            errors.insert(
                "notes".to_string(),
                format!("Notes cannot exceed {NOTES_MAX} characters"),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::FieldValidation(errors))
    }
}
