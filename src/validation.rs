use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date, OffsetDateTime, Time};
use uuid::{Uuid, Variant};

use crate::{error::AppError, model::Role};

/// Parses and checks an identifier. Anything that is not a non-nil RFC 4122
/// version 4 UUID is treated as a forged access attempt.
pub fn validate_identifier(raw: &str) -> Result<Uuid, AppError> {
    let id = Uuid::parse_str(raw).map_err(|_| AppError::AccessDenied)?;
    validate_uuid(id)
}

pub fn validate_uuid(id: Uuid) -> Result<Uuid, AppError> {
    if id.is_nil() || id.get_version_num() != 4 || id.get_variant() != Variant::RFC4122 {
        return Err(AppError::AccessDenied);
    }
    Ok(id)
}

pub fn validate_role(raw: &str) -> Result<Role, AppError> {
    Role::parse(raw).ok_or(AppError::InvalidRole)
}

/// Permission check for an already validated role.
pub fn require_role(role: Role, required: Role) -> Result<(), AppError> {
    if role == required {
        Ok(())
    } else {
        tracing::warn!(
            required_role = required.as_str(),
            user_role = role.as_str(),
            "access denied"
        );
        Err(AppError::AccessDenied)
    }
}

pub fn validate_email(email: &str) -> Result<&str, AppError> {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    }
    if EMAIL_RE.is_match(email) {
        Ok(email)
    } else {
        Err(AppError::InvalidEmail)
    }
}

pub fn validate_password(password: &str) -> Result<&str, AppError> {
    if (8..=50).contains(&password.len()) {
        Ok(password)
    } else {
        Err(AppError::InvalidPassword)
    }
}

fn parse_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::InvalidRequest)
}

/// `YYYY-MM-DD` at 00:00:00 UTC.
pub fn start_of_day(raw: &str) -> Result<OffsetDateTime, AppError> {
    Ok(parse_date(raw)?.with_time(Time::MIDNIGHT).assume_utc())
}

/// `YYYY-MM-DD` at 23:59:59 UTC.
pub fn end_of_day(raw: &str) -> Result<OffsetDateTime, AppError> {
    let end = Time::from_hms(23, 59, 59).map_err(|_| AppError::InvalidRequest)?;
    Ok(parse_date(raw)?.with_time(end).assume_utc())
}
