//! Field validation for request payloads.
//!
//! Each function checks one field and maps straight onto one error
//! variant, so handlers can chain them with `?` in the order the
//! endpoint documents.

use chrono::NaiveDate;

use crate::error::ApiError;

pub const TITLE_MAX: usize = 500;
pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 8;
pub const PRIORITY_MIN: i64 = 1;
pub const PRIORITY_MAX: i64 = 999_999;

/// Title must be 1..=500 characters.
pub fn validate_title(title: &str) -> Result<(), ApiError> {
    let len = title.chars().count();
    if len < 1 || len > TITLE_MAX {
        return Err(ApiError::InvalidTitle);
    }
    Ok(())
}

/// Simplified RFC 5322 shape: `local@host.tld` where the local part is
/// `[A-Za-z0-9._%+-]+`, the host is `[A-Za-z0-9.-]+`, and the TLD is at
/// least two ASCII letters.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ApiError::InvalidEmail);
    };
    let local_ok = !local.is_empty()
        && local
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'%' | b'+' | b'-'));
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return Err(ApiError::InvalidEmail);
    };
    let host_ok = !host.is_empty()
        && host
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-'));
    let tld_ok = tld.len() >= 2 && tld.bytes().all(|b| b.is_ascii_alphabetic());
    if local_ok && host_ok && tld_ok {
        Ok(())
    } else {
        Err(ApiError::InvalidEmail)
    }
}

/// At least 8 characters with one letter, one digit, and one special
/// character. The failing rule is reported in the message.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    const SPECIALS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";
    if password.chars().count() < PASSWORD_MIN {
        return Err(ApiError::InvalidPassword(
            "Password must be at least 8 characters long",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::InvalidPassword(
            "Password must contain at least one letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::InvalidPassword(
            "Password must contain at least one number",
        ));
    }
    if !password.chars().any(|c| SPECIALS.contains(c)) {
        return Err(ApiError::InvalidPassword(
            "Password must contain at least one special character",
        ));
    }
    Ok(())
}

/// Display name must be 2..=50 characters.
pub fn validate_name(name: &str) -> Result<(), ApiError> {
    let len = name.chars().count();
    if len < NAME_MIN || len > NAME_MAX {
        return Err(ApiError::InvalidName);
    }
    Ok(())
}

/// Dates travel as `YYYY-MM-DD` strings. The shape check runs first so
/// `2025/11/26` reports a format error, then the calendar check rejects
/// dates like `2025-02-30`.
pub fn validate_date(value: &str) -> Result<(), ApiError> {
    if !is_iso_date_shape(value) {
        return Err(ApiError::InvalidDate("Date must be in YYYY-MM-DD format"));
    }
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err(ApiError::InvalidDate("Invalid date"));
    }
    Ok(())
}

fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit())
}

/// Both arguments must already be valid `YYYY-MM-DD` strings; in that
/// canonical form lexicographic order is date order.
pub fn validate_date_range(start: &str, end: &str) -> Result<(), ApiError> {
    if start > end {
        return Err(ApiError::InvalidDateRange);
    }
    Ok(())
}

/// Priority must be an integer in 1..=999999.
pub fn validate_priority(priority: i64) -> Result<(), ApiError> {
    if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&priority) {
        return Err(ApiError::InvalidPriority);
    }
    Ok(())
}
