//! Input validation for the login and signup forms.
//!
//! Each check returns the first violated rule's message; nothing is
//! aggregated across fields.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating email addresses
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();
}

/// Validate a display name. Surrounding whitespace does not count.
pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name is required".to_string());
    }

    if trimmed.len() > 100 {
        return Err("Name is too long (max 100 characters)".to_string());
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Email must be a valid email address".to_string());
    }

    Ok(())
}

/// Validate a password. The upper bound matches what bcrypt will actually
/// digest; anything longer would be silently truncated.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 6 {
        return Err("Password must be at least 6 characters".to_string());
    }

    if password.len() > 72 {
        return Err("Password is too long (max 72 characters)".to_string());
    }

    Ok(())
}

/// Validate the signup form, fields in form order, first failure wins.
pub fn validate_signup(name: &str, email: &str, password: &str) -> Result<(), String> {
    validate_name(name)?;
    validate_email(email)?;
    validate_password(password)
}

/// Validate the login form.
pub fn validate_login(email: &str, password: &str) -> Result<(), String> {
    validate_email(email)?;
    validate_password(password)
}
