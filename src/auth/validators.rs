//! Validation for credential payloads

use super::models::{LoginRequest, RegisterRequest};
use crate::common::{ValidationResult, Validator};

/// Firebase refuses passwords shorter than this
pub const MIN_PASSWORD_LEN: usize = 6;

/// Cheap shape check; the provider remains the authority on email validity.
pub fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

pub struct RegisterValidator;

impl Validator<RegisterRequest> for RegisterValidator {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !is_plausible_email(&data.email) {
            result.add_error("email", "must be a valid email address");
        }
        if data.password.chars().count() < MIN_PASSWORD_LEN {
            result.add_error("password", "must be at least 6 characters");
        }
        if let Some(name) = &data.display_name {
            if name.trim().is_empty() {
                result.add_error("display_name", "must not be blank when provided");
            }
        }

        result
    }
}

pub struct LoginValidator;

impl Validator<LoginRequest> for LoginValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.email.trim().is_empty() {
            result.add_error("email", "is required");
        }
        if data.password.is_empty() {
            result.add_error("password", "is required");
        }

        result
    }
}
