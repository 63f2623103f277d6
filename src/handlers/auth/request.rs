//! Authentication request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_NAME_LENGTH, MAX_PHONE_LENGTH};
use crate::error::{AppError, AppResult};
use crate::utils::validation::{PERSON_NAME_REGEX, PHONE_REGEX, validate_password_strength};

/// Self-registration; always creates a student account
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH, message = "First name is required"),
        regex(path = *PERSON_NAME_REGEX, message = "First name may contain only letters, spaces and hyphens")
    )]
    pub first_name: String,

    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH, message = "Last name is required"),
        regex(path = *PERSON_NAME_REGEX, message = "Last name may contain only letters, spaces and hyphens")
    )]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"), length(max = MAX_NAME_LENGTH))]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    pub password_confirmation: String,

    #[validate(
        length(max = MAX_PHONE_LENGTH),
        regex(path = *PHONE_REGEX, message = "Phone number must be a valid Russian number")
    )]
    pub phone: Option<String>,

    #[validate(length(max = 100))]
    pub telegram_id: Option<String>,

    #[validate(required(message = "Group is required for students"))]
    pub group_id: Option<i32>,
}

impl RegisterRequest {
    /// Field-level validation plus the password confirmation check
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        ensure_confirmed(&self.password, &self.password_confirmation)
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Own-profile update; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH),
        regex(path = *PERSON_NAME_REGEX, message = "First name may contain only letters, spaces and hyphens")
    )]
    pub first_name: Option<String>,

    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH),
        regex(path = *PERSON_NAME_REGEX, message = "Last name may contain only letters, spaces and hyphens")
    )]
    pub last_name: Option<String>,

    #[validate(
        length(max = MAX_PHONE_LENGTH),
        regex(path = *PHONE_REGEX, message = "Phone number must be a valid Russian number")
    )]
    pub phone: Option<String>,

    #[validate(length(max = 100))]
    pub telegram_id: Option<String>,

    pub group_id: Option<i32>,
}

/// Password change; `current_password` is required for the own account
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    pub password_confirmation: String,
}

impl ChangePasswordRequest {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        ensure_confirmed(&self.password, &self.password_confirmation)
    }
}

fn ensure_confirmed(password: &str, confirmation: &str) -> AppResult<()> {
    if password != confirmation {
        return Err(AppError::field(
            "password_confirmation",
            "Password confirmation does not match",
        ));
    }
    Ok(())
}
