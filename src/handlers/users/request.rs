//! User management request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_NAME_LENGTH, MAX_PHONE_LENGTH};
use crate::error::{AppError, AppResult};
use crate::utils::validation::{PERSON_NAME_REGEX, PHONE_REGEX, validate_password_strength};

/// Admin-created account with an explicit role
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
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

    #[validate(
        length(max = MAX_PHONE_LENGTH),
        regex(path = *PHONE_REGEX, message = "Phone number must be a valid Russian number")
    )]
    pub phone: Option<String>,

    #[validate(length(max = 100))]
    pub telegram_id: Option<String>,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    pub password_confirmation: String,

    pub role_id: i32,

    pub group_id: Option<i32>,

    pub is_active: Option<bool>,
}

impl CreateUserRequest {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        if self.password != self.password_confirmation {
            return Err(AppError::field(
                "password_confirmation",
                "Password confirmation does not match",
            ));
        }
        Ok(())
    }
}

/// Partial user update; role and activity are admin-only
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
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

    #[validate(email(message = "Invalid email format"), length(max = MAX_NAME_LENGTH))]
    pub email: Option<String>,

    #[validate(
        length(max = MAX_PHONE_LENGTH),
        regex(path = *PHONE_REGEX, message = "Phone number must be a valid Russian number")
    )]
    pub phone: Option<String>,

    #[validate(length(max = 100))]
    pub telegram_id: Option<String>,

    pub role_id: Option<i32>,

    pub group_id: Option<i32>,

    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    /// Whether the payload touches fields only admins may change
    pub fn touches_admin_fields(&self) -> bool {
        self.role_id.is_some() || self.is_active.is_some()
    }
}

/// Query parameters for the user index
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub role_id: Option<i32>,
    pub group_id: Option<i32>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> CreateUserRequest {
        CreateUserRequest {
            first_name: "Anna".into(),
            last_name: "Petrova".into(),
            email: "anna@college.edu".into(),
            phone: None,
            telegram_id: Some("@anna".into()),
            password: "Organ1zer!".into(),
            password_confirmation: "Organ1zer!".into(),
            role_id: 2,
            group_id: None,
            is_active: None,
        }
    }

    #[test]
    fn test_valid_create_request() {
        assert!(create().check().is_ok());
    }

    #[test]
    fn test_create_rejects_bad_email_and_phone() {
        let mut request = create();
        request.email = "anna-at-college".into();
        request.phone = Some("12345".into());
        match request.check() {
            Err(AppError::Validation(errors)) => {
                assert!(errors.contains_key("email"));
                assert!(errors.contains_key("phone"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_admin_only_fields() {
        let request = UpdateUserRequest {
            first_name: Some("Anya".into()),
            ..Default::default()
        };
        assert!(!request.touches_admin_fields());

        let request = UpdateUserRequest {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(request.touches_admin_fields());
    }
}
