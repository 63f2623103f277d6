//! Authentication response DTOs

use serde::Serialize;

use crate::models::User;

/// Issued token plus the user it belongs to
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthResponse {
    pub fn bearer(user: User, access_token: String, expires_in: i64) -> Self {
        Self {
            user,
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}
