//! Registration response DTOs

use serde::Serialize;

/// Check-in code for a registration
#[derive(Debug, Serialize)]
pub struct CheckInCodeResponse {
    pub registration_id: i64,
    pub qr_code: String,
}
