//! Success envelope shared by every endpoint
//!
//! Errors use the same shape through `AppError`'s `IntoResponse`.

use super::extract::Json;
use serde::Serialize;

/// `{success, data?, message?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        })
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: Some(message.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_envelope_omits_empty_fields() {
        let Json(body) = ApiResponse::data(vec![1, 2]);
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_message_envelope() {
        let Json(body) = ApiResponse::message("Registration cancelled successfully");
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["message"], "Registration cancelled successfully");
        assert!(json.get("data").is_none());
    }
}
