use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Standard envelope: `{ success, message, statusCode, data }`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self::with_status(message, data, StatusCode::OK)
    }

    pub fn with_status(message: impl Into<String>, data: T, status_code: StatusCode) -> Self {
        Self {
            success: status_code.is_success(),
            message: message.into(),
            data,
            status_code,
        }
    }

    /// 200 OK with `success: false`, for refusals that are not HTTP errors
    pub fn refused(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            ..Self::success(message, data)
        }
    }

    /// 404 envelope that still carries `data`
    pub fn not_found(message: impl Into<String>, data: T) -> Self {
        Self::with_status(message, data, StatusCode::NOT_FOUND)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Failed to serialize response data",
                        "statusCode": 500,
                        "data": null
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "success": self.success,
            "message": self.message,
            "statusCode": self.status_code.as_u16(),
            "data": data_value
        });

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
