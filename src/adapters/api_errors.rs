use crate::domain::error::DonationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Newtype over the domain error so the HTTP mapping lives in the adapter
/// layer, not in the domain.
pub struct ApiError(pub DonationError);

impl From<DonationError> for ApiError {
    fn from(err: DonationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self.0 {
            DonationError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            DonationError::GatewayRejected(msg) => {
                (StatusCode::BAD_REQUEST, "gateway_rejected", msg.clone())
            }
            DonationError::Signature(msg) => {
                // Deliberately uniform: the response must not reveal
                // whether any referenced record exists.
                tracing::warn!("webhook signature rejected: {msg}");
                (
                    StatusCode::BAD_REQUEST,
                    "signature_invalid",
                    "invalid webhook signature".to_string(),
                )
            }
            DonationError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            DonationError::Gateway(msg) => {
                tracing::error!("gateway unavailable: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "gateway_unavailable",
                    "payment gateway unavailable, retry later".to_string(),
                )
            }
            DonationError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
            DonationError::Database(err) => {
                tracing::error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
            DonationError::Serialization(err) => {
                tracing::error!("serialization error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error_code": error_code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
