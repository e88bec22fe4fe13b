//! HTTP mapping of domain errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tradedesk_core::{FieldError, TradeError, ValidationErrors};

#[derive(Debug)]
pub struct AppError(pub TradeError);

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self(TradeError::NotFound(what.into()))
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(TradeError::InvalidInput(msg.into()))
    }

    /// Form-level failures gathered before any service call.
    pub fn form(errors: ValidationErrors) -> Self {
        Self(TradeError::Validation(errors))
    }
}

impl From<TradeError> for AppError {
    fn from(e: TradeError) -> Self {
        Self(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = match self.0 {
            TradeError::Validation(errors) => ErrorBody {
                error: "validation failed".to_string(),
                errors: Some(errors.into_vec()),
            },
            TradeError::Internal(e) => {
                tracing::error!("request failed: {:#}", e);
                ErrorBody {
                    error: "internal server error".to_string(),
                    errors: None,
                }
            }
            other => ErrorBody {
                error: other.to_string(),
                errors: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
