// tithe-server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tithe::TitheError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Payment Core Error: {source}")]
  Core {
    #[from]
    source: TitheError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError::Internal(err.to_string())
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Core { source } => match source {
        TitheError::InvalidOrder(_) => StatusCode::BAD_REQUEST,
        TitheError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    let body = match self {
      AppError::Validation(m) => json!({"error": m}),
      AppError::Config(_) => json!({"error": "Configuration issue"}),
      AppError::Core { source } => match source {
        TitheError::InvalidOrder(m) => json!({"error": m}),
        TitheError::NotFound { order_id } => json!({"error": "Order not found", "detail": order_id}),
        TitheError::UpstreamUnavailable { service, .. } => {
          json!({"error": "Payment provider error", "detail": format!("{} request failed", service)})
        }
        other => json!({"error": "An internal error occurred", "detail": other.to_string()}),
      },
      AppError::Internal(_) => json!({"error": "An internal error occurred"}),
    };
    HttpResponse::build(self.status_code()).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
