// tithe/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TitheError {
  #[error("Order not found: {order_id}")]
  NotFound { order_id: String },

  #[error("Invalid order request: {0}")]
  InvalidOrder(String),

  #[error("Upstream service '{service}' unavailable. Source: {source}")]
  UpstreamUnavailable {
    service: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Receipt notification could not be delivered. Source: {source}")]
  Notification {
    #[source]
    source: AnyhowError,
  },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Internal tithe error: {0}")]
  Internal(String),
}

impl TitheError {
  /// Wraps a failed call to an external collaborator.
  pub fn upstream(service: impl Into<String>, source: impl Into<AnyhowError>) -> Self {
    TitheError::UpstreamUnavailable {
      service: service.into(),
      source: source.into(),
    }
  }

  pub fn notification(source: impl Into<AnyhowError>) -> Self {
    TitheError::Notification { source: source.into() }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, TitheError::NotFound { .. })
  }
}

pub type TitheResult<T, E = TitheError> = std::result::Result<T, E>;
