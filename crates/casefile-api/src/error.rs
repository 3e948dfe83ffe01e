//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Every failure aborts the single request; nothing is retried
/// automatically. Validation errors never leave a partial write behind.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("missing or invalid credentials")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("upload exceeds the size limit")]
  PayloadTooLarge,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error. File-write failures also land here: they
  /// propagate as a generic failure rather than silently succeeding with a
  /// missing file.
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

/// Domain errors carry their own HTTP mapping: policy failures are 403,
/// workflow validation failures are 400, lookups are 404.
impl From<casefile_core::Error> for ApiError {
  fn from(e: casefile_core::Error) -> Self {
    use casefile_core::Error as Core;
    match e {
      Core::Forbidden => Self::Forbidden(e.to_string()),
      Core::OccurrenceNotFound(_) | Core::UserNotFound(_) => {
        Self::NotFound(e.to_string())
      }
      Core::MissingReason
      | Core::ReasonTooLong { .. }
      | Core::NoEvidence(_)
      | Core::NotPendingApproval(_)
      | Core::DuplicateEmail(_) => Self::BadRequest(e.to_string()),
      Core::Serialization(_) => Self::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized => {
        // Challenge so interactive clients prompt for credentials.
        return (
          StatusCode::UNAUTHORIZED,
          [(header::WWW_AUTHENTICATE, "Basic realm=\"casefile\"")],
          Json(json!({ "error": self.to_string() })),
        )
          .into_response();
      }
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::PayloadTooLarge => {
        (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "request failed on the storage layer");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
