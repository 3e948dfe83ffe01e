//! Error types for `casefile-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("occurrence not found: {0}")]
  OccurrenceNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("email already registered: {0}")]
  DuplicateEmail(String),

  #[error("occurrence {0} has no evidence attached")]
  NoEvidence(Uuid),

  #[error("occurrence {0} is not pending approval")]
  NotPendingApproval(Uuid),

  #[error("a rejection reason is required")]
  MissingReason,

  #[error("rejection reason exceeds {max} characters")]
  ReasonTooLong { max: usize },

  #[error("caller is not an administrator")]
  Forbidden,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
