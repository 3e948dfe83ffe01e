//! Error type for `casefile-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("decode error: {0}")]
  Decode(String),

  #[error("user not found: {0}")]
  UserNotFound(uuid::Uuid),

  #[error("occurrence not found: {0}")]
  OccurrenceNotFound(uuid::Uuid),

  #[error("email already registered: {0}")]
  DuplicateEmail(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
