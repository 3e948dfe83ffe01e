//! Rejection history — the append-only audit trail.
//!
//! One entry is written per rejection and never updated or deleted. The
//! upload fields snapshot the occurrence's evidence block as it was before
//! the rejection; the decision fields describe the rejection itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One rejection event. Survives deletion of its occurrence — there is no
/// cascade, matching the loose string-keyed schema of the rest of the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub history_id:    Uuid,
  pub occurrence_id: Uuid,
  /// Evidence path at the moment of rejection.
  pub evidence_path: Option<String>,
  pub uploaded_at:   Option<DateTime<Utc>>,
  pub uploader_name: Option<String>,
  pub reason:        String,
  pub rejected_at:   DateTime<Utc>,
  pub approver_name: String,
}
