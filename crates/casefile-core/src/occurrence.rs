//! Occurrence — one reported incident/compliance record.
//!
//! An occurrence is mutated in place; the only versioned aspect is the
//! rejection history (see [`crate::history`]). Reporter and creator are
//! identified by plain email strings, not foreign keys — deleting a user
//! leaves those references dangling on purpose.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review outcome recorded against the currently-attached evidence file.
/// Absent while no evidence exists or while a fresh upload awaits review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceStatus {
  Approved,
  Rejected,
}

/// The nullable evidence block of an occurrence. Kept as one struct so the
/// workflow can reset it wholesale on re-upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evidence {
  /// Path of the uploaded PDF, relative to the configured evidence
  /// directory. No binary data lives in the database.
  pub path:          Option<String>,
  pub status:        Option<EvidenceStatus>,
  pub reason:        Option<String>,
  /// When the approver last approved or rejected.
  pub decided_at:    Option<DateTime<Utc>>,
  /// When the current file was uploaded.
  pub uploaded_at:   Option<DateTime<Utc>>,
  pub uploader_name: Option<String>,
  pub approver_name: Option<String>,
}

/// A reported occurrence with due date and optional evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occurrence {
  pub occurrence_id:  Uuid,
  /// Case reference — free text, grouped on by the dashboard.
  pub cr:             String,
  pub description:    String,
  /// Category, grouped on by the dashboard.
  pub origin:         String,
  pub action:         String,
  pub start_date:     DateTime<Utc>,
  pub due_date:       DateTime<Utc>,
  /// Email of the person the occurrence is reported against/for.
  pub reporter_email: String,
  pub creator_email:  String,
  pub creator_name:   String,
  pub created_at:     DateTime<Utc>,
  #[serde(flatten)]
  pub evidence:       Evidence,
}

/// Input to [`crate::store::CaseStore::create_occurrence`]. The store assigns
/// id and creation timestamp; creator fields come from the caller identity.
#[derive(Debug, Clone)]
pub struct NewOccurrence {
  pub cr:             String,
  pub description:    String,
  pub origin:         String,
  pub action:         String,
  pub start_date:     DateTime<Utc>,
  pub due_date:       DateTime<Utc>,
  pub reporter_email: String,
  pub creator_email:  String,
  pub creator_name:   String,
  /// Evidence attached at creation time, if the submitter included a PDF.
  pub evidence_path:  Option<String>,
}

/// Update to the data fields of an occurrence. Evidence fields are never
/// touched through this path; they move only via the workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct OccurrencePatch {
  pub cr:             String,
  pub description:    String,
  pub origin:         String,
  pub action:         String,
  pub start_date:     DateTime<Utc>,
  pub due_date:       DateTime<Utc>,
  pub reporter_email: String,
}
