//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enum-like fields
//! (UserType, Approval, EvidenceStatus) are stored as lowercase words.
//! UUIDs are stored as hyphenated lowercase strings.

use casefile_core::{
  history::HistoryEntry,
  occurrence::{Evidence, EvidenceStatus, Occurrence},
  user::{Approval, User, UserType},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── UserType ─────────────────────────────────────────────────────────────────

pub fn encode_user_type(t: UserType) -> &'static str {
  match t {
    UserType::Standard => "standard",
    UserType::Plus => "plus",
    UserType::Admin => "admin",
  }
}

pub fn decode_user_type(s: &str) -> Result<UserType> {
  match s {
    "standard" => Ok(UserType::Standard),
    "plus" => Ok(UserType::Plus),
    "admin" => Ok(UserType::Admin),
    other => Err(Error::Decode(format!("unknown user type: {other:?}"))),
  }
}

// ─── Approval ─────────────────────────────────────────────────────────────────

pub fn encode_approval(a: Approval) -> &'static str {
  match a {
    Approval::Yes => "yes",
    Approval::No => "no",
  }
}

pub fn decode_approval(s: &str) -> Result<Approval> {
  match s {
    "yes" => Ok(Approval::Yes),
    "no" => Ok(Approval::No),
    other => Err(Error::Decode(format!("unknown approval flag: {other:?}"))),
  }
}

// ─── EvidenceStatus ───────────────────────────────────────────────────────────

pub fn encode_evidence_status(s: EvidenceStatus) -> &'static str {
  match s {
    EvidenceStatus::Approved => "approved",
    EvidenceStatus::Rejected => "rejected",
  }
}

pub fn decode_evidence_status(s: &str) -> Result<EvidenceStatus> {
  match s {
    "approved" => Ok(EvidenceStatus::Approved),
    "rejected" => Ok(EvidenceStatus::Rejected),
    other => Err(Error::Decode(format!("unknown evidence status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub user_type:     String,
  pub approved:      String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      name:          self.name,
      email:         self.email,
      password_hash: self.password_hash,
      user_type:     decode_user_type(&self.user_type)?,
      approved:      decode_approval(&self.approved)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `occurrences` row.
pub struct RawOccurrence {
  pub occurrence_id:    String,
  pub cr:               String,
  pub description:      String,
  pub origin:           String,
  pub action:           String,
  pub start_date:       String,
  pub due_date:         String,
  pub reporter_email:   String,
  pub creator_email:    String,
  pub creator_name:     String,
  pub created_at:       String,
  pub evidence_path:    Option<String>,
  pub evidence_status:  Option<String>,
  pub rejection_reason: Option<String>,
  pub decided_at:       Option<String>,
  pub uploaded_at:      Option<String>,
  pub uploader_name:    Option<String>,
  pub approver_name:    Option<String>,
}

impl RawOccurrence {
  pub fn into_occurrence(self) -> Result<Occurrence> {
    let evidence = Evidence {
      path:          self.evidence_path,
      status:        self
        .evidence_status
        .as_deref()
        .map(decode_evidence_status)
        .transpose()?,
      reason:        self.rejection_reason,
      decided_at:    decode_opt_dt(self.decided_at.as_deref())?,
      uploaded_at:   decode_opt_dt(self.uploaded_at.as_deref())?,
      uploader_name: self.uploader_name,
      approver_name: self.approver_name,
    };

    Ok(Occurrence {
      occurrence_id:  decode_uuid(&self.occurrence_id)?,
      cr:             self.cr,
      description:    self.description,
      origin:         self.origin,
      action:         self.action,
      start_date:     decode_dt(&self.start_date)?,
      due_date:       decode_dt(&self.due_date)?,
      reporter_email: self.reporter_email,
      creator_email:  self.creator_email,
      creator_name:   self.creator_name,
      created_at:     decode_dt(&self.created_at)?,
      evidence,
    })
  }
}

/// Raw strings read directly from a `pdf_history` row.
pub struct RawHistory {
  pub history_id:    String,
  pub occurrence_id: String,
  pub evidence_path: Option<String>,
  pub uploaded_at:   Option<String>,
  pub uploader_name: Option<String>,
  pub reason:        String,
  pub rejected_at:   String,
  pub approver_name: String,
}

impl RawHistory {
  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      history_id:    decode_uuid(&self.history_id)?,
      occurrence_id: decode_uuid(&self.occurrence_id)?,
      evidence_path: self.evidence_path,
      uploaded_at:   decode_opt_dt(self.uploaded_at.as_deref())?,
      uploader_name: self.uploader_name,
      reason:        self.reason,
      rejected_at:   decode_dt(&self.rejected_at)?,
      approver_name: self.approver_name,
    })
  }
}
