//! Evidence workflow — the state machine over an occurrence's evidence block.
//!
//! The state is never stored; it is derived from the nullable evidence
//! fields. Transitions mutate those fields in place and, on rejection, emit
//! the [`HistoryEntry`] the store must append.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  history::HistoryEntry,
  occurrence::{Evidence, EvidenceStatus, Occurrence},
};

/// Upper bound on a rejection reason, matching the column width.
pub const MAX_REASON_LEN: usize = 255;

// ─── Derived state ───────────────────────────────────────────────────────────

/// Workflow state of an occurrence, derived from its evidence fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceState {
  NoEvidence,
  PendingApproval,
  Approved,
  Rejected,
}

impl EvidenceState {
  pub fn of(evidence: &Evidence) -> Self {
    match (&evidence.path, evidence.status) {
      (None, _) => Self::NoEvidence,
      (Some(_), None) => Self::PendingApproval,
      (Some(_), Some(EvidenceStatus::Approved)) => Self::Approved,
      (Some(_), Some(EvidenceStatus::Rejected)) => Self::Rejected,
    }
  }
}

// ─── Transitions ─────────────────────────────────────────────────────────────

/// Attach (or replace) the evidence file. Valid from every state, including
/// `Approved` — re-upload is the only way out of a decided state. Any prior
/// decision is cleared and the occurrence re-enters `PendingApproval`.
pub fn attach_evidence(
  occurrence: &mut Occurrence,
  path: String,
  uploader_name: String,
  now: DateTime<Utc>,
) {
  occurrence.evidence = Evidence {
    path:          Some(path),
    status:        None,
    reason:        None,
    decided_at:    None,
    uploaded_at:   Some(now),
    uploader_name: Some(uploader_name),
    approver_name: occurrence.evidence.approver_name.take(),
  };
}

/// `PendingApproval → Approved`. Clears any rejection reason and records the
/// approver and decision time.
pub fn approve_evidence(
  occurrence: &mut Occurrence,
  approver_name: String,
  now: DateTime<Utc>,
) -> Result<()> {
  require_pending(occurrence)?;

  occurrence.evidence.status = Some(EvidenceStatus::Approved);
  occurrence.evidence.reason = None;
  occurrence.evidence.approver_name = Some(approver_name);
  occurrence.evidence.decided_at = Some(now);
  Ok(())
}

/// `PendingApproval → Rejected`. The reason is mandatory, non-empty, and
/// bounded at [`MAX_REASON_LEN`] characters (not bytes). Returns the history
/// entry snapshotting the pre-transition upload fields; the caller is
/// responsible for persisting it atomically with the occurrence update.
pub fn reject_evidence(
  occurrence: &mut Occurrence,
  approver_name: String,
  reason: String,
  now: DateTime<Utc>,
) -> Result<HistoryEntry> {
  require_pending(occurrence)?;

  let reason = reason.trim().to_owned();
  if reason.is_empty() {
    return Err(Error::MissingReason);
  }
  if reason.chars().count() > MAX_REASON_LEN {
    return Err(Error::ReasonTooLong { max: MAX_REASON_LEN });
  }

  let entry = HistoryEntry {
    history_id:    Uuid::new_v4(),
    occurrence_id: occurrence.occurrence_id,
    evidence_path: occurrence.evidence.path.clone(),
    uploaded_at:   occurrence.evidence.uploaded_at,
    uploader_name: occurrence.evidence.uploader_name.clone(),
    reason:        reason.clone(),
    rejected_at:   now,
    approver_name: approver_name.clone(),
  };

  occurrence.evidence.status = Some(EvidenceStatus::Rejected);
  occurrence.evidence.reason = Some(reason);
  occurrence.evidence.approver_name = Some(approver_name);
  occurrence.evidence.decided_at = Some(now);

  Ok(entry)
}

fn require_pending(occurrence: &Occurrence) -> Result<()> {
  match EvidenceState::of(&occurrence.evidence) {
    EvidenceState::PendingApproval => Ok(()),
    EvidenceState::NoEvidence => {
      Err(Error::NoEvidence(occurrence.occurrence_id))
    }
    _ => Err(Error::NotPendingApproval(occurrence.occurrence_id)),
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeDelta;

  use super::*;

  fn occurrence() -> Occurrence {
    let now = Utc::now();
    Occurrence {
      occurrence_id:  Uuid::new_v4(),
      cr:             "CR-100".into(),
      description:    "spill in bay 3".into(),
      origin:         "audit".into(),
      action:         "clean and re-train".into(),
      start_date:     now,
      due_date:       now + TimeDelta::days(7),
      reporter_email: "reporter@example.com".into(),
      creator_email:  "creator@example.com".into(),
      creator_name:   "Creator".into(),
      created_at:     now,
      evidence:       Evidence::default(),
    }
  }

  fn pending(occ: &mut Occurrence) {
    attach_evidence(occ, "products_pdfs/a.pdf".into(), "Uploader".into(), Utc::now());
  }

  #[test]
  fn state_derivation() {
    let mut occ = occurrence();
    assert_eq!(EvidenceState::of(&occ.evidence), EvidenceState::NoEvidence);

    pending(&mut occ);
    assert_eq!(EvidenceState::of(&occ.evidence), EvidenceState::PendingApproval);

    approve_evidence(&mut occ, "Approver".into(), Utc::now()).unwrap();
    assert_eq!(EvidenceState::of(&occ.evidence), EvidenceState::Approved);
  }

  #[test]
  fn upload_resets_any_prior_decision() {
    let mut occ = occurrence();
    pending(&mut occ);
    approve_evidence(&mut occ, "Approver".into(), Utc::now()).unwrap();

    attach_evidence(&mut occ, "products_pdfs/b.pdf".into(), "U2".into(), Utc::now());
    assert_eq!(EvidenceState::of(&occ.evidence), EvidenceState::PendingApproval);
    assert!(occ.evidence.status.is_none());
    assert!(occ.evidence.reason.is_none());
    assert!(occ.evidence.decided_at.is_none());
    assert_eq!(occ.evidence.uploader_name.as_deref(), Some("U2"));
  }

  #[test]
  fn approve_requires_pending() {
    let mut occ = occurrence();
    let err = approve_evidence(&mut occ, "A".into(), Utc::now()).unwrap_err();
    assert!(matches!(err, Error::NoEvidence(_)));

    pending(&mut occ);
    approve_evidence(&mut occ, "A".into(), Utc::now()).unwrap();
    let err = approve_evidence(&mut occ, "A".into(), Utc::now()).unwrap_err();
    assert!(matches!(err, Error::NotPendingApproval(_)));
  }

  #[test]
  fn reject_requires_nonempty_reason() {
    let mut occ = occurrence();
    pending(&mut occ);

    let err =
      reject_evidence(&mut occ, "A".into(), "   ".into(), Utc::now()).unwrap_err();
    assert!(matches!(err, Error::MissingReason));

    let long = "x".repeat(MAX_REASON_LEN + 1);
    let err = reject_evidence(&mut occ, "A".into(), long, Utc::now()).unwrap_err();
    assert!(matches!(err, Error::ReasonTooLong { .. }));
  }

  #[test]
  fn reason_bound_counts_characters_not_bytes() {
    let mut occ = occurrence();
    pending(&mut occ);

    // 255 two-byte characters is within the bound despite being 510 bytes.
    let reason = "é".repeat(MAX_REASON_LEN);
    reject_evidence(&mut occ, "A".into(), reason, Utc::now()).unwrap();

    attach_evidence(&mut occ, "products_pdfs/e.pdf".into(), "U".into(), Utc::now());
    let over = "é".repeat(MAX_REASON_LEN + 1);
    let err = reject_evidence(&mut occ, "A".into(), over, Utc::now()).unwrap_err();
    assert!(matches!(err, Error::ReasonTooLong { .. }));
  }

  #[test]
  fn reject_snapshots_pre_transition_fields() {
    let mut occ = occurrence();
    let uploaded = Utc::now() - TimeDelta::hours(2);
    attach_evidence(&mut occ, "products_pdfs/c.pdf".into(), "Uploader".into(), uploaded);

    let decided = Utc::now();
    let entry =
      reject_evidence(&mut occ, "Approver".into(), "missing signature".into(), decided)
        .unwrap();

    assert_eq!(entry.occurrence_id, occ.occurrence_id);
    assert_eq!(entry.evidence_path.as_deref(), Some("products_pdfs/c.pdf"));
    assert_eq!(entry.uploaded_at, Some(uploaded));
    assert_eq!(entry.uploader_name.as_deref(), Some("Uploader"));
    assert_eq!(entry.reason, "missing signature");
    assert_eq!(entry.rejected_at, decided);
    assert_eq!(entry.approver_name, "Approver");

    assert_eq!(EvidenceState::of(&occ.evidence), EvidenceState::Rejected);
    assert_eq!(occ.evidence.reason.as_deref(), Some("missing signature"));
  }

  #[test]
  fn no_transition_out_of_approved_except_reupload() {
    let mut occ = occurrence();
    pending(&mut occ);
    approve_evidence(&mut occ, "A".into(), Utc::now()).unwrap();

    let err =
      reject_evidence(&mut occ, "A".into(), "nope".into(), Utc::now()).unwrap_err();
    assert!(matches!(err, Error::NotPendingApproval(_)));

    attach_evidence(&mut occ, "products_pdfs/d.pdf".into(), "U".into(), Utc::now());
    reject_evidence(&mut occ, "A".into(), "now rejectable".into(), Utc::now()).unwrap();
  }
}
