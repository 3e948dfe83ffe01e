//! Dashboard aggregator — the computed read model over the occurrence set.
//!
//! Status is derived per occurrence at read time and never stored. The
//! aggregation walks the full current set in one pass; there is no
//! pagination, which is a known scaling limit of this report, not a design
//! requirement.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::occurrence::{EvidenceStatus, Occurrence};

// ─── Derived status ──────────────────────────────────────────────────────────

/// Display status of an occurrence. Pure function of the evidence path, the
/// due date relative to `now`, and the review outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedStatus {
  Overdue,
  Pending,
  PendingApproval,
  Completed,
  EvidenceRejected,
}

/// First-match-wins precedence; the arms below are ordered exactly as the
/// report defines them.
pub fn derive_status(occurrence: &Occurrence, now: DateTime<Utc>) -> DerivedStatus {
  match (&occurrence.evidence.path, occurrence.evidence.status) {
    (None, _) if occurrence.due_date < now => DerivedStatus::Overdue,
    (None, _) => DerivedStatus::Pending,
    (Some(_), None) => DerivedStatus::PendingApproval,
    (Some(_), Some(EvidenceStatus::Approved)) => DerivedStatus::Completed,
    (Some(_), Some(EvidenceStatus::Rejected)) => DerivedStatus::EvidenceRejected,
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Per-status counters. A struct rather than a map so every category is
/// always present in the serialised report, zero or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
  pub overdue:           u64,
  pub pending:           u64,
  pub pending_approval:  u64,
  pub completed:         u64,
  pub evidence_rejected: u64,
}

impl StatusCounts {
  fn bump(&mut self, status: DerivedStatus) {
    match status {
      DerivedStatus::Overdue => self.overdue += 1,
      DerivedStatus::Pending => self.pending += 1,
      DerivedStatus::PendingApproval => self.pending_approval += 1,
      DerivedStatus::Completed => self.completed += 1,
      DerivedStatus::EvidenceRejected => self.evidence_rejected += 1,
    }
  }
}

/// One row of the flat item list handed to client-side charting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardItem {
  pub cr:     String,
  pub origin: String,
  pub status: DerivedStatus,
}

/// The full aggregated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
  pub status_counts: StatusCounts,
  pub cr_counts:     BTreeMap<String, u64>,
  pub origin_counts: BTreeMap<String, u64>,
  pub items:         Vec<DashboardItem>,
}

/// Aggregate the occurrence set as of `now`.
pub fn aggregate(occurrences: &[Occurrence], now: DateTime<Utc>) -> DashboardReport {
  let mut status_counts = StatusCounts::default();
  let mut cr_counts = BTreeMap::new();
  let mut origin_counts = BTreeMap::new();
  let mut items = Vec::with_capacity(occurrences.len());

  for occurrence in occurrences {
    let status = derive_status(occurrence, now);
    status_counts.bump(status);
    *cr_counts.entry(occurrence.cr.clone()).or_insert(0u64) += 1;
    *origin_counts.entry(occurrence.origin.clone()).or_insert(0u64) += 1;
    items.push(DashboardItem {
      cr:     occurrence.cr.clone(),
      origin: occurrence.origin.clone(),
      status,
    });
  }

  DashboardReport { status_counts, cr_counts, origin_counts, items }
}

#[cfg(test)]
mod tests {
  use chrono::TimeDelta;
  use uuid::Uuid;

  use super::*;
  use crate::occurrence::Evidence;

  fn occurrence(cr: &str, origin: &str, due_in: TimeDelta) -> Occurrence {
    let now = Utc::now();
    Occurrence {
      occurrence_id:  Uuid::new_v4(),
      cr:             cr.into(),
      description:    "d".into(),
      origin:         origin.into(),
      action:         "a".into(),
      start_date:     now,
      due_date:       now + due_in,
      reporter_email: "r@example.com".into(),
      creator_email:  "c@example.com".into(),
      creator_name:   "c".into(),
      created_at:     now,
      evidence:       Evidence::default(),
    }
  }

  fn with_evidence(mut occ: Occurrence, status: Option<EvidenceStatus>) -> Occurrence {
    occ.evidence.path = Some("products_pdfs/x.pdf".into());
    occ.evidence.status = status;
    occ
  }

  #[test]
  fn derivation_precedence() {
    let now = Utc::now();

    let overdue = occurrence("CR-1", "audit", TimeDelta::days(-1));
    assert_eq!(derive_status(&overdue, now), DerivedStatus::Overdue);

    let pending = occurrence("CR-1", "audit", TimeDelta::days(1));
    assert_eq!(derive_status(&pending, now), DerivedStatus::Pending);

    // Evidence present trumps the due date, even when overdue.
    let uploaded =
      with_evidence(occurrence("CR-1", "audit", TimeDelta::days(-1)), None);
    assert_eq!(derive_status(&uploaded, now), DerivedStatus::PendingApproval);

    let approved = with_evidence(
      occurrence("CR-1", "audit", TimeDelta::days(-1)),
      Some(EvidenceStatus::Approved),
    );
    assert_eq!(derive_status(&approved, now), DerivedStatus::Completed);

    let rejected = with_evidence(
      occurrence("CR-1", "audit", TimeDelta::days(1)),
      Some(EvidenceStatus::Rejected),
    );
    assert_eq!(derive_status(&rejected, now), DerivedStatus::EvidenceRejected);
  }

  #[test]
  fn single_overdue_occurrence_counts() {
    let now = Utc::now();
    let set = vec![occurrence("CR-9", "inspection", TimeDelta::days(-1))];

    let report = aggregate(&set, now);
    assert_eq!(report.status_counts, StatusCounts {
      overdue: 1,
      ..StatusCounts::default()
    });
    assert_eq!(report.cr_counts.get("CR-9"), Some(&1));
    assert_eq!(report.origin_counts.get("inspection"), Some(&1));
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].status, DerivedStatus::Overdue);
  }

  #[test]
  fn groups_by_cr_and_origin() {
    let now = Utc::now();
    let set = vec![
      occurrence("CR-1", "audit", TimeDelta::days(1)),
      occurrence("CR-1", "field", TimeDelta::days(1)),
      occurrence("CR-2", "audit", TimeDelta::days(-1)),
    ];

    let report = aggregate(&set, now);
    assert_eq!(report.cr_counts.get("CR-1"), Some(&2));
    assert_eq!(report.cr_counts.get("CR-2"), Some(&1));
    assert_eq!(report.origin_counts.get("audit"), Some(&2));
    assert_eq!(report.status_counts.pending, 2);
    assert_eq!(report.status_counts.overdue, 1);
  }

  #[test]
  fn empty_set_keeps_all_categories_present() {
    let report = aggregate(&[], Utc::now());
    let json = serde_json::to_value(&report.status_counts).unwrap();
    for key in
      ["overdue", "pending", "pending_approval", "completed", "evidence_rejected"]
    {
      assert_eq!(json[key], 0, "missing category {key}");
    }
  }
}
