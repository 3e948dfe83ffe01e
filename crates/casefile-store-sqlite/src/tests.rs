//! Integration tests for `SqliteStore` against an in-memory database.

use casefile_core::{
  occurrence::{Evidence, NewOccurrence, OccurrencePatch},
  policy::Visibility,
  store::CaseStore,
  user::{Approval, NewUser, UserPatch, UserType},
  workflow,
};
use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(email: &str) -> NewUser {
  NewUser {
    name:          "Test User".into(),
    email:         email.into(),
    password_hash: "$argon2id$stub".into(),
    user_type:     UserType::Standard,
    approved:      Approval::No,
  }
}

fn new_occurrence(reporter: &str, creator: &str) -> NewOccurrence {
  let now = Utc::now();
  NewOccurrence {
    cr:             "CR-100".into(),
    description:    "forklift incident".into(),
    origin:         "audit".into(),
    action:         "re-train operators".into(),
    start_date:     now,
    due_date:       now + TimeDelta::days(7),
    reporter_email: reporter.into(),
    creator_email:  creator.into(),
    creator_name:   "Creator".into(),
    evidence_path:  None,
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_user() {
  let s = store().await;

  let user = s.create_user(new_user("alice@example.com")).await.unwrap();
  assert_eq!(user.user_type, UserType::Standard);

  let fetched = s.get_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.user_id, user.user_id);
  assert_eq!(fetched.email, "alice@example.com");
  assert_eq!(fetched.approved, Approval::No);
}

#[tokio::test]
async fn duplicate_email_rejected() {
  let s = store().await;
  s.create_user(new_user("dup@example.com")).await.unwrap();

  let err = s.create_user(new_user("dup@example.com")).await.unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateEmail(_)));
}

#[tokio::test]
async fn find_user_by_email() {
  let s = store().await;
  s.create_user(new_user("bob@example.com")).await.unwrap();

  let found = s.find_user_by_email("bob@example.com").await.unwrap();
  assert!(found.is_some());
  assert!(s.find_user_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn update_user_partially() {
  let s = store().await;
  let user = s.create_user(new_user("carol@example.com")).await.unwrap();

  let updated = s
    .update_user(user.user_id, UserPatch {
      user_type: Some(UserType::Plus),
      approved: Some(Approval::Yes),
      ..UserPatch::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.user_type, UserType::Plus);
  assert_eq!(updated.approved, Approval::Yes);
  // untouched fields survive
  assert_eq!(updated.name, "Test User");
  assert_eq!(updated.email, "carol@example.com");
}

#[tokio::test]
async fn update_user_email_uniqueness_excludes_self() {
  let s = store().await;
  let a = s.create_user(new_user("a@example.com")).await.unwrap();
  s.create_user(new_user("b@example.com")).await.unwrap();

  // keeping your own email is fine
  s.update_user(a.user_id, UserPatch {
    email: Some("a@example.com".into()),
    ..UserPatch::default()
  })
  .await
  .unwrap();

  // taking someone else's is not
  let err = s
    .update_user(a.user_id, UserPatch {
      email: Some("b@example.com".into()),
      ..UserPatch::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateEmail(_)));
}

#[tokio::test]
async fn delete_user_leaves_occurrences_alone() {
  let s = store().await;
  let user = s.create_user(new_user("gone@example.com")).await.unwrap();
  s.create_occurrence(new_occurrence("gone@example.com", "gone@example.com"))
    .await
    .unwrap();

  s.delete_user(user.user_id).await.unwrap();
  assert!(s.get_user(user.user_id).await.unwrap().is_none());

  // the occurrence's email reference is now dangling, by design
  let all = s.list_occurrences(&Visibility::All).await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].reporter_email, "gone@example.com");
}

#[tokio::test]
async fn delete_missing_user_errors() {
  let s = store().await;
  let err = s.delete_user(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, crate::Error::UserNotFound(_)));
}

// ─── Occurrences ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_occurrence() {
  let s = store().await;
  let occ = s
    .create_occurrence(new_occurrence("rep@example.com", "cre@example.com"))
    .await
    .unwrap();

  let fetched = s.get_occurrence(occ.occurrence_id).await.unwrap().unwrap();
  assert_eq!(fetched.cr, "CR-100");
  assert_eq!(fetched.reporter_email, "rep@example.com");
  assert!(fetched.evidence.path.is_none());
}

#[tokio::test]
async fn create_with_evidence_starts_pending_approval() {
  let s = store().await;
  let mut input = new_occurrence("rep@example.com", "cre@example.com");
  input.evidence_path = Some("products_pdfs/initial.pdf".into());

  let occ = s.create_occurrence(input).await.unwrap();
  assert_eq!(occ.evidence.path.as_deref(), Some("products_pdfs/initial.pdf"));
  assert!(occ.evidence.status.is_none());
  assert!(occ.evidence.uploaded_at.is_some());
}

#[tokio::test]
async fn visibility_filters() {
  let s = store().await;
  s.create_occurrence(new_occurrence("std@example.com", "other@example.com"))
    .await
    .unwrap();
  s.create_occurrence(new_occurrence("other@example.com", "std@example.com"))
    .await
    .unwrap();
  s.create_occurrence(new_occurrence("x@example.com", "y@example.com"))
    .await
    .unwrap();

  let reported = s
    .list_occurrences(&Visibility::ReportedBy("std@example.com".into()))
    .await
    .unwrap();
  assert_eq!(reported.len(), 1);
  assert!(reported.iter().all(|o| o.reporter_email == "std@example.com"));

  let union = s
    .list_occurrences(&Visibility::ReportedOrCreatedBy("std@example.com".into()))
    .await
    .unwrap();
  assert_eq!(union.len(), 2);

  let all = s.list_occurrences(&Visibility::All).await.unwrap();
  assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn update_occurrence_data_fields_only() {
  let s = store().await;
  let occ = s
    .create_occurrence(new_occurrence("rep@example.com", "cre@example.com"))
    .await
    .unwrap();

  // put some evidence on it first
  let mut with_ev = occ.clone();
  workflow::attach_evidence(
    &mut with_ev,
    "products_pdfs/a.pdf".into(),
    "Uploader".into(),
    Utc::now(),
  );
  s.update_evidence(occ.occurrence_id, with_ev.evidence).await.unwrap();

  let updated = s
    .update_occurrence(occ.occurrence_id, OccurrencePatch {
      cr:             "CR-200".into(),
      description:    "amended".into(),
      origin:         "field".into(),
      action:         "monitor".into(),
      start_date:     occ.start_date,
      due_date:       occ.due_date,
      reporter_email: "rep@example.com".into(),
    })
    .await
    .unwrap();

  assert_eq!(updated.cr, "CR-200");
  // evidence block untouched by a data update
  assert_eq!(updated.evidence.path.as_deref(), Some("products_pdfs/a.pdf"));
}

#[tokio::test]
async fn update_missing_occurrence_errors() {
  let s = store().await;
  let err = s
    .update_occurrence(Uuid::new_v4(), OccurrencePatch {
      cr:             "CR-1".into(),
      description:    "d".into(),
      origin:         "o".into(),
      action:         "a".into(),
      start_date:     Utc::now(),
      due_date:       Utc::now(),
      reporter_email: "r@example.com".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::OccurrenceNotFound(_)));
}

#[tokio::test]
async fn delete_occurrence() {
  let s = store().await;
  let occ = s
    .create_occurrence(new_occurrence("rep@example.com", "cre@example.com"))
    .await
    .unwrap();

  s.delete_occurrence(occ.occurrence_id).await.unwrap();
  assert!(s.get_occurrence(occ.occurrence_id).await.unwrap().is_none());

  let err = s.delete_occurrence(occ.occurrence_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::OccurrenceNotFound(_)));
}

#[tokio::test]
async fn reporter_email_exists() {
  let s = store().await;
  assert!(!s.reporter_email_exists("rep@example.com").await.unwrap());

  s.create_occurrence(new_occurrence("rep@example.com", "cre@example.com"))
    .await
    .unwrap();
  assert!(s.reporter_email_exists("rep@example.com").await.unwrap());
}

// ─── Evidence workflow round trips ───────────────────────────────────────────

#[tokio::test]
async fn evidence_upload_approve_reupload() {
  let s = store().await;
  let occ = s
    .create_occurrence(new_occurrence("rep@example.com", "cre@example.com"))
    .await
    .unwrap();

  let mut current = occ.clone();
  workflow::attach_evidence(
    &mut current,
    "products_pdfs/v1.pdf".into(),
    "Uploader".into(),
    Utc::now(),
  );
  let stored = s
    .update_evidence(occ.occurrence_id, current.evidence.clone())
    .await
    .unwrap();
  assert!(stored.evidence.status.is_none());

  let mut current = stored;
  workflow::approve_evidence(&mut current, "Approver".into(), Utc::now()).unwrap();
  let stored = s
    .update_evidence(occ.occurrence_id, current.evidence.clone())
    .await
    .unwrap();
  assert_eq!(
    stored.evidence.status,
    Some(casefile_core::occurrence::EvidenceStatus::Approved)
  );

  // re-upload resets to pending regardless of the approval
  let mut current = stored;
  workflow::attach_evidence(
    &mut current,
    "products_pdfs/v2.pdf".into(),
    "Uploader".into(),
    Utc::now(),
  );
  let stored = s
    .update_evidence(occ.occurrence_id, current.evidence)
    .await
    .unwrap();
  assert!(stored.evidence.status.is_none());
  assert_eq!(stored.evidence.path.as_deref(), Some("products_pdfs/v2.pdf"));
}

#[tokio::test]
async fn update_evidence_missing_occurrence_errors() {
  let s = store().await;
  let err = s
    .update_evidence(Uuid::new_v4(), Evidence::default())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::OccurrenceNotFound(_)));
}

// ─── History ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rejection_appends_history_newest_first() {
  let s = store().await;
  let occ = s
    .create_occurrence(new_occurrence("rep@example.com", "cre@example.com"))
    .await
    .unwrap();

  let mut current = occ.clone();

  // first rejection
  workflow::attach_evidence(
    &mut current,
    "products_pdfs/v1.pdf".into(),
    "Uploader".into(),
    Utc::now() - TimeDelta::hours(2),
  );
  let entry = workflow::reject_evidence(
    &mut current,
    "Approver".into(),
    "missing signature".into(),
    Utc::now() - TimeDelta::hours(1),
  )
  .unwrap();
  s.update_evidence(occ.occurrence_id, current.evidence.clone())
    .await
    .unwrap();
  s.append_history(entry).await.unwrap();

  // second rejection after a re-upload
  workflow::attach_evidence(
    &mut current,
    "products_pdfs/v2.pdf".into(),
    "Uploader".into(),
    Utc::now(),
  );
  let entry = workflow::reject_evidence(
    &mut current,
    "Approver".into(),
    "wrong document".into(),
    Utc::now(),
  )
  .unwrap();
  s.update_evidence(occ.occurrence_id, current.evidence)
    .await
    .unwrap();
  s.append_history(entry).await.unwrap();

  let history = s.history_for(occ.occurrence_id).await.unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0].reason, "wrong document");
  assert_eq!(history[0].evidence_path.as_deref(), Some("products_pdfs/v2.pdf"));
  assert_eq!(history[1].reason, "missing signature");
  assert_eq!(history[1].evidence_path.as_deref(), Some("products_pdfs/v1.pdf"));
}

#[tokio::test]
async fn history_survives_occurrence_deletion() {
  let s = store().await;
  let occ = s
    .create_occurrence(new_occurrence("rep@example.com", "cre@example.com"))
    .await
    .unwrap();

  let mut current = occ.clone();
  workflow::attach_evidence(
    &mut current,
    "products_pdfs/v1.pdf".into(),
    "Uploader".into(),
    Utc::now(),
  );
  let entry =
    workflow::reject_evidence(&mut current, "Approver".into(), "blurry scan".into(), Utc::now())
      .unwrap();
  s.update_evidence(occ.occurrence_id, current.evidence).await.unwrap();
  s.append_history(entry).await.unwrap();

  s.delete_occurrence(occ.occurrence_id).await.unwrap();

  let history = s.history_for(occ.occurrence_id).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].reason, "blurry scan");
}
