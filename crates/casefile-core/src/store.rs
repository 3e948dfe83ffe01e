//! The `CaseStore` trait — the persistence seam.
//!
//! Implemented by storage backends (e.g. `casefile-store-sqlite`). The API
//! layer depends on this abstraction, not on any concrete backend.
//!
//! Writes are last-write-wins: there is no optimistic concurrency token, so
//! two approvers racing on the same occurrence will silently overwrite each
//! other. Inherited behaviour, kept as-is.

use std::future::Future;

use uuid::Uuid;

use crate::{
  history::HistoryEntry,
  occurrence::{Evidence, NewOccurrence, Occurrence, OccurrencePatch},
  policy::Visibility,
  user::{NewUser, User, UserPatch},
};

/// Abstraction over a Casefile storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Fails if the email is already registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look a user up by email — the login path.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// List every account, for the admin directory.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Apply a partial update. Email uniqueness is enforced excluding the
  /// user being updated.
  fn update_user(
    &self,
    id: Uuid,
    patch: UserPatch,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Delete an account. The user's occurrences are untouched; their email
  /// references simply go stale.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Occurrences ───────────────────────────────────────────────────────

  fn create_occurrence(
    &self,
    input: NewOccurrence,
  ) -> impl Future<Output = Result<Occurrence, Self::Error>> + Send + '_;

  fn get_occurrence(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Occurrence>, Self::Error>> + Send + '_;

  /// List occurrences visible under `visibility`, newest first.
  fn list_occurrences<'a>(
    &'a self,
    visibility: &'a Visibility,
  ) -> impl Future<Output = Result<Vec<Occurrence>, Self::Error>> + Send + 'a;

  /// Overwrite the data fields in place. Evidence fields are untouched.
  fn update_occurrence(
    &self,
    id: Uuid,
    patch: OccurrencePatch,
  ) -> impl Future<Output = Result<Occurrence, Self::Error>> + Send + '_;

  fn delete_occurrence(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Registration gate: does any occurrence name this reporter email?
  fn reporter_email_exists<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Evidence workflow ─────────────────────────────────────────────────

  /// Overwrite the evidence block in place. Transition rules live in
  /// [`crate::workflow`]; callers apply them before writing back. The
  /// occurrence update and any history append are separate writes, as in
  /// the original system — an interrupted request can leave one without
  /// the other.
  fn update_evidence(
    &self,
    id: Uuid,
    evidence: Evidence,
  ) -> impl Future<Output = Result<Occurrence, Self::Error>> + Send + '_;

  /// Append one rejection record. Append-only: nothing ever updates or
  /// deletes these rows.
  fn append_history(
    &self,
    entry: HistoryEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── History ───────────────────────────────────────────────────────────

  /// All rejection entries for an occurrence, newest first.
  fn history_for(
    &self,
    occurrence_id: Uuid,
  ) -> impl Future<Output = Result<Vec<HistoryEntry>, Self::Error>> + Send + '_;
}
