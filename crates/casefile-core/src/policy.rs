//! Access policy — visibility filtering and the admin gate.
//!
//! Every policy decision takes an explicit [`Caller`] value; there is no
//! ambient request context. The caller is resolved once per request by the
//! API layer and threaded through.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  occurrence::Occurrence,
  user::{User, UserType},
};

/// The identity making a request: just enough of the user record for policy
/// and workflow attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
  pub user_id:   Uuid,
  pub name:      String,
  pub email:     String,
  pub user_type: UserType,
}

impl Caller {
  pub fn of(user: &User) -> Self {
    Self {
      user_id:   user.user_id,
      name:      user.name.clone(),
      email:     user.email.clone(),
      user_type: user.user_type,
    }
  }
}

// ─── Visibility ──────────────────────────────────────────────────────────────

/// Which occurrences a caller may see. Computed once and handed to the store
/// so the filter happens in the query, not after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
  /// Admins see the full set.
  All,
  /// Standard users: only occurrences reported under their own email.
  ReportedBy(String),
  /// Plus users: reported under their email OR created by them.
  ReportedOrCreatedBy(String),
}

impl Visibility {
  pub fn for_caller(caller: &Caller) -> Self {
    match caller.user_type {
      UserType::Admin => Self::All,
      UserType::Standard => Self::ReportedBy(caller.email.clone()),
      UserType::Plus => Self::ReportedOrCreatedBy(caller.email.clone()),
    }
  }

  /// Predicate form of the filter, for callers that already hold the record.
  pub fn allows(&self, occurrence: &Occurrence) -> bool {
    match self {
      Self::All => true,
      Self::ReportedBy(email) => occurrence.reporter_email == *email,
      Self::ReportedOrCreatedBy(email) => {
        occurrence.reporter_email == *email || occurrence.creator_email == *email
      }
    }
  }
}

// ─── Gates ───────────────────────────────────────────────────────────────────

/// Admin-only routes (the user directory). Terminal failure — no retry.
pub fn require_admin(caller: &Caller) -> Result<()> {
  if caller.user_type == UserType::Admin {
    Ok(())
  } else {
    Err(Error::Forbidden)
  }
}

/// Data-field edits and deletion: reserved for the occurrence's reporter,
/// its creator, or an admin.
pub fn can_modify(caller: &Caller, occurrence: &Occurrence) -> bool {
  caller.user_type == UserType::Admin
    || occurrence.reporter_email == caller.email
    || occurrence.creator_email == caller.email
}
