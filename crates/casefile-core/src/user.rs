//! User accounts and the registration approval gate.
//!
//! Accounts are created by self-registration and managed by administrators
//! through the user directory. The `approved` flag gates every authenticated
//! action; the gate is an explicit predicate, not framework magic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Privilege tier of an account.
///
/// Standard users see only occurrences they reported. Plus users also see
/// occurrences they created on behalf of others. Admins see everything and
/// are the only tier allowed into the user directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
  Standard,
  Plus,
  Admin,
}

/// Whether an administrator (or the auto-approval rule) has cleared this
/// account for access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approval {
  Yes,
  No,
}

/// A user account. `password_hash` is an argon2 PHC string and is never
/// serialised out of the process; use [`PublicUser`] for API responses.
#[derive(Debug, Clone)]
pub struct User {
  pub user_id:       Uuid,
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub user_type:     UserType,
  pub approved:      Approval,
  pub created_at:    DateTime<Utc>,
}

impl User {
  /// The registration gate: access is blocked exactly when the account is
  /// explicitly unapproved.
  pub fn is_access_approved(&self) -> bool { self.approved != Approval::No }

  pub fn public(&self) -> PublicUser {
    PublicUser {
      user_id:    self.user_id,
      name:       self.name.clone(),
      email:      self.email.clone(),
      user_type:  self.user_type,
      approved:   self.approved,
      created_at: self.created_at,
    }
  }
}

/// The externally-visible projection of a [`User`] — everything except the
/// password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
  pub user_id:    Uuid,
  pub name:       String,
  pub email:      String,
  pub user_type:  UserType,
  pub approved:   Approval,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::CaseStore::create_user`]. The store assigns the
/// id and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub user_type:     UserType,
  pub approved:      Approval,
}

/// Partial update applied by an administrator. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
  pub name:      Option<String>,
  pub email:     Option<String>,
  pub user_type: Option<UserType>,
  pub approved:  Option<Approval>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(approved: Approval) -> User {
    User {
      user_id:       Uuid::new_v4(),
      name:          "Alice".into(),
      email:         "alice@example.com".into(),
      password_hash: "$argon2id$stub".into(),
      user_type:     UserType::Standard,
      approved,
      created_at:    Utc::now(),
    }
  }

  #[test]
  fn unapproved_account_is_blocked() {
    assert!(!user(Approval::No).is_access_approved());
    assert!(user(Approval::Yes).is_access_approved());
  }

  #[test]
  fn public_projection_drops_the_hash() {
    let u = user(Approval::Yes);
    let json = serde_json::to_value(u.public()).unwrap();
    assert!(json.get("password_hash").is_none());
    assert_eq!(json["email"], "alice@example.com");
  }
}
