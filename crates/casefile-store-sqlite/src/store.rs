//! [`SqliteStore`] — the SQLite implementation of [`CaseStore`].

use std::path::Path;

use casefile_core::{
  history::HistoryEntry,
  occurrence::{Evidence, NewOccurrence, Occurrence, OccurrencePatch},
  policy::Visibility,
  store::CaseStore,
  user::{NewUser, User, UserPatch},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawHistory, RawOccurrence, RawUser, encode_approval, encode_dt,
    encode_evidence_status, encode_user_type, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Row mapping ─────────────────────────────────────────────────────────────

const USER_COLUMNS: &str =
  "user_id, name, email, password_hash, user_type, approved, created_at";

const OCCURRENCE_COLUMNS: &str = "occurrence_id, cr, description, origin, \
   action, start_date, due_date, reporter_email, creator_email, creator_name, \
   created_at, evidence_path, evidence_status, rejection_reason, decided_at, \
   uploaded_at, uploader_name, approver_name";

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:       row.get(0)?,
    name:          row.get(1)?,
    email:         row.get(2)?,
    password_hash: row.get(3)?,
    user_type:     row.get(4)?,
    approved:      row.get(5)?,
    created_at:    row.get(6)?,
  })
}

fn occurrence_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawOccurrence> {
  Ok(RawOccurrence {
    occurrence_id:    row.get(0)?,
    cr:               row.get(1)?,
    description:      row.get(2)?,
    origin:           row.get(3)?,
    action:           row.get(4)?,
    start_date:       row.get(5)?,
    due_date:         row.get(6)?,
    reporter_email:   row.get(7)?,
    creator_email:    row.get(8)?,
    creator_name:     row.get(9)?,
    created_at:       row.get(10)?,
    evidence_path:    row.get(11)?,
    evidence_status:  row.get(12)?,
    rejection_reason: row.get(13)?,
    decided_at:       row.get(14)?,
    uploaded_at:      row.get(15)?,
    uploader_name:    row.get(16)?,
    approver_name:    row.get(17)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Casefile store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Is `email` taken by a user other than `exclude`?
  async fn email_taken(&self, email: String, exclude: Option<Uuid>) -> Result<bool> {
    let exclude_str = exclude.map(encode_uuid);
    let taken: bool = self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1 AND (?2 IS NULL OR user_id != ?2)",
            rusqlite::params![email, exclude_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        Ok(taken)
      })
      .await?;
    Ok(taken)
  }

  async fn fetch_occurrence(&self, id: Uuid) -> Result<Option<Occurrence>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawOccurrence> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {OCCURRENCE_COLUMNS} FROM occurrences WHERE occurrence_id = ?1"
              ),
              rusqlite::params![id_str],
              occurrence_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawOccurrence::into_occurrence).transpose()
  }
}

// ─── CaseStore impl ──────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    if self.email_taken(input.email.clone(), None).await? {
      return Err(Error::DuplicateEmail(input.email));
    }

    let user = User {
      user_id:       Uuid::new_v4(),
      name:          input.name,
      email:         input.email,
      password_hash: input.password_hash,
      user_type:     input.user_type,
      approved:      input.approved,
      created_at:    Utc::now(),
    };

    let id_str       = encode_uuid(user.user_id);
    let name         = user.name.clone();
    let email        = user.email.clone();
    let hash         = user.password_hash.clone();
    let type_str     = encode_user_type(user.user_type).to_owned();
    let approved_str = encode_approval(user.approved).to_owned();
    let at_str       = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, name, email, password_hash, user_type, approved, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, name, email, hash, type_str, approved_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
              rusqlite::params![email],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at"))?;
        let rows = stmt
          .query_map([], user_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User> {
    let current = self.get_user(id).await?.ok_or(Error::UserNotFound(id))?;

    if let Some(email) = &patch.email
      && *email != current.email
      && self.email_taken(email.clone(), Some(id)).await?
    {
      return Err(Error::DuplicateEmail(email.clone()));
    }

    let updated = User {
      name:      patch.name.unwrap_or(current.name),
      email:     patch.email.unwrap_or(current.email),
      user_type: patch.user_type.unwrap_or(current.user_type),
      approved:  patch.approved.unwrap_or(current.approved),
      ..current
    };

    let id_str       = encode_uuid(id);
    let name         = updated.name.clone();
    let email        = updated.email.clone();
    let type_str     = encode_user_type(updated.user_type).to_owned();
    let approved_str = encode_approval(updated.approved).to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET name = ?2, email = ?3, user_type = ?4, approved = ?5
           WHERE user_id = ?1",
          rusqlite::params![id_str, name, email, type_str, approved_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(updated)
  }

  async fn delete_user(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM users WHERE user_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::UserNotFound(id));
    }
    Ok(())
  }

  // ── Occurrences ───────────────────────────────────────────────────────────

  async fn create_occurrence(&self, input: NewOccurrence) -> Result<Occurrence> {
    let now = Utc::now();
    let evidence = match input.evidence_path {
      Some(path) => Evidence {
        path:          Some(path),
        uploaded_at:   Some(now),
        uploader_name: Some(input.creator_name.clone()),
        ..Evidence::default()
      },
      None => Evidence::default(),
    };

    let occurrence = Occurrence {
      occurrence_id: Uuid::new_v4(),
      cr: input.cr,
      description: input.description,
      origin: input.origin,
      action: input.action,
      start_date: input.start_date,
      due_date: input.due_date,
      reporter_email: input.reporter_email,
      creator_email: input.creator_email,
      creator_name: input.creator_name,
      created_at: now,
      evidence,
    };

    let id_str     = encode_uuid(occurrence.occurrence_id);
    let cr         = occurrence.cr.clone();
    let desc       = occurrence.description.clone();
    let origin     = occurrence.origin.clone();
    let action     = occurrence.action.clone();
    let start_str  = encode_dt(occurrence.start_date);
    let due_str    = encode_dt(occurrence.due_date);
    let reporter   = occurrence.reporter_email.clone();
    let creator    = occurrence.creator_email.clone();
    let cname      = occurrence.creator_name.clone();
    let at_str     = encode_dt(occurrence.created_at);
    let ev_path    = occurrence.evidence.path.clone();
    let up_at_str  = occurrence.evidence.uploaded_at.map(encode_dt);
    let up_name    = occurrence.evidence.uploader_name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO occurrences (
             occurrence_id, cr, description, origin, action,
             start_date, due_date, reporter_email, creator_email, creator_name,
             created_at, evidence_path, uploaded_at, uploader_name
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
          rusqlite::params![
            id_str, cr, desc, origin, action, start_str, due_str, reporter,
            creator, cname, at_str, ev_path, up_at_str, up_name,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(occurrence)
  }

  async fn get_occurrence(&self, id: Uuid) -> Result<Option<Occurrence>> {
    self.fetch_occurrence(id).await
  }

  async fn list_occurrences(&self, visibility: &Visibility) -> Result<Vec<Occurrence>> {
    let (condition, email) = match visibility {
      Visibility::All => ("1", None),
      Visibility::ReportedBy(email) => {
        ("reporter_email = ?1", Some(email.clone()))
      }
      Visibility::ReportedOrCreatedBy(email) => {
        ("(reporter_email = ?1 OR creator_email = ?1)", Some(email.clone()))
      }
    };
    let sql = format!(
      "SELECT {OCCURRENCE_COLUMNS} FROM occurrences WHERE {condition}
       ORDER BY created_at DESC"
    );

    let raws: Vec<RawOccurrence> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = match email {
          Some(e) => stmt
            .query_map(rusqlite::params![e], occurrence_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], occurrence_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOccurrence::into_occurrence).collect()
  }

  async fn update_occurrence(&self, id: Uuid, patch: OccurrencePatch) -> Result<Occurrence> {
    let id_str    = encode_uuid(id);
    let cr        = patch.cr;
    let desc      = patch.description;
    let origin    = patch.origin;
    let action    = patch.action;
    let start_str = encode_dt(patch.start_date);
    let due_str   = encode_dt(patch.due_date);
    let reporter  = patch.reporter_email;

    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE occurrences SET
             cr = ?2, description = ?3, origin = ?4, action = ?5,
             start_date = ?6, due_date = ?7, reporter_email = ?8
           WHERE occurrence_id = ?1",
          rusqlite::params![id_str, cr, desc, origin, action, start_str, due_str, reporter],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::OccurrenceNotFound(id));
    }
    self.fetch_occurrence(id).await?.ok_or(Error::OccurrenceNotFound(id))
  }

  async fn delete_occurrence(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM occurrences WHERE occurrence_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::OccurrenceNotFound(id));
    }
    Ok(())
  }

  async fn reporter_email_exists(&self, email: &str) -> Result<bool> {
    let email = email.to_owned();

    let exists: bool = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM occurrences WHERE reporter_email = ?1 LIMIT 1",
            rusqlite::params![email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        Ok(exists)
      })
      .await?;

    Ok(exists)
  }

  // ── Evidence workflow ─────────────────────────────────────────────────────

  async fn update_evidence(&self, id: Uuid, evidence: Evidence) -> Result<Occurrence> {
    let id_str     = encode_uuid(id);
    let path       = evidence.path.clone();
    let status_str = evidence.status.map(encode_evidence_status);
    let reason     = evidence.reason.clone();
    let decided    = evidence.decided_at.map(encode_dt);
    let uploaded   = evidence.uploaded_at.map(encode_dt);
    let up_name    = evidence.uploader_name.clone();
    let ap_name    = evidence.approver_name.clone();

    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE occurrences SET
             evidence_path = ?2, evidence_status = ?3, rejection_reason = ?4,
             decided_at = ?5, uploaded_at = ?6, uploader_name = ?7,
             approver_name = ?8
           WHERE occurrence_id = ?1",
          rusqlite::params![id_str, path, status_str, reason, decided, uploaded, up_name, ap_name],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::OccurrenceNotFound(id));
    }
    self.fetch_occurrence(id).await?.ok_or(Error::OccurrenceNotFound(id))
  }

  async fn append_history(&self, entry: HistoryEntry) -> Result<()> {
    let id_str     = encode_uuid(entry.history_id);
    let occ_str    = encode_uuid(entry.occurrence_id);
    let path       = entry.evidence_path;
    let uploaded   = entry.uploaded_at.map(encode_dt);
    let up_name    = entry.uploader_name;
    let reason     = entry.reason;
    let at_str     = encode_dt(entry.rejected_at);
    let ap_name    = entry.approver_name;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pdf_history (
             history_id, occurrence_id, evidence_path, uploaded_at,
             uploader_name, reason, rejected_at, approver_name
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![id_str, occ_str, path, uploaded, up_name, reason, at_str, ap_name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── History ───────────────────────────────────────────────────────────────

  async fn history_for(&self, occurrence_id: Uuid) -> Result<Vec<HistoryEntry>> {
    let occ_str = encode_uuid(occurrence_id);

    let raws: Vec<RawHistory> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT history_id, occurrence_id, evidence_path, uploaded_at,
                  uploader_name, reason, rejected_at, approver_name
           FROM pdf_history
           WHERE occurrence_id = ?1
           ORDER BY rejected_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![occ_str], |row| {
            Ok(RawHistory {
              history_id:    row.get(0)?,
              occurrence_id: row.get(1)?,
              evidence_path: row.get(2)?,
              uploaded_at:   row.get(3)?,
              uploader_name: row.get(4)?,
              reason:        row.get(5)?,
              rejected_at:   row.get(6)?,
              approver_name: row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistory::into_entry).collect()
  }
}
