//! Evidence handling: the PDF file area and the workflow routes.
//!
//! | Method       | Path | Notes |
//! |--------------|------|-------|
//! | `POST`/`PUT` | `/products/:id/pdf` | Replace the file; resets to pending |
//! | `PUT`        | `/products/:id/approve` | Pending only |
//! | `PUT`        | `/products/:id/reject`  | Pending only; reason required |
//! | `GET`        | `/products/:id/pdf-history` | Rejections, newest first |

use std::path::PathBuf;

use axum::{
  Json,
  extract::{Multipart, Path, State, multipart::Field},
};
use bytes::Bytes;
use casefile_core::{
  history::HistoryEntry,
  occurrence::Occurrence,
  policy::Caller,
  store::CaseStore,
  workflow,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, occurrences::fetch};

/// Upper bound on an uploaded evidence file.
pub const MAX_PDF_BYTES: usize = 8 * 1024 * 1024;

const PDF_MIME: &str = "application/pdf";

// ─── File area ───────────────────────────────────────────────────────────────

/// The on-disk evidence area. Records reference files by relative path
/// string, not content hash, so the same layout serves any web tier.
#[derive(Clone)]
pub struct EvidenceDir {
  root: PathBuf,
}

impl EvidenceDir {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// Write a PDF under a fresh name and return the relative path to store
  /// on the record. A failed write propagates; nothing is recorded for a
  /// file that never landed.
  pub async fn save_pdf(&self, bytes: &[u8]) -> Result<String, ApiError> {
    let relative = format!("products_pdfs/{}.pdf", Uuid::new_v4());
    let dir = self.root.join("products_pdfs");
    tokio::fs::create_dir_all(&dir)
      .await
      .map_err(ApiError::store)?;
    tokio::fs::write(self.root.join(&relative), bytes)
      .await
      .map_err(ApiError::store)?;
    Ok(relative)
  }
}

/// Validate and drain one multipart `pdf` field.
pub(crate) async fn read_pdf_field(field: Field<'_>) -> Result<Bytes, ApiError> {
  if field.content_type() != Some(PDF_MIME) {
    return Err(ApiError::BadRequest("pdf: only PDF files are accepted".into()));
  }
  let bytes = field
    .bytes()
    .await
    .map_err(|_| ApiError::PayloadTooLarge)?;
  if bytes.len() > MAX_PDF_BYTES {
    return Err(ApiError::PayloadTooLarge);
  }
  if bytes.is_empty() {
    return Err(ApiError::BadRequest("pdf: empty file".into()));
  }
  Ok(bytes)
}

// ─── Replace ─────────────────────────────────────────────────────────────────

/// `POST|PUT /products/:id/pdf` — multipart with a required `pdf` part.
/// Valid from every state; any prior decision is cleared and the occurrence
/// re-enters pending approval.
pub async fn replace<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  mut multipart: Multipart,
) -> Result<Json<Occurrence>, ApiError>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut occurrence = fetch(&state, id).await?;

  let mut pdf: Option<Bytes> = None;
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
  {
    if field.name() == Some("pdf") {
      pdf = Some(read_pdf_field(field).await?);
    }
  }
  let bytes = pdf.ok_or_else(|| ApiError::BadRequest("pdf is required".into()))?;

  let path = state.evidence.save_pdf(&bytes).await?;
  workflow::attach_evidence(&mut occurrence, path, caller.name.clone(), Utc::now());

  let stored = state
    .store
    .update_evidence(id, occurrence.evidence)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(occurrence = %id, uploader = %caller.email, "evidence replaced");
  Ok(Json(stored))
}

// ─── Approve / reject ────────────────────────────────────────────────────────

/// `PUT /products/:id/approve`
pub async fn approve<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Occurrence>, ApiError>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut occurrence = fetch(&state, id).await?;
  workflow::approve_evidence(&mut occurrence, caller.name.clone(), Utc::now())?;

  let stored = state
    .store
    .update_evidence(id, occurrence.evidence)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(occurrence = %id, approver = %caller.email, "evidence approved");
  Ok(Json(stored))
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
  pub reason: String,
}

/// `PUT /products/:id/reject` — body: `{"reason":"..."}`.
///
/// The occurrence update and the history append are two writes, not one
/// transaction; an interrupted request can record the rejection without its
/// audit row. Inherited behaviour, kept as-is.
pub async fn reject<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<RejectBody>,
) -> Result<Json<Occurrence>, ApiError>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut occurrence = fetch(&state, id).await?;
  let entry = workflow::reject_evidence(
    &mut occurrence,
    caller.name.clone(),
    body.reason,
    Utc::now(),
  )?;

  let stored = state
    .store
    .update_evidence(id, occurrence.evidence)
    .await
    .map_err(ApiError::store)?;
  state
    .store
    .append_history(entry)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(occurrence = %id, approver = %caller.email, "evidence rejected");
  Ok(Json(stored))
}

// ─── History ─────────────────────────────────────────────────────────────────

/// `GET /products/:id/pdf-history` — rejection entries, newest first.
pub async fn history<S>(
  State(state): State<AppState<S>>,
  _caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // 404 for a missing occurrence, even though orphaned history would
  // otherwise be readable.
  fetch(&state, id).await?;

  let entries = state
    .store
    .history_for(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entries))
}
