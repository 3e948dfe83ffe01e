//! Handlers for `/products` endpoints (occurrence CRUD).
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/products` | Filtered by the caller's visibility |
//! | `POST`   | `/products` | Multipart: occurrence fields + optional `pdf` |
//! | `PUT`    | `/products/:id` | Data fields only; owner/creator/admin |
//! | `DELETE` | `/products/:id` | Owner/creator/admin |

use axum::{
  Json,
  extract::{Multipart, Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use bytes::Bytes;
use casefile_core::{
  occurrence::{NewOccurrence, Occurrence, OccurrencePatch},
  policy::{self, Caller, Visibility},
  store::CaseStore,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::{AppState, error::ApiError, evidence};

/// Accept either a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date (the
/// form-input shape), interpreted as midnight UTC.
pub(crate) fn parse_date(field: &str, value: &str) -> Result<DateTime<Utc>, ApiError> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
    return Ok(dt.with_timezone(&Utc));
  }
  if let Ok(date) = value.parse::<NaiveDate>() {
    return Ok(date.and_time(NaiveTime::MIN).and_utc());
  }
  Err(ApiError::BadRequest(format!("{field}: invalid date {value:?}")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /products` — newest first, filtered by the caller's visibility.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<Vec<Occurrence>>, ApiError>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let visibility = Visibility::for_caller(&caller);
  let occurrences = state
    .store
    .list_occurrences(&visibility)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(occurrences))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct CreateForm {
  cr:             Option<String>,
  description:    Option<String>,
  origin:         Option<String>,
  action:         Option<String>,
  start_date:     Option<String>,
  due_date:       Option<String>,
  reporter_email: Option<String>,
  pdf:            Option<Bytes>,
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
  match value {
    Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
    _ => Err(ApiError::BadRequest(format!("{field} is required"))),
  }
}

/// `POST /products` — multipart form. All data fields required; the `pdf`
/// part is optional (PDF mime, bounded size). The file lands on disk before
/// the row is written; the two are not transactional, as in the original
/// system.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut form = CreateForm::default();

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
  {
    let read_text = |name: &'static str| {
      ApiError::BadRequest(format!("cannot read field {name}"))
    };
    match field.name() {
      Some("cr") => form.cr = Some(field.text().await.map_err(|_| read_text("cr"))?),
      Some("description") => {
        form.description =
          Some(field.text().await.map_err(|_| read_text("description"))?);
      }
      Some("origin") => {
        form.origin = Some(field.text().await.map_err(|_| read_text("origin"))?);
      }
      Some("action") => {
        form.action = Some(field.text().await.map_err(|_| read_text("action"))?);
      }
      Some("start_date") => {
        form.start_date =
          Some(field.text().await.map_err(|_| read_text("start_date"))?);
      }
      Some("due_date") => {
        form.due_date = Some(field.text().await.map_err(|_| read_text("due_date"))?);
      }
      Some("reporter_email") => {
        form.reporter_email =
          Some(field.text().await.map_err(|_| read_text("reporter_email"))?);
      }
      Some("pdf") => form.pdf = Some(evidence::read_pdf_field(field).await?),
      // Unknown parts are ignored, matching lenient form handling.
      _ => {}
    }
  }

  let cr = required("cr", form.cr)?;
  let description = required("description", form.description)?;
  let origin = required("origin", form.origin)?;
  let action = required("action", form.action)?;
  let start_date = parse_date("start_date", &required("start_date", form.start_date)?)?;
  let due_date = parse_date("due_date", &required("due_date", form.due_date)?)?;
  let reporter_email = required("reporter_email", form.reporter_email)?;
  if !reporter_email.contains('@') {
    return Err(ApiError::BadRequest("reporter_email: not an email".into()));
  }

  // Validation is complete: only now does anything touch disk.
  let evidence_path = match form.pdf {
    Some(bytes) => Some(state.evidence.save_pdf(&bytes).await?),
    None => None,
  };

  let occurrence = state
    .store
    .create_occurrence(NewOccurrence {
      cr,
      description,
      origin,
      action,
      start_date,
      due_date,
      reporter_email,
      creator_email: caller.email.clone(),
      creator_name: caller.name.clone(),
      evidence_path,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    occurrence = %occurrence.occurrence_id,
    creator = %caller.email,
    "occurrence registered"
  );

  Ok((StatusCode::CREATED, Json(occurrence)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /products/:id` — JSON body with the full set of data fields.
/// Evidence fields are untouchable here; they move only via the workflow
/// routes.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(patch): Json<OccurrencePatch>,
) -> Result<Json<Occurrence>, ApiError>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let occurrence = fetch(&state, id).await?;
  if !policy::can_modify(&caller, &occurrence) {
    return Err(ApiError::Forbidden(
      "only the reporter, the creator, or an admin may edit".into(),
    ));
  }

  let updated = state
    .store
    .update_occurrence(id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /products/:id`
pub async fn destroy<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let occurrence = fetch(&state, id).await?;
  if !policy::can_modify(&caller, &occurrence) {
    return Err(ApiError::Forbidden(
      "only the reporter, the creator, or an admin may delete".into(),
    ));
  }

  state
    .store
    .delete_occurrence(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// Shared 404-mapping lookup.
pub(crate) async fn fetch<S>(
  state: &AppState<S>,
  id: Uuid,
) -> Result<Occurrence, ApiError>
where
  S: CaseStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_occurrence(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("occurrence {id} not found")))
}
