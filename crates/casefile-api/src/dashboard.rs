//! Handler for `GET /dashboard`.
//!
//! The report covers the full occurrence set regardless of the caller's
//! visibility tier — it is an organisation-wide summary, as in the original
//! system. Status derivation happens here at read time; nothing is stored.

use axum::{Json, extract::State};
use casefile_core::{
  dashboard::{self, DashboardReport},
  policy::{Caller, Visibility},
  store::CaseStore,
};
use chrono::Utc;

use crate::{AppState, error::ApiError};

/// `GET /dashboard`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  _caller: Caller,
) -> Result<Json<DashboardReport>, ApiError>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let occurrences = state
    .store
    .list_occurrences(&Visibility::All)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(dashboard::aggregate(&occurrences, Utc::now())))
}
