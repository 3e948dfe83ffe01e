//! Handlers for the admin-only `/users` endpoints.
//!
//! Every route here sits behind [`policy::require_admin`]; a non-admin
//! caller gets a 403 before any lookup or mutation happens.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use casefile_core::{
  policy::{self, Caller},
  store::CaseStore,
  user::{PublicUser, UserPatch},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /users`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<Vec<PublicUser>>, ApiError>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  policy::require_admin(&caller)?;

  let users = state.store.list_users().await.map_err(ApiError::store)?;
  Ok(Json(users.iter().map(|u| u.public()).collect()))
}

/// `PUT /users/:id` — partial update of name, email, type, and approval.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(patch): Json<UserPatch>,
) -> Result<Json<PublicUser>, ApiError>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  policy::require_admin(&caller)?;

  let target = state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

  // Uniqueness excluding self, checked up front for a clean 400.
  if let Some(email) = &patch.email
    && *email != target.email
    && state
      .store
      .find_user_by_email(email)
      .await
      .map_err(ApiError::store)?
      .is_some()
  {
    return Err(ApiError::BadRequest("email already registered".into()));
  }

  let updated = state
    .store
    .update_user(id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated.public()))
}

/// `DELETE /users/:id` — the user's occurrences are left untouched; their
/// email references simply go stale.
pub async fn destroy<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  policy::require_admin(&caller)?;

  if state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::NotFound(format!("user {id} not found")));
  }

  state.store.delete_user(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
