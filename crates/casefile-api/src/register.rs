//! Handler for `POST /register` — the only unauthenticated endpoint.
//!
//! New accounts are always `Standard`. Approval is automatic when some
//! occurrence already names the registering email as its reporter; otherwise
//! the account waits for an administrator.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use casefile_core::{
  store::CaseStore,
  user::{Approval, NewUser, UserType},
};
use rand_core::OsRng;
use serde::Deserialize;

use crate::{AppState, error::ApiError};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:     String,
  pub email:    String,
  pub password: String,
}

/// `POST /register` — body: `{"name":"...","email":"...","password":"..."}`.
/// Returns 201 and the public view of the created account.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CaseStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let name = body.name.trim().to_owned();
  if name.is_empty() {
    return Err(ApiError::BadRequest("name is required".into()));
  }

  let email = body.email.trim().to_lowercase();
  if email.is_empty() || !email.contains('@') {
    return Err(ApiError::BadRequest("a valid email is required".into()));
  }
  if body.password.len() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }

  if state
    .store
    .find_user_by_email(&email)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::BadRequest("email already registered".into()));
  }

  // Auto-approve accounts whose email is already named as a reporter.
  let approved = if state
    .store
    .reporter_email_exists(&email)
    .await
    .map_err(ApiError::store)?
  {
    Approval::Yes
  } else {
    Approval::No
  };

  let salt = SaltString::generate(&mut OsRng);
  let password_hash = Argon2::default()
    .hash_password(body.password.as_bytes(), &salt)
    .map_err(|e| ApiError::BadRequest(format!("unusable password: {e}")))?
    .to_string();

  let user = state
    .store
    .create_user(NewUser {
      name,
      email,
      password_hash,
      user_type: UserType::Standard,
      approved,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(email = %user.email, approved = ?user.approved, "account registered");

  Ok((StatusCode::CREATED, Json(user.public())))
}
