//! HTTP Basic-auth extractor resolving the caller identity.
//!
//! Credentials are the user's email and password, verified against the
//! argon2 hash on the account. The extractor also applies the registration
//! gate: an account with `approved == No` authenticates but is refused.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use casefile_core::{policy::Caller, store::CaseStore};

use crate::{AppState, error::ApiError};

/// Pull `(email, password)` out of an `Authorization: Basic` header.
fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

  let (email, password) =
    creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((email.to_owned(), password.to_owned()))
}

/// Verify credentials against the user directory and return the caller
/// identity. Used by every authenticated handler via the extractor below.
pub async fn resolve_caller<S>(
  headers: &HeaderMap,
  state: &AppState<S>,
) -> Result<Caller, ApiError>
where
  S: CaseStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let (email, password) = basic_credentials(headers)?;

  // Registration stores emails lowercased; accept any casing at login.
  let user = state
    .store
    .find_user_by_email(&email.to_lowercase())
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash =
    PasswordHash::new(&user.password_hash).map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  if !user.is_access_approved() {
    return Err(ApiError::Forbidden(
      "account awaiting administrator approval".into(),
    ));
  }

  Ok(Caller::of(&user))
}

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    resolve_caller(&parts.headers, state).await
  }
}
