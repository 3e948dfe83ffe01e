//! JSON REST API for Casefile.
//!
//! Exposes an axum [`Router`] backed by any [`casefile_core::store::CaseStore`].
//! TLS and transport concerns are the caller's responsibility. Every
//! authenticated handler receives an explicit [`Caller`] identity resolved
//! from HTTP Basic credentials against the user directory; there is no
//! ambient auth context.
//!
//! # Mounting
//!
//! ```rust,ignore
//! axum::serve(listener, casefile_api::api_router(state)).await?;
//! ```

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod evidence;
pub mod occurrences;
pub mod register;
pub mod users;


use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post, put},
};
use casefile_core::store::CaseStore;

pub use error::ApiError;
pub use evidence::EvidenceDir;

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CaseStore> {
  pub store:    Arc<S>,
  pub evidence: Arc<EvidenceDir>,
}

/// Headroom over [`evidence::MAX_PDF_BYTES`] for the multipart framing and
/// the occurrence form fields sharing the body.
const BODY_LIMIT: usize = evidence::MAX_PDF_BYTES + 1024 * 1024;

/// Build a fully-materialised API router for `state`.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: CaseStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Registration (unauthenticated)
    .route("/register", post(register::handler::<S>))
    // Occurrences
    .route(
      "/products",
      get(occurrences::list::<S>).post(occurrences::create::<S>),
    )
    .route(
      "/products/{id}",
      put(occurrences::update::<S>).delete(occurrences::destroy::<S>),
    )
    // Evidence workflow
    .route(
      "/products/{id}/pdf",
      post(evidence::replace::<S>).put(evidence::replace::<S>),
    )
    .route("/products/{id}/approve", put(evidence::approve::<S>))
    .route("/products/{id}/reject", put(evidence::reject::<S>))
    .route("/products/{id}/pdf-history", get(evidence::history::<S>))
    // Dashboard
    .route("/dashboard", get(dashboard::handler::<S>))
    // User directory (admin only)
    .route("/users", get(users::list::<S>))
    .route(
      "/users/{id}",
      put(users::update::<S>).delete(users::destroy::<S>),
    )
    .layer(DefaultBodyLimit::max(BODY_LIMIT))
    .with_state(state)
}
