//! Core types and trait definitions for the Casefile occurrence tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod dashboard;
pub mod error;
pub mod history;
pub mod occurrence;
pub mod policy;
pub mod store;
pub mod user;
pub mod workflow;

pub use error::{Error, Result};
