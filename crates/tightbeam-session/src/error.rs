//! Session-level error type (spec.md §7).
//!
//! Wraps the lower crates' error types for the one call that is allowed to
//! fail outright: building a session (`prepare_broadcast`, `reset_receiver`)
//! with invalid metadata. Everything ingested afterwards is reported through
//! `Status` and a rejection counter instead of an `Err` (spec.md §7
//! propagation policy).

use thiserror::Error;
use tightbeam_core::CoreError;

/// Errors that can abort session construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The requested metadata or partition layout violated an invariant.
    #[error(transparent)]
    InvalidMetadata(#[from] CoreError),
}
