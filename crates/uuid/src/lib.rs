//! Patient identifiers and sharded-path utilities.
//!
//! Variant documents are stored per patient under sharded directories derived from the
//! patient's identifier. To keep path derivation deterministic, identifiers use a
//! *canonical* UUID representation: **32 lowercase hexadecimal characters** (no hyphens).
//!
//! This crate provides:
//! - [`PatientId`], which guarantees the canonical format once constructed and derives the
//!   sharded directory for a patient.
//! - [`RevisionId`], a time-prefixed identifier stamped on every committed store document.
//!
//! ## Sharded directory layout
//! For a canonical UUID `u`, documents live under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! Example:
//! `patient_data/variants/55/0e/550e8400e29b41d4a716446655440000/`

mod patient_id;
mod revision;

pub use patient_id::PatientId;
pub use revision::RevisionId;

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
