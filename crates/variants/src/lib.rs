//! Gene variant wire/boundary support.
//!
//! This crate provides the **field schema**, the **canonical record model** and the
//! **JSON codec** for a patient's gene variant annotations:
//! - one canonical record per variant: an ordered map of field → string value
//! - the JSON wire format: an array of variant objects under the `variants` property
//!
//! This crate focuses on:
//! - per-field coercion (plain text, categorical values, multi-valued lists, dates)
//! - silent validation: invalid data is dropped at field or variant level, never raised
//! - deduplication by the cDNA designator
//! - projection driven by the caller's selected field names
//!
//! It performs no I/O; persistence lives in `varmap-core`.

pub mod json;
pub mod outcome;
pub mod record;
pub mod schema;

// Re-export facades
pub use json::{FieldSelection, VariantJson};
pub use record::{VariantCollection, VariantRecord};
pub use schema::{FieldKind, VariantField};

// Re-export public domain-level types
pub use outcome::{FieldDrop, FieldOutcome, VariantOutcome, VariantSkip};

/// Errors returned by the `variants` boundary crate.
///
/// Every variant of this enum aborts a whole operation. Per-variant and per-field
/// failures are reported through [`VariantOutcome`] and [`FieldOutcome`] instead.
#[derive(Debug, thiserror::Error)]
pub enum VariantError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("malformed variants JSON at {path}: {reason}")]
    MalformedJson { path: String, reason: String },
}

impl VariantError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        VariantError::MalformedJson {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Type alias for Results that can fail with a [`VariantError`].
pub type VariantResult<T> = Result<T, VariantError>;
