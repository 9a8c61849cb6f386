//! Per-variant and per-field results.
//!
//! Mapping degrades to "less data" rather than failing. Three levels are kept apart:
//! - a whole operation returns [`crate::VariantResult`]; an `Err` means "no data"
//! - each variant yields a [`VariantOutcome`]; a skip drops that variant only
//! - each field yields a [`FieldOutcome`]; a drop removes that field only

use crate::record::VariantRecord;
use crate::schema::VariantField;

/// Why a single field was left out of a variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldDrop {
    /// The value was empty or whitespace-only.
    Blank,
    /// A categorical value outside the field's allowed set.
    NotAllowed { value: String },
    /// A multi-value field in which no token survived the membership check.
    NoAllowedTokens,
}

/// Result of mapping one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldOutcome {
    Accepted(String),
    Dropped(FieldDrop),
}

impl FieldOutcome {
    pub fn accepted(self) -> Option<String> {
        match self {
            FieldOutcome::Accepted(value) => Some(value),
            FieldOutcome::Dropped(_) => None,
        }
    }
}

/// Why a whole variant was left out of a collection.
#[derive(Debug, thiserror::Error)]
pub enum VariantSkip {
    /// The cDNA designator was missing or blank.
    #[error("missing or blank cdna")]
    MissingPrimaryKey,
    /// A variant with this cDNA designator was already accepted.
    #[error("duplicate cdna '{0}'")]
    DuplicatePrimaryKey(String),
    /// No field survived validation.
    #[error("no valid fields")]
    Empty,
    /// A stored date did not match the strict date pattern.
    #[error("invalid date in {field}: '{value}': {source}")]
    InvalidDate {
        field: VariantField,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Result of mapping one variant.
#[derive(Debug)]
pub enum VariantOutcome<T = VariantRecord> {
    Accepted(T),
    Skipped(VariantSkip),
}

impl<T> VariantOutcome<T> {
    pub fn accepted(self) -> Option<T> {
        match self {
            VariantOutcome::Accepted(value) => Some(value),
            VariantOutcome::Skipped(_) => None,
        }
    }
}
