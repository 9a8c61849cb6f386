//! Persistence store interface for raw variant records.
//!
//! The store keeps one document per patient. A document holds lists of raw, keyed
//! records grouped by record type; each record field carries a typed raw value.
//!
//! Implementations:
//! - [`InMemoryVariantStore`]: process-local documents, for tests and embedding
//! - [`FileVariantStore`]: one YAML document per patient in a sharded directory tree

mod file;
mod memory;

pub use file::FileVariantStore;
pub use memory::{InMemoryVariantStore, StoredDocument};

use crate::PatientResult;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use varmap_types::NonEmptyText;
use varmap_uuid::PatientId;

/// A stored field value. `None` inside a variant is a stored null.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RawValue {
    Text(Option<String>),
    List(Option<Vec<String>>),
    Date(Option<NaiveDateTime>),
}

impl RawValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Text(_) => "text",
            RawValue::List(_) => "list",
            RawValue::Date(_) => "date",
        }
    }
}

/// One persisted record: field name → raw value.
///
/// Names outside the variant schema are kept by the store but ignored by the mapper.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: RawValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Storage of raw keyed records per patient.
pub trait VariantStore {
    /// Fetch all records of `record_type` for `patient`.
    ///
    /// Returns `Ok(None)` when the patient has no document.
    fn get_records(
        &self,
        patient: &PatientId,
        record_type: &str,
    ) -> PatientResult<Option<Vec<RawRecord>>>;

    /// Replace every record of `record_type` for `patient` and commit the document with
    /// `comment`. Either the whole replacement is committed or nothing changes.
    fn replace_records(
        &self,
        patient: &PatientId,
        record_type: &str,
        records: Vec<RawRecord>,
        comment: &NonEmptyText,
    ) -> PatientResult<()>;
}

impl<S: VariantStore + ?Sized> VariantStore for Arc<S> {
    fn get_records(
        &self,
        patient: &PatientId,
        record_type: &str,
    ) -> PatientResult<Option<Vec<RawRecord>>> {
        (**self).get_records(patient, record_type)
    }

    fn replace_records(
        &self,
        patient: &PatientId,
        record_type: &str,
        records: Vec<RawRecord>,
        comment: &NonEmptyText,
    ) -> PatientResult<()> {
        (**self).replace_records(patient, record_type, records, comment)
    }
}

impl<S: VariantStore + ?Sized> VariantStore for &S {
    fn get_records(
        &self,
        patient: &PatientId,
        record_type: &str,
    ) -> PatientResult<Option<Vec<RawRecord>>> {
        (**self).get_records(patient, record_type)
    }

    fn replace_records(
        &self,
        patient: &PatientId,
        record_type: &str,
        records: Vec<RawRecord>,
        comment: &NonEmptyText,
    ) -> PatientResult<()> {
        (**self).replace_records(patient, record_type, records, comment)
    }
}
