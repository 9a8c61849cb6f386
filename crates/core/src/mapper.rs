//! Variant mapper facade.
//!
//! Combines the Store Reader, Store Writer and JSON codec behind one handle. Public
//! operations never return errors: a failed operation is logged and degrades to
//! "no data" (reads) or a no-op (writes).

use crate::config::CoreConfig;
use crate::constants::CONTROLLER_NAME;
use crate::reader::load_variants;
use crate::store::VariantStore;
use crate::writer::save_variants;
use serde_json::{Map, Value};
use variants::{FieldSelection, VariantCollection, VariantJson};
use varmap_types::NonEmptyText;
use varmap_uuid::PatientId;

/// Maps a patient's gene variants between the store, the canonical model and JSON.
#[derive(Clone, Debug)]
pub struct VariantMapper<S> {
    store: S,
    save_comment: NonEmptyText,
}

impl<S: VariantStore> VariantMapper<S> {
    pub fn new(store: S, cfg: &CoreConfig) -> Self {
        Self {
            store,
            save_comment: cfg.save_comment().clone(),
        }
    }

    /// The data set name, also the JSON property the variants are written under.
    pub fn name(&self) -> &'static str {
        CONTROLLER_NAME
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the patient's stored variants.
    ///
    /// Returns `None` when there is nothing to load or the document cannot be read.
    pub fn load(&self, patient: &PatientId) -> Option<VariantCollection> {
        match load_variants(&self.store, patient) {
            Ok(variants) => variants,
            Err(e) => {
                tracing::error!(patient = %patient, error = %e, "Could not load variants");
                None
            }
        }
    }

    /// Replace the patient's stored variants with `variants`.
    ///
    /// Does nothing when `variants` is absent or not indexed.
    pub fn save(&self, patient: &PatientId, variants: Option<&VariantCollection>) {
        let Some(variants) = variants.filter(|v| v.is_indexed()) else {
            return;
        };

        match save_variants(&self.store, patient, variants, &self.save_comment) {
            Ok(written) => {
                tracing::debug!(patient = %patient, written, "saved variants");
            }
            Err(e) => {
                tracing::error!(patient = %patient, error = %e, "Failed to save variants");
            }
        }
    }

    /// Decode the `variants` array of a JSON document.
    ///
    /// Returns `None` when the property is absent, nothing survives validation, or the
    /// input is malformed.
    pub fn read_json(&self, json: &Value) -> Option<VariantCollection> {
        match VariantJson::decode(json) {
            Ok(variants) => variants,
            Err(e) => {
                tracing::error!(error = %e, "Could not load variants from JSON");
                None
            }
        }
    }

    /// As [`VariantMapper::read_json`], parsing `text` first.
    pub fn read_json_str(&self, text: &str) -> Option<VariantCollection> {
        match VariantJson::decode_str(text) {
            Ok(variants) => variants,
            Err(e) => {
                tracing::error!(error = %e, "Could not load variants from JSON");
                None
            }
        }
    }

    /// Append the patient's stored variants to `json`.
    ///
    /// `selected` is the caller's selected field names; `None` means no restriction.
    /// Returns the number of variants emitted.
    pub fn write_json(
        &self,
        patient: &PatientId,
        json: &mut Map<String, Value>,
        selected: Option<&FieldSelection>,
    ) -> usize {
        if selected.is_some_and(|s| !s.enables_variants()) {
            return 0;
        }

        match self.load(patient) {
            Some(variants) => VariantJson::encode(&variants, json, selected),
            None => 0,
        }
    }
}
