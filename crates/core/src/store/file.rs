//! YAML file-backed variant store.
//!
//! Each patient has one document in a sharded directory structure:
//!
//! ```text
//! variants/
//!   <s1>/
//!     <s2>/
//!       <patient-id>/
//!         variants.yaml    # records by type, last comment and revision
//! ```
//!
//! A commit renders the full document to a temporary file and renames it over the
//! previous one, so readers see either the old or the new document. Directories created
//! by a failed commit are removed again.

use super::{RawRecord, VariantStore};
use crate::config::CoreConfig;
use crate::constants::{VARIANTS_DOCUMENT_FILENAME, VARIANTS_DOCUMENT_TMP_FILENAME};
use crate::{PatientError, PatientResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use varmap_types::NonEmptyText;
use varmap_uuid::{PatientId, RevisionId};

/// Store keeping one YAML document per patient under [`CoreConfig::variants_dir`].
#[derive(Clone, Debug)]
pub struct FileVariantStore {
    cfg: Arc<CoreConfig>,
}

/// On-disk representation of a patient's variant document.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct VariantDocumentWire {
    patient_id: PatientId,
    revision: RevisionId,
    updated_at: DateTime<Utc>,
    comment: NonEmptyText,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    objects: BTreeMap<String, Vec<RawRecord>>,
}

impl FileVariantStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Path of the patient's variant document.
    pub fn document_path(&self, patient: &PatientId) -> PathBuf {
        self.patient_dir(patient).join(VARIANTS_DOCUMENT_FILENAME)
    }

    fn patient_dir(&self, patient: &PatientId) -> PathBuf {
        patient.sharded_dir(&self.cfg.variants_dir())
    }

    fn read_document(&self, patient: &PatientId) -> PatientResult<Option<VariantDocumentWire>> {
        let path = self.document_path(patient);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PatientError::FileRead(e)),
        };

        let document = parse_document(&text)?;
        if &document.patient_id != patient {
            return Err(PatientError::Translation(format!(
                "variant document at {} belongs to patient {}, expected {}",
                path.display(),
                document.patient_id,
                patient
            )));
        }
        Ok(Some(document))
    }

    fn write_document(&self, patient: &PatientId, document: &VariantDocumentWire) -> PatientResult<()> {
        let rendered = serde_yaml::to_string(document).map_err(PatientError::YamlSerialization)?;

        let patient_dir = self.patient_dir(patient);
        let created_dirs = create_missing_dirs(&patient_dir)?;

        let tmp_path = patient_dir.join(VARIANTS_DOCUMENT_TMP_FILENAME);
        let final_path = patient_dir.join(VARIANTS_DOCUMENT_FILENAME);

        let result = fs::write(&tmp_path, rendered)
            .and_then(|()| fs::rename(&tmp_path, &final_path))
            .map_err(PatientError::FileWrite);

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
            for dir in created_dirs.iter().rev() {
                let _ = fs::remove_dir(dir);
            }
        }
        result
    }
}

impl VariantStore for FileVariantStore {
    fn get_records(
        &self,
        patient: &PatientId,
        record_type: &str,
    ) -> PatientResult<Option<Vec<RawRecord>>> {
        let document = self.read_document(patient)?;
        Ok(document.map(|mut doc| doc.objects.remove(record_type).unwrap_or_default()))
    }

    fn replace_records(
        &self,
        patient: &PatientId,
        record_type: &str,
        records: Vec<RawRecord>,
        comment: &NonEmptyText,
    ) -> PatientResult<()> {
        let previous = self.read_document(patient)?;

        let revision = RevisionId::generate(previous.as_ref().map(|doc| &doc.revision));
        let mut objects = previous.map(|doc| doc.objects).unwrap_or_default();
        objects.insert(record_type.to_string(), records);

        let document = VariantDocumentWire {
            patient_id: patient.clone(),
            revision,
            updated_at: Utc::now(),
            comment: comment.clone(),
            objects,
        };

        self.write_document(patient, &document)?;
        tracing::info!(
            patient = %patient,
            revision = %document.revision,
            comment = %comment,
            "committed variant document"
        );
        Ok(())
    }
}

/// Parse a variant document, reporting the YAML path of the first mismatch.
fn parse_document(yaml_text: &str) -> PatientResult<VariantDocumentWire> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
    serde_path_to_error::deserialize::<_, VariantDocumentWire>(deserializer).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() {
            "<root>"
        } else {
            path.as_str()
        };
        PatientError::Translation(format!(
            "variant document schema mismatch at {path}: {source}"
        ))
    })
}

/// Create `dir` and any missing ancestors, returning the created directories
/// shallowest first.
fn create_missing_dirs(dir: &Path) -> PatientResult<Vec<PathBuf>> {
    let mut missing: Vec<PathBuf> = dir
        .ancestors()
        .take_while(|ancestor| !ancestor.as_os_str().is_empty() && !ancestor.exists())
        .map(Path::to_path_buf)
        .collect();
    missing.reverse();

    let mut created = Vec::with_capacity(missing.len());
    for path in missing {
        match fs::create_dir(&path) {
            Ok(()) => created.push(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => {
                for dir in created.iter().rev() {
                    let _ = fs::remove_dir(dir);
                }
                return Err(PatientError::StoreDirCreation(e));
            }
        }
    }
    Ok(created)
}
