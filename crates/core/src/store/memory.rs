//! In-memory variant store.

use super::{RawRecord, VariantStore};
use crate::{PatientError, PatientResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use varmap_types::NonEmptyText;
use varmap_uuid::{PatientId, RevisionId};

/// A committed patient document.
#[derive(Clone, Debug)]
pub struct StoredDocument {
    pub revision: RevisionId,
    pub comment: NonEmptyText,
    pub objects: BTreeMap<String, Vec<RawRecord>>,
}

/// Process-local store keeping one [`StoredDocument`] per patient.
#[derive(Debug, Default)]
pub struct InMemoryVariantStore {
    documents: Mutex<HashMap<PatientId, StoredDocument>>,
}

impl InMemoryVariantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the patient's committed document, if any.
    pub fn document(&self, patient: &PatientId) -> PatientResult<Option<StoredDocument>> {
        let documents = self.documents.lock().map_err(|_| PatientError::LockPoisoned)?;
        Ok(documents.get(patient).cloned())
    }
}

impl VariantStore for InMemoryVariantStore {
    fn get_records(
        &self,
        patient: &PatientId,
        record_type: &str,
    ) -> PatientResult<Option<Vec<RawRecord>>> {
        let documents = self.documents.lock().map_err(|_| PatientError::LockPoisoned)?;
        Ok(documents.get(patient).map(|doc| {
            doc.objects
                .get(record_type)
                .cloned()
                .unwrap_or_default()
        }))
    }

    fn replace_records(
        &self,
        patient: &PatientId,
        record_type: &str,
        records: Vec<RawRecord>,
        comment: &NonEmptyText,
    ) -> PatientResult<()> {
        let mut documents = self.documents.lock().map_err(|_| PatientError::LockPoisoned)?;

        let previous = documents.get(patient);
        let revision = RevisionId::generate(previous.map(|doc| &doc.revision));
        let mut objects = previous.map(|doc| doc.objects.clone()).unwrap_or_default();
        objects.insert(record_type.to_string(), records);

        documents.insert(
            patient.clone(),
            StoredDocument {
                revision,
                comment: comment.clone(),
                objects,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RawValue;

    fn comment() -> NonEmptyText {
        NonEmptyText::new("Updated variants from JSON").unwrap()
    }

    #[test]
    fn missing_document_reads_as_none() {
        let store = InMemoryVariantStore::new();
        let records = store
            .get_records(&PatientId::new(), "GeneVariantClass")
            .expect("read");
        assert!(records.is_none());
    }

    #[test]
    fn replace_overwrites_only_the_given_record_type() {
        let store = InMemoryVariantStore::new();
        let patient = PatientId::new();
        let record: RawRecord = [("cdna", RawValue::Text(Some("c.1A>G".into())))]
            .into_iter()
            .collect();

        store
            .replace_records(&patient, "OtherClass", vec![record.clone()], &comment())
            .expect("seed other type");
        store
            .replace_records(&patient, "GeneVariantClass", vec![record.clone()], &comment())
            .expect("first save");
        store
            .replace_records(&patient, "GeneVariantClass", vec![], &comment())
            .expect("second save");

        let variants = store
            .get_records(&patient, "GeneVariantClass")
            .expect("read")
            .expect("document exists");
        assert!(variants.is_empty());

        let other = store
            .get_records(&patient, "OtherClass")
            .expect("read")
            .expect("document exists");
        assert_eq!(other, vec![record]);
    }

    #[test]
    fn each_commit_advances_the_revision() {
        let store = InMemoryVariantStore::new();
        let patient = PatientId::new();

        store
            .replace_records(&patient, "GeneVariantClass", vec![], &comment())
            .expect("first save");
        let first = store.document(&patient).unwrap().expect("document").revision;

        store
            .replace_records(&patient, "GeneVariantClass", vec![], &comment())
            .expect("second save");
        let second = store.document(&patient).unwrap().expect("document");

        assert!(second.revision.timestamp() > first.timestamp());
        assert_eq!(second.comment.as_str(), "Updated variants from JSON");
    }
}
