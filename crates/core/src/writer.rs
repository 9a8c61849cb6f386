//! Store Writer: canonical variant records → raw persisted records.

use crate::store::{RawRecord, RawValue, VariantStore};
use crate::PatientResult;
use chrono::NaiveTime;
use variants::record::split_tokens;
use variants::schema::{parse_date, VARIANT_RECORD_TYPE};
use variants::{FieldKind, VariantCollection, VariantOutcome, VariantRecord, VariantSkip};
use varmap_types::NonEmptyText;
use varmap_uuid::PatientId;

/// Replace all stored variants of `patient` with `collection` and commit once.
///
/// Variants that cannot be encoded are logged and left out; the rest are still saved.
/// Returns the number of variants written.
///
/// # Errors
///
/// Returns an error if reading or committing the patient's document fails. Nothing is
/// written in that case.
pub(crate) fn save_variants<S: VariantStore + ?Sized>(
    store: &S,
    patient: &PatientId,
    collection: &VariantCollection,
    comment: &NonEmptyText,
) -> PatientResult<usize> {
    let mut raw_records = Vec::with_capacity(collection.len());
    for (index, record) in collection.iter().enumerate() {
        match encode_record(record) {
            VariantOutcome::Accepted(raw) => raw_records.push(raw),
            VariantOutcome::Skipped(skip) => {
                tracing::error!(
                    patient = %patient,
                    index,
                    reason = %skip,
                    "Failed to save a specific variant"
                );
            }
        }
    }

    let written = raw_records.len();
    store.replace_records(patient, VARIANT_RECORD_TYPE, raw_records, comment)?;
    Ok(written)
}

/// Encode one canonical record for storage.
///
/// Dates must match the strict `yyyy-MM-dd` pattern; the first one that does not skips
/// the whole variant. The multi-value field is stored as a list of tokens. Everything
/// else is stored as text without re-validation.
pub fn encode_record(record: &VariantRecord) -> VariantOutcome<RawRecord> {
    let mut raw = RawRecord::new();
    for (field, value) in record.iter() {
        let encoded = match field.kind() {
            FieldKind::Date => match parse_date(value) {
                Ok(date) => RawValue::Date(Some(date.and_time(NaiveTime::MIN))),
                Err(source) => {
                    return VariantOutcome::Skipped(VariantSkip::InvalidDate {
                        field,
                        value: value.to_string(),
                        source,
                    })
                }
            },
            FieldKind::MultiValueEnum(_) => RawValue::List(Some(
                split_tokens(value).into_iter().map(str::to_string).collect(),
            )),
            FieldKind::PlainText | FieldKind::SingleValueEnum(_) => {
                RawValue::Text(Some(value.to_string()))
            }
        };
        raw.set(field.internal_name(), encoded);
    }
    VariantOutcome::Accepted(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::load_variants;
    use crate::store::InMemoryVariantStore;
    use crate::PatientError;
    use chrono::NaiveDate;
    use variants::VariantField;

    fn comment() -> NonEmptyText {
        NonEmptyText::new("Updated variants from JSON").unwrap()
    }

    fn variant(fields: &[(VariantField, &str)]) -> VariantRecord {
        fields
            .iter()
            .map(|(field, value)| (*field, value.to_string()))
            .collect()
    }

    struct FailingCommitStore;

    impl VariantStore for FailingCommitStore {
        fn get_records(
            &self,
            _patient: &PatientId,
            _record_type: &str,
        ) -> PatientResult<Option<Vec<RawRecord>>> {
            Ok(None)
        }

        fn replace_records(
            &self,
            _patient: &PatientId,
            _record_type: &str,
            _records: Vec<RawRecord>,
            _comment: &NonEmptyText,
        ) -> PatientResult<()> {
            Err(PatientError::LockPoisoned)
        }
    }

    #[test]
    fn encodes_each_kind() {
        let record = variant(&[
            (VariantField::Cdna, "c.123A>T"),
            (VariantField::Zygosity, "Heterozygous"),
            (VariantField::Evidence, "|rare|reported"),
            (VariantField::DateSequenced, "2024-03-05"),
        ]);

        let raw = encode_record(&record).accepted().expect("accepted");
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert_eq!(raw.get("cdna"), Some(&RawValue::Text(Some("c.123A>T".into()))));
        assert_eq!(
            raw.get("zygosity"),
            Some(&RawValue::Text(Some("Heterozygous".into())))
        );
        assert_eq!(
            raw.get("evidence"),
            Some(&RawValue::List(Some(vec!["rare".into(), "reported".into()])))
        );
        assert_eq!(raw.get("dateSequenced"), Some(&RawValue::Date(Some(midnight))));
        assert_eq!(raw.len(), 4);
    }

    #[test]
    fn enum_values_are_not_revalidated() {
        let record = variant(&[
            (VariantField::Cdna, "c.1A>G"),
            (VariantField::Zygosity, "unknown_zygosity"),
        ]);
        let raw = encode_record(&record).accepted().expect("accepted");
        assert_eq!(
            raw.get("zygosity"),
            Some(&RawValue::Text(Some("unknown_zygosity".into())))
        );
    }

    #[test]
    fn loaded_date_rendering_fails_strict_parse() {
        let record = variant(&[
            (VariantField::Cdna, "c.1A>G"),
            (VariantField::DateSentToPatient, "2024-03-05 00:00:00"),
        ]);
        match encode_record(&record) {
            VariantOutcome::Skipped(VariantSkip::InvalidDate { field, value, .. }) => {
                assert_eq!(field, VariantField::DateSentToPatient);
                assert_eq!(value, "2024-03-05 00:00:00");
            }
            other => panic!("expected invalid date skip, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_skips_only_that_variant() {
        let store = InMemoryVariantStore::new();
        let patient = PatientId::new();
        let collection = VariantCollection::indexed(vec![
            variant(&[
                (VariantField::Cdna, "c.1A>G"),
                (VariantField::DateSequenced, "05/03/2024"),
            ]),
            variant(&[
                (VariantField::Cdna, "c.2C>T"),
                (VariantField::DateSequenced, "2024-03-05"),
            ]),
        ]);

        let written = save_variants(&store, &patient, &collection, &comment()).expect("save");
        assert_eq!(written, 1);

        let loaded = load_variants(&store, &patient)
            .expect("load")
            .expect("variants present");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.records()[0].primary_key(), Some("c.2C>T"));
    }

    #[test]
    fn save_replaces_previous_variants() {
        let store = InMemoryVariantStore::new();
        let patient = PatientId::new();
        let first = VariantCollection::indexed(vec![
            variant(&[(VariantField::Cdna, "c.1A>G")]),
            variant(&[(VariantField::Cdna, "c.2C>T")]),
        ]);
        let second = VariantCollection::indexed(vec![variant(&[(VariantField::Cdna, "c.3G>A")])]);

        save_variants(&store, &patient, &first, &comment()).expect("first save");
        save_variants(&store, &patient, &second, &comment()).expect("second save");

        let loaded = load_variants(&store, &patient)
            .expect("load")
            .expect("variants present");
        let keys: Vec<_> = loaded.iter().filter_map(VariantRecord::primary_key).collect();
        assert_eq!(keys, vec!["c.3G>A"]);

        let document = store.document(&patient).expect("read").expect("document");
        assert_eq!(document.comment.as_str(), "Updated variants from JSON");
    }

    #[test]
    fn failed_commit_aborts_the_save() {
        let collection = VariantCollection::indexed(vec![variant(&[(VariantField::Cdna, "c.1A>G")])]);
        let err = save_variants(&FailingCommitStore, &PatientId::new(), &collection, &comment())
            .expect_err("commit should fail");
        assert!(matches!(err, PatientError::LockPoisoned));
    }
}
