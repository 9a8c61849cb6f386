//! Store Reader: raw persisted records → canonical variant records.

use crate::store::{RawRecord, RawValue, VariantStore};
use crate::{PatientError, PatientResult};
use variants::record::join_tokens;
use variants::schema::{render_date, VARIANT_RECORD_TYPE};
use variants::{FieldKind, VariantCollection, VariantField, VariantRecord};
use varmap_uuid::PatientId;

/// Load every stored variant of `patient` into an indexed collection.
///
/// Stored records without any field are skipped. Records whose fields are all null are
/// kept as empty records, unless every record is empty.
///
/// Returns `Ok(None)` when the patient has no document, no variant records, or only
/// records from which no field could be decoded.
pub(crate) fn load_variants<S: VariantStore + ?Sized>(
    store: &S,
    patient: &PatientId,
) -> PatientResult<Option<VariantCollection>> {
    let Some(raw_records) = store.get_records(patient, VARIANT_RECORD_TYPE)? else {
        return Ok(None);
    };

    let records = raw_records
        .iter()
        .filter(|raw| !raw.is_empty())
        .map(decode_record)
        .collect::<PatientResult<Vec<_>>>()?;

    if records.iter().all(VariantRecord::is_empty) {
        tracing::debug!(patient = %patient, "no readable variant fields stored");
        return Ok(None);
    }
    Ok(Some(VariantCollection::indexed(records)))
}

/// Decode one stored record, field by field in schema order.
///
/// Stored nulls and empty lists leave the field absent. Names outside the schema are
/// ignored.
///
/// # Errors
///
/// Returns [`PatientError::FieldType`] if a stored value's type does not match the
/// field kind.
pub fn decode_record(raw: &RawRecord) -> PatientResult<VariantRecord> {
    let mut record = VariantRecord::new();
    for field in VariantField::ALL {
        let Some(value) = raw.get(field.internal_name()) else {
            continue;
        };
        if let Some(decoded) = decode_field(field, value)? {
            record.insert(field, decoded);
        }
    }
    Ok(record)
}

fn decode_field(field: VariantField, value: &RawValue) -> PatientResult<Option<String>> {
    match (field.kind(), value) {
        (FieldKind::MultiValueEnum(_), RawValue::List(tokens)) => Ok(tokens
            .as_ref()
            .filter(|tokens| !tokens.is_empty())
            .map(|tokens| join_tokens(tokens.iter().map(String::as_str)))),
        (FieldKind::Date, RawValue::Date(date)) => Ok(date.as_ref().map(render_date)),
        (FieldKind::PlainText | FieldKind::SingleValueEnum(_), RawValue::Text(text)) => {
            Ok(text.clone())
        }
        (kind, found) => Err(PatientError::FieldType {
            field,
            expected: expected_type(kind),
            found: found.type_name(),
        }),
    }
}

fn expected_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::MultiValueEnum(_) => "list",
        FieldKind::Date => "date",
        FieldKind::PlainText | FieldKind::SingleValueEnum(_) => "text",
    }
}
