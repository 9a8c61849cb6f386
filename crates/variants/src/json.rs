//! JSON wire codec for variant collections.
//!
//! Wire format: a top-level object property `variants` holding an array of objects with
//! optional string keys (see [`VariantField`]); `evidence` is an array of strings.
//!
//! Responsibilities:
//! - Encode canonical records, projecting only non-blank fields and splitting the
//!   multi-value field back into an array
//! - Decode the array, validating categorical values, dropping invalid fields and
//!   variants, and deduplicating by cDNA designator
//!
//! Notes:
//! - Structural problems (wrong JSON types) abort the whole decode
//! - Content problems (blank, unknown or duplicate values) drop a field or a variant

use crate::outcome::{FieldDrop, FieldOutcome, VariantOutcome, VariantSkip};
use crate::record::{join_tokens, split_tokens, VariantCollection, VariantRecord};
use crate::schema::{
    FieldKind, VariantField, ENABLING_FIELD_NAME, JSON_PROPERTY_NAME, PRIMARY_KEY_FIELD,
};
use crate::{VariantError, VariantResult};
use serde_json::{Map, Value};
use std::collections::HashSet;
use varmap_types::is_blank;

/// The caller's set of selected field names.
///
/// Variant output is only produced when the selection contains
/// [`ENABLING_FIELD_NAME`]. Passing no selection at all means "no restriction".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSelection {
    names: HashSet<String>,
}

impl FieldSelection {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether this selection lets the variant array through.
    pub fn enables_variants(&self) -> bool {
        self.contains(ENABLING_FIELD_NAME)
    }
}

/// Variant JSON operations.
///
/// This is a zero-sized type used for namespacing codec operations.
pub struct VariantJson;

impl VariantJson {
    /// Append `variants` to `json` under the `variants` property.
    ///
    /// Nothing is written when `selected` is given without the enabling field, or when
    /// no record has a non-blank cDNA designator; the property is never created empty.
    ///
    /// # Returns
    ///
    /// The number of variant objects emitted.
    pub fn encode(
        variants: &VariantCollection,
        json: &mut Map<String, Value>,
        selected: Option<&FieldSelection>,
    ) -> usize {
        if selected.is_some_and(|s| !s.enables_variants()) {
            return 0;
        }

        let emitted: Vec<Value> = variants.iter().filter_map(Self::encode_variant).collect();
        if emitted.is_empty() {
            return 0;
        }

        let count = emitted.len();
        json.insert(JSON_PROPERTY_NAME.to_string(), Value::Array(emitted));
        count
    }

    /// Encode one record as a JSON object, or `None` if it has no usable cDNA designator.
    pub fn encode_variant(record: &VariantRecord) -> Option<Value> {
        record.primary_key()?;

        let mut object = Map::new();
        for (field, value) in record.iter() {
            if is_blank(value) {
                continue;
            }
            let encoded = match field.kind() {
                FieldKind::MultiValueEnum(_) => {
                    let tokens = split_tokens(value);
                    if tokens.is_empty() {
                        continue;
                    }
                    Value::Array(tokens.into_iter().map(Value::from).collect())
                }
                _ => Value::String(value.to_string()),
            };
            object.insert(field.json_name().to_string(), encoded);
        }
        Some(Value::Object(object))
    }

    /// Parse `text` as JSON and decode it. See [`VariantJson::decode`].
    ///
    /// # Errors
    ///
    /// Returns [`VariantError::InvalidJson`] if `text` is not JSON, otherwise as `decode`.
    pub fn decode_str(text: &str) -> VariantResult<Option<VariantCollection>> {
        let value: Value = serde_json::from_str(text)?;
        Self::decode(&value)
    }

    /// Decode the `variants` array of `json` into an indexed collection.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the property is absent or no variant survives validation.
    ///
    /// # Errors
    ///
    /// Returns [`VariantError::MalformedJson`] if:
    /// - `json` is not an object, or `variants` is not an array,
    /// - an element is not an object,
    /// - a scalar field is not a string, or `evidence` is not an array.
    pub fn decode(json: &Value) -> VariantResult<Option<VariantCollection>> {
        let object = json
            .as_object()
            .ok_or_else(|| VariantError::malformed("<root>", "expected a JSON object"))?;

        let Some(elements) = object.get(JSON_PROPERTY_NAME) else {
            return Ok(None);
        };
        let elements = elements.as_array().ok_or_else(|| {
            VariantError::malformed(JSON_PROPERTY_NAME, "expected an array of variants")
        })?;

        let mut accepted = Vec::new();
        let mut seen_keys: HashSet<String> = HashSet::new();

        for (index, element) in elements.iter().enumerate() {
            match Self::decode_variant(index, element, &seen_keys)? {
                VariantOutcome::Accepted(record) => {
                    if let Some(key) = record.primary_key() {
                        seen_keys.insert(key.to_string());
                    }
                    accepted.push(record);
                }
                VariantOutcome::Skipped(skip) => {
                    tracing::debug!(index, reason = %skip, "skipping variant from JSON");
                }
            }
        }

        if accepted.is_empty() {
            return Ok(None);
        }
        Ok(Some(VariantCollection::indexed(accepted)))
    }

    fn decode_variant(
        index: usize,
        element: &Value,
        seen_keys: &HashSet<String>,
    ) -> VariantResult<VariantOutcome> {
        let path = format!("{JSON_PROPERTY_NAME}[{index}]");
        let object = element
            .as_object()
            .ok_or_else(|| VariantError::malformed(&path, "expected an object"))?;

        let key = match object.get(PRIMARY_KEY_FIELD.json_name()) {
            None | Some(Value::Null) => {
                return Ok(VariantOutcome::Skipped(VariantSkip::MissingPrimaryKey))
            }
            Some(value) => expect_str(value, &path, PRIMARY_KEY_FIELD)?,
        };
        if is_blank(key) {
            return Ok(VariantOutcome::Skipped(VariantSkip::MissingPrimaryKey));
        }
        if seen_keys.contains(key) {
            return Ok(VariantOutcome::Skipped(VariantSkip::DuplicatePrimaryKey(
                key.to_string(),
            )));
        }

        let mut record = VariantRecord::new();
        for field in VariantField::ALL {
            let value = match object.get(field.json_name()) {
                None | Some(Value::Null) => continue,
                Some(value) => value,
            };
            match Self::decode_field(field, value, &path)? {
                FieldOutcome::Accepted(decoded) => {
                    record.insert(field, decoded);
                }
                FieldOutcome::Dropped(drop) => {
                    tracing::debug!(index, %field, ?drop, "dropping variant field from JSON");
                }
            }
        }

        if record.is_empty() {
            return Ok(VariantOutcome::Skipped(VariantSkip::Empty));
        }
        Ok(VariantOutcome::Accepted(record))
    }

    fn decode_field(field: VariantField, value: &Value, path: &str) -> VariantResult<FieldOutcome> {
        let outcome = match field.kind() {
            FieldKind::MultiValueEnum(_) => {
                let tokens = value.as_array().ok_or_else(|| {
                    VariantError::malformed(
                        format!("{path}.{field}"),
                        format!("expected an array, got {}", json_type(value)),
                    )
                })?;
                if tokens.is_empty() {
                    return Ok(FieldOutcome::Dropped(FieldDrop::Blank));
                }
                let joined = join_tokens(
                    tokens
                        .iter()
                        .filter_map(Value::as_str)
                        .filter(|token| field.is_allowed(token)),
                );
                if joined.is_empty() {
                    FieldOutcome::Dropped(FieldDrop::NoAllowedTokens)
                } else {
                    FieldOutcome::Accepted(joined)
                }
            }
            FieldKind::SingleValueEnum(_) => {
                let text = expect_str(value, path, field)?;
                if is_blank(text) {
                    FieldOutcome::Dropped(FieldDrop::Blank)
                } else if field.is_allowed(&text.to_lowercase()) {
                    FieldOutcome::Accepted(text.to_string())
                } else {
                    FieldOutcome::Dropped(FieldDrop::NotAllowed {
                        value: text.to_string(),
                    })
                }
            }
            FieldKind::PlainText | FieldKind::Date => {
                let text = expect_str(value, path, field)?;
                if is_blank(text) {
                    FieldOutcome::Dropped(FieldDrop::Blank)
                } else {
                    FieldOutcome::Accepted(text.to_string())
                }
            }
        };
        Ok(outcome)
    }
}

fn expect_str<'a>(value: &'a Value, path: &str, field: VariantField) -> VariantResult<&'a str> {
    value.as_str().ok_or_else(|| {
        VariantError::malformed(
            format!("{path}.{field}"),
            format!("expected a string, got {}", json_type(value)),
        )
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: &[(VariantField, &str)]) -> VariantRecord {
        fields
            .iter()
            .map(|(field, value)| (*field, value.to_string()))
            .collect()
    }

    fn decode_records(json: Value) -> Vec<VariantRecord> {
        VariantJson::decode(&json)
            .expect("decode should succeed")
            .expect("should contain variants")
            .into_records()
    }

    #[test]
    fn encode_projects_non_blank_fields_in_schema_order() {
        let variants = VariantCollection::indexed(vec![record(&[
            (VariantField::Sanger, "positive"),
            (VariantField::Cdna, "c.123A>T"),
            (VariantField::Protein, "   "),
            (VariantField::GeneSymbol, "BRCA1"),
        ])]);

        let mut out = Map::new();
        let count = VariantJson::encode(&variants, &mut out, None);
        assert_eq!(count, 1);

        let rendered = serde_json::to_string(&out).expect("serialize");
        assert_eq!(
            rendered,
            r#"{"variants":[{"cdna":"c.123A>T","genesymbol":"BRCA1","sanger":"positive"}]}"#
        );
    }

    #[test]
    fn encode_splits_evidence_into_array() {
        let variants = VariantCollection::indexed(vec![record(&[
            (VariantField::Cdna, "c.1A>G"),
            (VariantField::Evidence, "|rare|reported"),
        ])]);

        let mut out = Map::new();
        VariantJson::encode(&variants, &mut out, None);
        assert_eq!(out["variants"][0]["evidence"], json!(["rare", "reported"]));
    }

    #[test]
    fn encode_skips_variants_without_cdna() {
        let variants = VariantCollection::indexed(vec![
            record(&[(VariantField::GeneSymbol, "TP53")]),
            record(&[(VariantField::Cdna, " "), (VariantField::GeneSymbol, "TP53")]),
            record(&[(VariantField::Cdna, "c.9G>C")]),
        ]);

        let mut out = Map::new();
        assert_eq!(VariantJson::encode(&variants, &mut out, None), 1);
        assert_eq!(out["variants"], json!([{ "cdna": "c.9G>C" }]));
    }

    #[test]
    fn encode_never_creates_an_empty_array() {
        let variants =
            VariantCollection::indexed(vec![record(&[(VariantField::GeneSymbol, "TP53")])]);

        let mut out = Map::new();
        assert_eq!(VariantJson::encode(&variants, &mut out, None), 0);
        assert!(!out.contains_key("variants"));
    }

    #[test]
    fn encode_is_gated_by_enabling_field() {
        let variants = VariantCollection::indexed(vec![record(&[(VariantField::Cdna, "c.1A>G")])]);

        let mut out = Map::new();
        let notes_only = FieldSelection::from_names(["notes"]);
        assert_eq!(VariantJson::encode(&variants, &mut out, Some(&notes_only)), 0);
        assert!(!out.contains_key("variants"));

        let with_genes = FieldSelection::from_names(["notes", "genes"]);
        assert_eq!(VariantJson::encode(&variants, &mut out, Some(&with_genes)), 1);
        assert!(out.contains_key("variants"));
    }

    #[test]
    fn decode_returns_none_without_property() {
        let decoded = VariantJson::decode(&json!({ "genes": [] })).expect("decode");
        assert!(decoded.is_none());
    }

    #[test]
    fn decode_keeps_first_of_duplicate_cdna() {
        let records = decode_records(json!({
            "variants": [
                { "cdna": "c.123A>T", "genesymbol": "BRCA1" },
                { "cdna": "c.123A>T", "genesymbol": "BRCA2" },
            ]
        }));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(VariantField::GeneSymbol), Some("BRCA1"));
    }

    #[test]
    fn decode_of_resubmitted_array_has_no_duplicates() {
        let element = json!({ "cdna": "c.5del", "effect": "deletion_frameshift" });
        let records = decode_records(json!({ "variants": [element.clone(), element] }));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn decode_discards_missing_or_blank_cdna() {
        let decoded = VariantJson::decode(&json!({
            "variants": [
                { "genesymbol": "BRCA1" },
                { "cdna": "   ", "genesymbol": "BRCA1" },
                { "cdna": null, "genesymbol": "BRCA1" },
            ]
        }))
        .expect("decode");
        assert!(decoded.is_none());
    }

    #[test]
    fn decode_accepts_enum_case_insensitively_and_keeps_original_case() {
        let records = decode_records(json!({
            "variants": [{ "cdna": "c.1A>G", "zygosity": "Heterozygous" }]
        }));
        assert_eq!(records[0].get(VariantField::Zygosity), Some("Heterozygous"));
    }

    #[test]
    fn decode_drops_unknown_enum_value_but_keeps_variant() {
        let records = decode_records(json!({
            "variants": [{
                "cdna": "c.1A>G",
                "zygosity": "unknown_zygosity",
                "sanger": "positive",
                "segregation": "  ",
            }]
        }));
        assert_eq!(records.len(), 1);
        assert!(!records[0].contains(VariantField::Zygosity));
        assert!(!records[0].contains(VariantField::Segregation));
        assert_eq!(records[0].get(VariantField::Sanger), Some("positive"));
    }

    #[test]
    fn decode_filters_evidence_tokens() {
        let records = decode_records(json!({
            "variants": [
                { "cdna": "c.1A>G", "evidence": ["rare", "bogus"] },
                { "cdna": "c.2A>G", "evidence": ["bogus", 7] },
                { "cdna": "c.3A>G", "evidence": [] },
                { "cdna": "c.4A>G", "evidence": ["Rare", "predicted"] },
            ]
        }));

        assert_eq!(records[0].get(VariantField::Evidence), Some("|rare"));
        assert!(!records[1].contains(VariantField::Evidence));
        assert!(!records[2].contains(VariantField::Evidence));
        assert_eq!(records[3].get(VariantField::Evidence), Some("|predicted"));
    }

    #[test]
    fn decode_keeps_plain_text_and_dates_verbatim() {
        let records = decode_records(json!({
            "variants": [{
                "cdna": " c.1A>G ",
                "transcript": "NM_007294.4",
                "dateSequenced": "2024-03-05",
                "dateSentToPatient": "not a date",
                "dbsnp": "",
                "unknownKey": "ignored",
            }]
        }));

        let record = &records[0];
        assert_eq!(record.get(VariantField::Cdna), Some(" c.1A>G "));
        assert_eq!(record.get(VariantField::Transcript), Some("NM_007294.4"));
        assert_eq!(record.get(VariantField::DateSequenced), Some("2024-03-05"));
        assert_eq!(record.get(VariantField::DateSentToPatient), Some("not a date"));
        assert!(!record.contains(VariantField::Dbsnp));
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn decode_rejects_structurally_malformed_input() {
        let cases = [
            json!(["not", "an", "object"]),
            json!({ "variants": { "cdna": "c.1A>G" } }),
            json!({ "variants": ["c.1A>G"] }),
            json!({ "variants": [{ "cdna": 12 }] }),
            json!({ "variants": [{ "cdna": "c.1A>G", "zygosity": true }] }),
            json!({ "variants": [{ "cdna": "c.1A>G", "evidence": "rare" }] }),
        ];

        for case in cases {
            let err = VariantJson::decode(&case).expect_err("should be malformed");
            assert!(matches!(err, VariantError::MalformedJson { .. }), "{case}");
        }
    }

    #[test]
    fn decode_malformed_element_fails_even_after_valid_ones() {
        let err = VariantJson::decode(&json!({
            "variants": [
                { "cdna": "c.1A>G" },
                { "cdna": "c.2A>G", "protein": ["p.Arg1Gly"] },
            ]
        }))
        .expect_err("should be malformed");

        match err {
            VariantError::MalformedJson { path, .. } => assert_eq!(path, "variants[1].protein"),
            other => panic!("expected MalformedJson, got {other:?}"),
        }
    }

    #[test]
    fn decode_str_reports_invalid_json() {
        let err = VariantJson::decode_str("{ not json").expect_err("should fail");
        assert!(matches!(err, VariantError::InvalidJson(_)));
    }

    #[test]
    fn encode_then_decode_round_trips_valid_records() {
        let original = VariantCollection::indexed(vec![
            record(&[
                (VariantField::Cdna, "c.68_69delAG"),
                (VariantField::GeneSymbol, "BRCA1"),
                (VariantField::Protein, "p.Glu23ValfsTer17"),
                (VariantField::Transcript, "NM_007294.4"),
                (VariantField::Dbsnp, "rs80357914"),
                (VariantField::Zygosity, "heterozygous"),
                (VariantField::Effect, "deletion_frameshift"),
                (VariantField::Interpretation, "pathogenic"),
                (VariantField::Inheritance, "maternal"),
                (VariantField::Evidence, "|rare|reported"),
                (VariantField::Segregation, "segregates"),
                (VariantField::Sanger, "positive"),
                (VariantField::DateSequenced, "2024-03-05"),
                (VariantField::DateSentToPhysician, "2024-03-12"),
                (VariantField::DateSentToPatient, "2024-03-19"),
            ]),
            record(&[(VariantField::Cdna, "c.5266dupC")]),
        ]);

        let mut out = Map::new();
        VariantJson::encode(&original, &mut out, None);
        let decoded = VariantJson::decode(&Value::Object(out))
            .expect("decode")
            .expect("variants");

        assert_eq!(decoded, original);
    }
}
