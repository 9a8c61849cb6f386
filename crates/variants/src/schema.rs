//! Field schema for gene variant records.
//!
//! The schema is a static table: each [`VariantField`] maps to one [`FieldKind`], and the
//! categorical kinds carry their allowed lowercase tokens. Declaration order of
//! [`VariantField`] is the schema order used for store iteration and JSON key order.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// Top-level JSON property holding the variant array.
pub const JSON_PROPERTY_NAME: &str = "variants";

/// Selected-field name that gates emission of the variant array.
pub const ENABLING_FIELD_NAME: &str = "genes";

/// Record type under which variants are persisted.
pub const VARIANT_RECORD_TYPE: &str = "GeneVariantClass";

/// Field identifying a variant for validity and deduplication.
pub const PRIMARY_KEY_FIELD: VariantField = VariantField::Cdna;

/// Strict pattern used when parsing stored date strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Delimiter of the internal multi-value form.
pub const MULTI_VALUE_DELIMITER: char = '|';

pub const ZYGOSITY_VALUES: &[&str] = &["heterozygous", "homozygous", "hemizygous"];

pub const EFFECT_VALUES: &[&str] = &[
    "missense",
    "nonsense",
    "insertion_in_frame",
    "insertion_frameshift",
    "deletion_in_frame",
    "deletion_frameshift",
    "indel_in_frame",
    "indel_frameshift",
    "duplication",
    "repeat_expansion",
    "synonymous",
    "other",
];

pub const INTERPRETATION_VALUES: &[&str] = &[
    "pathogenic",
    "likely_pathogenic",
    "variant_u_s",
    "likely_benign",
    "benign",
    "investigation_n",
];

pub const INHERITANCE_VALUES: &[&str] = &[
    "denovo_germline",
    "denovo_s_mosaicism",
    "maternal",
    "paternal",
    "unknown",
];

pub const EVIDENCE_VALUES: &[&str] = &["rare", "predicted", "reported"];

pub const SEGREGATION_VALUES: &[&str] = &["segregates", "not_segregates"];

pub const SANGER_VALUES: &[&str] = &["positive", "negative"];

/// Encoding rules of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Any non-blank string.
    PlainText,
    /// Calendar date; parsed with [`DATE_FORMAT`] on the save path.
    Date,
    /// One categorical token, checked case-insensitively.
    SingleValueEnum(&'static [&'static str]),
    /// Several categorical tokens, pipe-joined internally and a JSON array externally.
    MultiValueEnum(&'static [&'static str]),
}

impl FieldKind {
    /// Allowed tokens for categorical kinds.
    pub fn allowed_values(self) -> Option<&'static [&'static str]> {
        match self {
            FieldKind::SingleValueEnum(values) | FieldKind::MultiValueEnum(values) => Some(values),
            FieldKind::PlainText | FieldKind::Date => None,
        }
    }
}

/// A recognised variant field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VariantField {
    Cdna,
    GeneSymbol,
    Protein,
    Transcript,
    Dbsnp,
    Zygosity,
    Effect,
    Interpretation,
    Inheritance,
    Evidence,
    Segregation,
    Sanger,
    DateSequenced,
    DateSentToPhysician,
    DateSentToPatient,
}

impl VariantField {
    /// All fields in schema order.
    pub const ALL: [VariantField; 15] = [
        VariantField::Cdna,
        VariantField::GeneSymbol,
        VariantField::Protein,
        VariantField::Transcript,
        VariantField::Dbsnp,
        VariantField::Zygosity,
        VariantField::Effect,
        VariantField::Interpretation,
        VariantField::Inheritance,
        VariantField::Evidence,
        VariantField::Segregation,
        VariantField::Sanger,
        VariantField::DateSequenced,
        VariantField::DateSentToPhysician,
        VariantField::DateSentToPatient,
    ];

    /// Name used in the canonical record and the persistence store.
    pub const fn internal_name(self) -> &'static str {
        match self {
            VariantField::Cdna => "cdna",
            VariantField::GeneSymbol => "genesymbol",
            VariantField::Protein => "protein",
            VariantField::Transcript => "transcript",
            VariantField::Dbsnp => "dbsnp",
            VariantField::Zygosity => "zygosity",
            VariantField::Effect => "effect",
            VariantField::Interpretation => "interpretation",
            VariantField::Inheritance => "inheritance",
            VariantField::Evidence => "evidence",
            VariantField::Segregation => "segregation",
            VariantField::Sanger => "sanger",
            VariantField::DateSequenced => "dateSequenced",
            VariantField::DateSentToPhysician => "dateSentToPhysician",
            VariantField::DateSentToPatient => "dateSentToPatient",
        }
    }

    /// Name used as the JSON object key. Identical to the internal name.
    pub const fn json_name(self) -> &'static str {
        self.internal_name()
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            VariantField::Cdna
            | VariantField::GeneSymbol
            | VariantField::Protein
            | VariantField::Transcript
            | VariantField::Dbsnp => FieldKind::PlainText,
            VariantField::Zygosity => FieldKind::SingleValueEnum(ZYGOSITY_VALUES),
            VariantField::Effect => FieldKind::SingleValueEnum(EFFECT_VALUES),
            VariantField::Interpretation => FieldKind::SingleValueEnum(INTERPRETATION_VALUES),
            VariantField::Inheritance => FieldKind::SingleValueEnum(INHERITANCE_VALUES),
            VariantField::Evidence => FieldKind::MultiValueEnum(EVIDENCE_VALUES),
            VariantField::Segregation => FieldKind::SingleValueEnum(SEGREGATION_VALUES),
            VariantField::Sanger => FieldKind::SingleValueEnum(SANGER_VALUES),
            VariantField::DateSequenced
            | VariantField::DateSentToPhysician
            | VariantField::DateSentToPatient => FieldKind::Date,
        }
    }

    pub fn allowed_values(self) -> Option<&'static [&'static str]> {
        self.kind().allowed_values()
    }

    /// Exact membership of `token` in this field's allowed values.
    ///
    /// Always `false` for non-categorical fields.
    pub fn is_allowed(self, token: &str) -> bool {
        self.allowed_values()
            .is_some_and(|values| values.contains(&token))
    }
}

impl fmt::Display for VariantField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.internal_name())
    }
}

/// Parse a stored date string with the strict [`DATE_FORMAT`] pattern.
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
}

/// Render a stored date with its generic textual form (`2024-03-05 00:00:00`).
///
/// This does not match [`DATE_FORMAT`], so a loaded date fed straight back into a save
/// fails to parse.
pub fn render_date(value: &NaiveDateTime) -> String {
    value.to_string()
}
