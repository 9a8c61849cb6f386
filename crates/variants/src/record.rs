//! Canonical in-memory variant model.

use crate::schema::{VariantField, MULTI_VALUE_DELIMITER, PRIMARY_KEY_FIELD};
use std::collections::BTreeMap;
use varmap_types::is_blank;

/// One variant: field → string value, iterated in schema order.
///
/// An absent field is "not set"; the model never stores a placeholder for it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariantRecord {
    fields: BTreeMap<VariantField, String>,
}

impl VariantRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: VariantField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Set `field`, returning the previous value if any.
    pub fn insert(&mut self, field: VariantField, value: impl Into<String>) -> Option<String> {
        self.fields.insert(field, value.into())
    }

    pub fn contains(&self, field: VariantField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (VariantField, &str)> + '_ {
        self.fields.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// The cDNA designator, if present and non-blank.
    pub fn primary_key(&self) -> Option<&str> {
        self.get(PRIMARY_KEY_FIELD).filter(|value| !is_blank(value))
    }
}

impl FromIterator<(VariantField, String)> for VariantRecord {
    fn from_iter<I: IntoIterator<Item = (VariantField, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a VariantRecord {
    type Item = (&'a VariantField, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, VariantField, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// A patient's ordered list of variants for one load/save cycle.
///
/// `indexed` marks the collection as an ordered, position-addressable list; the store
/// writer only persists indexed collections.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariantCollection {
    records: Vec<VariantRecord>,
    indexed: bool,
}

impl VariantCollection {
    /// An ordered collection, eligible for saving.
    pub fn indexed(records: Vec<VariantRecord>) -> Self {
        Self {
            records,
            indexed: true,
        }
    }

    /// A collection without positional semantics; the writer ignores it.
    pub fn unindexed(records: Vec<VariantRecord>) -> Self {
        Self {
            records,
            indexed: false,
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn records(&self) -> &[VariantRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<VariantRecord> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VariantRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a VariantCollection {
    type Item = &'a VariantRecord;
    type IntoIter = std::slice::Iter<'a, VariantRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Join tokens into the internal multi-value form.
///
/// Every token is appended with a leading delimiter, so `["rare", "reported"]` becomes
/// `"|rare|reported"`.
pub fn join_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> String {
    tokens.into_iter().fold(String::new(), |mut joined, token| {
        joined.push(MULTI_VALUE_DELIMITER);
        joined.push_str(token);
        joined
    })
}

/// Split the internal multi-value form back into tokens, skipping empty pieces.
pub fn split_tokens(joined: &str) -> Vec<&str> {
    joined
        .split(MULTI_VALUE_DELIMITER)
        .filter(|token| !token.is_empty())
        .collect()
}
