//! Language identifier resolution.
//!
//! Source records name languages inconsistently (ISO codes in some, English or
//! localized display names in others), so every language comparison in the
//! matching engine goes through [`LanguageResolver::same_language`].

mod catalog;

pub use catalog::{CatalogError, LanguageCatalog};

use std::collections::HashMap;

use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::domain::LanguageRecord;

/// Queries shorter than this never reach the fuzzy tier.
const FUZZY_MIN_CHARS: usize = 3;

/// Which lookup tier produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Code,
    Name,
    Fuzzy,
}

/// A resolved language together with the tier that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution<'a> {
    pub record: &'a LanguageRecord,
    pub tier: MatchTier,
}

/// Read-only index over a [`LanguageCatalog`].
#[derive(Debug, Clone)]
pub struct LanguageResolver {
    records: Vec<LanguageRecord>,
    by_code: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    /// Normalized names in catalog order, scanned by the fuzzy tier.
    names: Vec<(String, usize)>,
}

impl Default for LanguageResolver {
    fn default() -> Self {
        Self::new(LanguageCatalog::builtin())
    }
}

impl LanguageResolver {
    pub fn new(catalog: LanguageCatalog) -> Self {
        let records = catalog.records().to_vec();
        let mut by_code = HashMap::new();
        let mut by_name = HashMap::new();
        let mut names = Vec::new();

        for (index, record) in records.iter().enumerate() {
            by_code.entry(normalize(&record.code)).or_insert(index);
            for name in record.names() {
                let key = normalize(name);
                if key.is_empty() {
                    continue;
                }
                by_name.entry(key.clone()).or_insert(index);
                names.push((key, index));
            }
        }

        Self {
            records,
            by_code,
            by_name,
            names,
        }
    }

    pub fn records(&self) -> &[LanguageRecord] {
        &self.records
    }

    /// Resolve an identifier to its catalog record; `None` is an ordinary outcome.
    pub fn resolve(&self, identifier: &str) -> Option<&LanguageRecord> {
        self.lookup(identifier).map(|resolution| resolution.record)
    }

    pub fn lookup(&self, identifier: &str) -> Option<Resolution<'_>> {
        let key = normalize(identifier);
        if key.is_empty() {
            return None;
        }

        if let Some(&index) = self.by_code.get(&key) {
            return Some(self.resolution(index, MatchTier::Code));
        }
        if let Some(&index) = self.by_name.get(&key) {
            return Some(self.resolution(index, MatchTier::Name));
        }
        if key.chars().count() < FUZZY_MIN_CHARS {
            return None;
        }

        self.names
            .iter()
            .find(|(name, _)| name.starts_with(&key))
            .or_else(|| {
                self.names
                    .iter()
                    .find(|(name, _)| contains_word(name, &key) || contains_word(&key, name))
            })
            .map(|&(_, index)| self.resolution(index, MatchTier::Fuzzy))
    }

    /// Whether two identifiers denote the same language.
    pub fn same_language(&self, a: &str, b: &str) -> bool {
        let left = normalize(a);
        let right = normalize(b);
        if left == right {
            return true;
        }

        match (self.resolve(a), self.resolve(b)) {
            (Some(x), Some(y)) => x.code.eq_ignore_ascii_case(&y.code),
            (Some(record), None) => record_mentions(record, &right),
            (None, Some(record)) => record_mentions(record, &left),
            (None, None) => false,
        }
    }

    /// Whether any identifier in `candidates` denotes the same language as `wanted`.
    pub fn any_same_language<S: AsRef<str>>(&self, candidates: &[S], wanted: &str) -> bool {
        candidates
            .iter()
            .any(|candidate| self.same_language(candidate.as_ref(), wanted))
    }

    fn resolution(&self, index: usize, tier: MatchTier) -> Resolution<'_> {
        Resolution {
            record: &self.records[index],
            tier,
        }
    }
}

/// Whether `word` occurs in `haystack` bounded by non-alphanumeric characters or the ends.
fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

fn record_mentions(record: &LanguageRecord, key: &str) -> bool {
    normalize(&record.code) == key || record.names().any(|name| normalize(name) == key)
}

/// Trim, strip diacritics and lowercase so `" Français "` and `"francais"` compare equal.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}
