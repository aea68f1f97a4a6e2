//! Loaded rule collection
//!
//! A [`Fragfile`] owns every record defined by a source file, grouped by
//! record kind. Within a kind, records keep file order and are also
//! indexed by their key field; keys may repeat.

use indexmap::IndexMap;
use serde::Serialize;

use crate::schema::{FlagAlert, Obituary, Record, WeaponClass};

/// Records of one kind, in file order, indexed by key
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct RuleGroup<R> {
    records: Vec<R>,
    #[serde(skip)]
    by_key: IndexMap<String, Vec<usize>>,
}

impl<R> Default for RuleGroup<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            by_key: IndexMap::new(),
        }
    }
}

impl<R: Record> RuleGroup<R> {
    /// Append a record under its own key field
    pub fn push(&mut self, record: R) {
        let key = record.key().to_string();
        tracing::trace!(kind = %R::KIND, key = %key, "Adding record");
        self.by_key.entry(key).or_default().push(self.records.len());
        self.records.push(record);
    }
}

impl<R> RuleGroup<R> {
    /// All records in file order
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    /// Records sharing a key, in insertion order
    pub fn get<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a R> + 'a {
        self.by_key
            .get(key)
            .into_iter()
            .flatten()
            .map(|&index| &self.records[index])
    }

    /// First record with a key
    pub fn first(&self, key: &str) -> Option<&R> {
        self.get(key).next()
    }

    /// Distinct keys, in order of first appearance
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_key.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Everything loaded from a fragfile
#[derive(Debug, Clone, Default, Serialize)]
pub struct Fragfile {
    pub(crate) info: IndexMap<String, String>,
    pub(crate) meta: IndexMap<String, String>,
    pub(crate) weapon_classes: RuleGroup<WeaponClass>,
    pub(crate) obituaries: RuleGroup<Obituary>,
    pub(crate) flag_alerts: RuleGroup<FlagAlert>,
    #[serde(skip)]
    pub(crate) skipped_lines: usize,
}

impl Fragfile {
    /// `#FRAGFILE` entries
    pub fn info(&self) -> &IndexMap<String, String> {
        &self.info
    }

    /// `#META` entries
    pub fn meta(&self) -> &IndexMap<String, String> {
        &self.meta
    }

    pub fn weapon_classes(&self) -> &RuleGroup<WeaponClass> {
        &self.weapon_classes
    }

    pub fn obituaries(&self) -> &RuleGroup<Obituary> {
        &self.obituaries
    }

    pub fn flag_alerts(&self) -> &RuleGroup<FlagAlert> {
        &self.flag_alerts
    }

    /// Lines dropped under a recovering load policy
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Resolve an obituary's weapon field to its weapon class
    pub fn weapon_class(&self, keyword: &str) -> Option<&WeaponClass> {
        self.weapon_classes.first(keyword)
    }
}
