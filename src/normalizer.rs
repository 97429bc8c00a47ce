use crate::mapping::builtin_table;
use crate::model::{Catalog, NormalizedRecord, RawRecord, Supplier};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Raw field name → canonical field name for one supplier feed.
/// Names missing from the table map to themselves.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: HashMap<String, String>,
    preferred: HashSet<String>,
}

impl FieldMap {
    pub fn builtin(catalog: Catalog, supplier: Supplier) -> Self {
        let entries = builtin_table(catalog, supplier)
            .iter()
            .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
            .collect();
        Self {
            entries,
            preferred: HashSet::new(),
        }
    }

    /// Adds or replaces table entries.
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (raw, canonical) in overrides {
            self.entries.insert(raw.clone(), canonical.clone());
        }
        self
    }

    /// Raw fields that win when another raw field maps to the same canonical name.
    pub fn with_preferred<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn canonical<'a>(&'a self, raw: &'a str) -> &'a str {
        self.entries.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn is_preferred(&self, raw: &str) -> bool {
        self.preferred.contains(raw)
    }
}

pub struct FieldNormalizer {
    map: FieldMap,
}

impl FieldNormalizer {
    pub fn new(map: FieldMap) -> Self {
        Self { map }
    }

    /// Maps a raw record onto canonical names.
    ///
    /// When two raw fields land on the same canonical name, a populated value
    /// from a preferred field is never replaced by a non-preferred one, and a
    /// preferred field only replaces what is already there if it carries text
    /// or the slot is still empty. Between non-preferred fields the later one wins.
    pub fn normalize(&self, raw: &RawRecord) -> NormalizedRecord {
        let mut record = NormalizedRecord::default();
        let mut from_preferred: HashMap<&str, bool> = HashMap::new();

        for field in &raw.fields {
            let canonical = self.map.canonical(&field.name);
            let value = field.text.as_deref().unwrap_or("");
            let preferred = self.map.is_preferred(&field.name);

            let Some(&held_preferred) = from_preferred.get(canonical) else {
                record.set(canonical, value);
                from_preferred.insert(canonical, preferred);
                continue;
            };

            let held = record.get(canonical).unwrap_or("");
            let keep_held = if preferred {
                value.is_empty() && !held.is_empty()
            } else {
                held_preferred && !held.is_empty()
            };

            debug!(
                "Field collision: input tag {} -> output tag {}, value {:?}, kept {:?}",
                field.name,
                canonical,
                value,
                if keep_held { held } else { value }
            );

            if !keep_held {
                record.set(canonical, value);
                from_preferred.insert(canonical, preferred);
            }
        }

        record
    }
}
