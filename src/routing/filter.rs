use crate::model::{NormalizedRecord, RawRecord};
use serde::Deserialize;

/// `cae` when non-empty, else `article` when non-empty.
pub fn identity_key(record: &NormalizedRecord) -> Option<&str> {
    record
        .get("cae")
        .filter(|v| !v.is_empty())
        .or_else(|| record.get("article").filter(|v| !v.is_empty()))
}

/// Exact, case-sensitive equality test on a raw feed field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InclusionPredicate {
    pub field: String,
    pub value: String,
}

impl InclusionPredicate {
    pub fn matches(&self, raw: &RawRecord) -> bool {
        raw.find(&self.field)
            .is_some_and(|f| f.text.as_deref() == Some(self.value.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    MissingIdentity,
    Excluded,
    Eligible,
}

/// Eligibility first, then the optional inclusion predicate against the raw record.
pub fn screen(
    record: &NormalizedRecord,
    raw: &RawRecord,
    predicate: Option<&InclusionPredicate>,
) -> Verdict {
    if identity_key(record).is_none() {
        return Verdict::MissingIdentity;
    }
    match predicate {
        Some(p) if !p.matches(raw) => Verdict::Excluded,
        _ => Verdict::Eligible,
    }
}
