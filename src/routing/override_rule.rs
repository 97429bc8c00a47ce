use crate::model::NormalizedRecord;
use tracing::debug;

const LT610_MODEL: &str = "LT610";
const LT610_THORN: &str = "Липучка";

/// LT610 tyres are always velcro, whatever the feed says about studs.
/// Returns `true` when the record was touched.
pub fn apply_category_override(record: &mut NormalizedRecord) -> bool {
    if record.get("model") != Some(LT610_MODEL) {
        return false;
    }
    debug!(
        "Category override: model {} thorn {:?} -> {}",
        LT610_MODEL,
        record.get("thorn"),
        LT610_THORN
    );
    record.set("thorn", LT610_THORN);
    true
}
