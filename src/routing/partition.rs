use crate::model::{NormalizedRecord, RawRecord};
use serde::Deserialize;

/// How a pass treats the feed's availability marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerMode {
    /// Only records carrying the marker element (any value, even empty).
    With,
    /// Only records without the marker element.
    Without,
    Ignore,
}

pub struct PartitionRouter<'a> {
    marker: Option<&'a str>,
    mode: MarkerMode,
    status: Option<&'a str>,
}

impl<'a> PartitionRouter<'a> {
    pub fn new(marker: Option<&'a str>, mode: MarkerMode, status: Option<&'a str>) -> Self {
        Self {
            marker,
            mode,
            status,
        }
    }

    /// A feed without a marker has nothing "in stock": `With` takes nothing,
    /// `Without` takes everything.
    pub fn accepts(&self, raw: &RawRecord) -> bool {
        let marked = self.marker.is_some_and(|m| raw.has_field(m));
        match self.mode {
            MarkerMode::With => marked,
            MarkerMode::Without => !marked,
            MarkerMode::Ignore => true,
        }
    }

    /// Injects the destination's status label as the first field.
    pub fn stamp(&self, record: &mut NormalizedRecord) {
        if let Some(status) = self.status {
            record.insert_first("status", status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "rest_novosib3";

    fn marked() -> RawRecord {
        let mut raw = RawRecord::default().with("cae", "X1");
        raw.push(MARKER, None);
        raw
    }

    fn unmarked() -> RawRecord {
        RawRecord::default().with("cae", "X2")
    }

    #[test]
    fn marker_presence_alone_decides() {
        let with = PartitionRouter::new(Some(MARKER), MarkerMode::With, None);
        let without = PartitionRouter::new(Some(MARKER), MarkerMode::Without, None);

        for raw in [marked(), unmarked()] {
            assert_ne!(with.accepts(&raw), without.accepts(&raw));
        }
        assert!(with.accepts(&marked()));
        assert!(without.accepts(&unmarked()));
    }

    #[test]
    fn ignore_takes_everything() {
        let router = PartitionRouter::new(Some(MARKER), MarkerMode::Ignore, None);
        assert!(router.accepts(&marked()));
        assert!(router.accepts(&unmarked()));
    }

    #[test]
    fn feed_without_marker_routes_everything_to_without() {
        let with = PartitionRouter::new(None, MarkerMode::With, None);
        let without = PartitionRouter::new(None, MarkerMode::Without, None);
        assert!(!with.accepts(&marked()));
        assert!(without.accepts(&marked()));
    }

    #[test]
    fn stamp_puts_status_first() {
        let router = PartitionRouter::new(Some(MARKER), MarkerMode::With, Some("В наличии"));
        let mut record = NormalizedRecord::default();
        record.set("cae", "X1");
        router.stamp(&mut record);
        assert_eq!(record.names(), vec!["status", "cae"]);
        assert_eq!(record.get("status"), Some("В наличии"));

        let silent = PartitionRouter::new(Some(MARKER), MarkerMode::With, None);
        let mut record = NormalizedRecord::default();
        record.set("cae", "X1");
        silent.stamp(&mut record);
        assert!(!record.contains("status"));
    }
}
