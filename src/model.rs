// Core structs: RawRecord, NormalizedRecord, OutputDocument
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Upstream suppliers the pipeline knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Supplier {
    #[serde(rename = "4tochki")]
    FourTochki,
    #[serde(rename = "brinex")]
    Brinex,
}

impl fmt::Display for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FourTochki => write!(f, "4tochki"),
            Self::Brinex => write!(f, "brinex"),
        }
    }
}

/// Product family a feed belongs to; selects the field mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Catalog {
    Disks,
    Tyres,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    pub name: String,
    pub text: Option<String>,
}

/// One record as it appears in a supplier feed. Field order is feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub fields: Vec<RawField>,
}

impl RawRecord {
    pub fn push(&mut self, name: impl Into<String>, text: Option<String>) {
        self.fields.push(RawField {
            name: name.into(),
            text,
        });
    }

    /// First field with the given name, if any.
    pub fn find(&self, name: &str) -> Option<&RawField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.find(name).is_some()
    }
}

/// Canonical-name → text mapping. Names are unique and keep first-seen order,
/// which is also the order fields are serialized in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRecord {
    fields: Vec<(String, String)>,
}

impl NormalizedRecord {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrites the value in place, or appends a new field at the end.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Places the field first, dropping any earlier field of the same name.
    pub fn insert_first(&mut self, name: &str, value: impl Into<String>) {
        self.fields.retain(|(n, _)| n != name);
        self.fields.insert(0, (name.to_string(), value.into()));
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = (&str, &mut String)> {
        self.fields.iter_mut().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
impl RawRecord {
    /// Builder form of [`RawRecord::push`] for a field with text.
    pub fn with(mut self, name: &str, text: &str) -> Self {
        self.push(name, Some(text.to_string()));
        self
    }
}

#[cfg(test)]
impl NormalizedRecord {
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }
}

/// Records bound for one destination file. Grows by appends only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    pub destination: String,
    pub file: String,
    records: Vec<NormalizedRecord>,
}

impl OutputDocument {
    pub fn new(destination: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            file: file.into(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: NormalizedRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [NormalizedRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feed id \"{0}\" is declared more than once")]
    DuplicateFeed(String),

    #[error("destination \"{0}\" is declared more than once")]
    DuplicateDestination(String),

    #[error("output file \"{0}\" is used by more than one destination")]
    DuplicateFile(String),

    #[error("destination \"{destination}\" references unknown feed \"{feed}\"")]
    UnknownFeed { destination: String, feed: String },

    #[error("destination \"{destination}\" collects marked records from feed \"{feed}\", which declares no availability marker")]
    MissingMarker { destination: String, feed: String },

    #[error("destination \"{destination}\" has a non-finite markup percent")]
    InvalidMarkup { destination: String },

    #[error("destination \"{destination}\" lists feed \"{feed}\" out of fetch order")]
    PassOrder { destination: String, feed: String },
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed feed XML: {0}")]
    Malformed(String),

    #[error("feed contains no root element")]
    Empty,

    #[error("feed ended inside an unclosed <{0}> record")]
    Truncated(String),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot render document {destination}: {reason}")]
    Render { destination: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Run-aborting failures. Record-level anomalies never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("feed \"{feed}\" could not be fetched: {source}")]
    Fetch {
        feed: String,
        #[source]
        source: FeedError,
    },

    #[error("feed \"{feed}\" could not be parsed: {source}")]
    Parse {
        feed: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),
}
