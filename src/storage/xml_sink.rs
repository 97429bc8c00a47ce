use crate::model::{OutputDocument, SinkError};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Receives the finished documents of a successful run.
pub trait DocumentSink {
    fn publish(&self, documents: &[OutputDocument]) -> Result<(), SinkError>;
}

/// Writes each document to `<dir>/<file>`.
///
/// Every document is first written to a hidden temporary sibling; only when
/// all of them are on disk are they renamed into place, so a failed run
/// never replaces the previously published files with partial ones. A rename
/// that fails midway leaves earlier targets replaced and later ones untouched,
/// with no staging files behind.
pub struct XmlFileSink {
    dir: PathBuf,
}

impl XmlFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn staging_path(&self, file: &str) -> PathBuf {
        self.dir.join(format!(".{file}.tmp"))
    }

    fn discard(paths: &[PathBuf]) {
        for path in paths {
            if let Err(e) = fs::remove_file(path) {
                warn!("Failed to remove staging file {}: {}", path.display(), e);
            }
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SinkError + '_ {
    move |source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl DocumentSink for XmlFileSink {
    fn publish(&self, documents: &[OutputDocument]) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let mut staged = Vec::with_capacity(documents.len());
        for doc in documents {
            let staging = self.staging_path(&doc.file);
            let written = render_document(doc)
                .and_then(|bytes| fs::write(&staging, bytes).map_err(io_error(&staging)));
            if let Err(e) = written {
                Self::discard(&staged);
                return Err(e);
            }
            staged.push(staging);
        }

        for (i, (doc, staging)) in documents.iter().zip(&staged).enumerate() {
            let target = self.dir.join(&doc.file);
            if let Err(e) = fs::rename(staging, &target) {
                Self::discard(&staged[i..]);
                let replaced: Vec<&str> = documents[..i].iter().map(|d| d.file.as_str()).collect();
                if !replaced.is_empty() {
                    warn!(
                        "Publish stopped at {}; already replaced: {}",
                        doc.file,
                        replaced.join(", ")
                    );
                }
                return Err(io_error(&target)(e));
            }
            info!("Saved {} ({} items) to {}", doc.destination, doc.len(), target.display());
        }
        Ok(())
    }
}

fn render_error<E: std::fmt::Display>(destination: &str) -> impl FnOnce(E) -> SinkError + '_ {
    move |e| SinkError::Render {
        destination: destination.to_string(),
        reason: e.to_string(),
    }
}

/// Serializes a document as `<items><item>…</item></items>` with an XML declaration.
pub fn render_document(doc: &OutputDocument) -> Result<Vec<u8>, SinkError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(render_error(&doc.destination))?;
    writer.get_mut().push(b'\n');

    if doc.is_empty() {
        writer
            .write_event(Event::Empty(BytesStart::new("items")))
            .map_err(render_error(&doc.destination))?;
        return Ok(writer.into_inner());
    }

    writer
        .write_event(Event::Start(BytesStart::new("items")))
        .map_err(render_error(&doc.destination))?;
    for record in doc.records() {
        writer
            .write_event(Event::Start(BytesStart::new("item")))
            .map_err(render_error(&doc.destination))?;
        for (name, value) in record.fields() {
            if value.is_empty() {
                writer
                    .write_event(Event::Empty(BytesStart::new(name)))
                    .map_err(render_error(&doc.destination))?;
            } else {
                writer
                    .write_event(Event::Start(BytesStart::new(name)))
                    .map_err(render_error(&doc.destination))?;
                writer
                    .write_event(Event::Text(BytesText::new(value)))
                    .map_err(render_error(&doc.destination))?;
                writer
                    .write_event(Event::End(BytesEnd::new(name)))
                    .map_err(render_error(&doc.destination))?;
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new("item")))
            .map_err(render_error(&doc.destination))?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("items")))
        .map_err(render_error(&doc.destination))?;

    Ok(writer.into_inner())
}
