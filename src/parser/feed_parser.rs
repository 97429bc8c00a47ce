// Supplier feed XML → raw records
use crate::model::{ParseError, RawRecord};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Extracts every `<collection>` element, at any depth, as one record.
/// Direct children become fields; a field's value is the text before its
/// first nested child.
///
/// Input is the raw body. Its encoding comes from the BOM or the XML
/// declaration (suppliers publish both utf-8 and windows-1251), UTF-8 otherwise.
pub struct RecordParser {
    collection: String,
}

struct OpenField {
    name: String,
    text: Option<String>,
    sealed: bool,
}

impl OpenField {
    fn append(&mut self, chunk: &str) {
        if !self.sealed {
            self.text.get_or_insert_with(String::new).push_str(chunk);
        }
    }
}

fn decode(reader: &Reader<&[u8]>, bytes: &[u8]) -> Result<String, ParseError> {
    reader
        .decoder()
        .decode(bytes)
        .map(|s| s.into_owned())
        .map_err(|e| ParseError::Malformed(format!("at byte {}: {e}", reader.buffer_position())))
}

impl RecordParser {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }

    pub fn parse(&self, xml: &[u8]) -> Result<Vec<RawRecord>, ParseError> {
        let mut reader = Reader::from_reader(xml);
        let collection = self.collection.as_bytes();

        let mut records = Vec::new();
        let mut saw_root = false;
        let mut depth: usize = 0;
        // depth of the currently open record element
        let mut record_depth: Option<usize> = None;
        let mut current = RawRecord::default();
        let mut field: Option<OpenField> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| ParseError::Malformed(format!("at byte {}: {e}", reader.buffer_position())))?;

            match event {
                Event::Start(e) => {
                    saw_root = true;
                    depth += 1;
                    match record_depth {
                        None if e.name().as_ref() == collection => {
                            record_depth = Some(depth);
                            current = RawRecord::default();
                        }
                        Some(rd) if depth == rd + 1 => {
                            field = Some(OpenField {
                                name: decode(&reader, e.name().as_ref())?,
                                text: None,
                                sealed: false,
                            });
                        }
                        Some(_) => {
                            if let Some(f) = field.as_mut() {
                                f.sealed = true;
                            }
                        }
                        None => {}
                    }
                }
                Event::Empty(e) => {
                    saw_root = true;
                    match record_depth {
                        None if e.name().as_ref() == collection => {
                            records.push(RawRecord::default());
                        }
                        Some(rd) if depth == rd => {
                            current.push(decode(&reader, e.name().as_ref())?, None);
                        }
                        Some(_) => {
                            if let Some(f) = field.as_mut() {
                                f.sealed = true;
                            }
                        }
                        None => {}
                    }
                }
                Event::Text(e) => {
                    if let Some(f) = field.as_mut() {
                        let text = e
                            .unescape()
                            .map_err(|err| ParseError::Malformed(format!("in <{}>: {err}", f.name)))?;
                        f.append(&text);
                    }
                }
                Event::CData(e) => {
                    if let Some(f) = field.as_mut() {
                        f.append(&decode(&reader, e.as_ref())?);
                    }
                }
                Event::End(_) => {
                    match record_depth {
                        Some(rd) if depth == rd + 1 => {
                            if let Some(f) = field.take() {
                                current.push(f.name, f.text);
                            }
                        }
                        Some(rd) if depth == rd => {
                            records.push(std::mem::take(&mut current));
                            record_depth = None;
                        }
                        _ => {}
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(ParseError::Empty);
        }
        if record_depth.is_some() {
            return Err(ParseError::Truncated(self.collection.clone()));
        }
        Ok(records)
    }
}
