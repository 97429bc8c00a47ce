pub mod xml_sink;

pub use xml_sink::{DocumentSink, XmlFileSink};
