//! JSON and JSON Lines output formatters

use super::{records, ChunkedDocument, OutputFormatter};
use anyhow::Result;
use std::io::Write;

/// JSON formatter - outputs every chunk record as one JSON array
pub struct JsonFormatter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn write_documents(&mut self, documents: &[ChunkedDocument], label_sources: bool) -> Result<()> {
        let records = records(documents, label_sources);
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &records)?;
        } else {
            serde_json::to_writer(&mut self.writer, &records)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// JSON Lines formatter - outputs one chunk record per line
pub struct JsonLinesFormatter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesFormatter<W> {
    /// Create a new JSON Lines formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonLinesFormatter<W> {
    fn write_documents(&mut self, documents: &[ChunkedDocument], label_sources: bool) -> Result<()> {
        for record in records(documents, label_sources) {
            serde_json::to_writer(&mut self.writer, &record)?;
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
