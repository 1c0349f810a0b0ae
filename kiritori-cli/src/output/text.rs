//! Plain text output formatter

use super::{ChunkedDocument, OutputFormatter};
use anyhow::Result;
use std::io::Write;

/// Plain text formatter - outputs each chunk under a one-line header
pub struct TextFormatter<W: Write> {
    writer: W,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn write_documents(&mut self, documents: &[ChunkedDocument], label_sources: bool) -> Result<()> {
        for document in documents {
            if label_sources {
                writeln!(self.writer, "==> {} <==", document.source)?;
            }
            for layout in &document.chunks {
                let chunk = &layout.chunk;
                writeln!(
                    self.writer,
                    "--- chunk {} [{}..{}) {}, {} words ---",
                    chunk.chunk_id,
                    chunk.metadata.original_start,
                    chunk.metadata.original_end,
                    layout.structure_type,
                    chunk.metadata.word_count
                )?;
                writeln!(self.writer, "{}", chunk.text.trim_end())?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}
