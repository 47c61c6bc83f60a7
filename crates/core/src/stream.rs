//! Incremental writer for range-mode output documents.
//!
//! [`ArticleStream`] writes `{"articles": [` up front, one element per
//! [`ArticleStream::push`], and `]}` on [`ArticleStream::finish`]. The
//! separator goes before every element but the first, so the document stays
//! valid no matter which entries were skipped, including none written at all.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::article::ArticleOutcome;
use crate::{Result, json};

const OPEN: &[u8] = b"{\"articles\": [";
const SEPARATOR: &[u8] = b",\n";
const CLOSE: &[u8] = b"]}";

/// Streams article outcomes into a JSON document.
#[derive(Debug)]
pub struct ArticleStream<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> ArticleStream<W> {
    /// Writes the document header.
    pub fn begin(mut writer: W) -> Result<Self> {
        writer.write_all(OPEN)?;
        Ok(Self { writer, written: 0 })
    }

    /// Appends one element and flushes it.
    pub fn push(&mut self, outcome: &ArticleOutcome) -> Result<()> {
        if self.written > 0 {
            self.writer.write_all(SEPARATOR)?;
        }
        json::to_writer(&mut self.writer, outcome)?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    /// Number of elements written so far.
    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Closes the array and object and returns the writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.write_all(CLOSE)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl ArticleStream<BufWriter<File>> {
    /// Creates (or truncates) `path` and writes the document header.
    pub fn create(path: &Path) -> Result<Self> {
        Self::begin(BufWriter::new(File::create(path)?))
    }
}

/// Writes a single outcome, unwrapped, to `path`.
pub fn write_outcome(path: &Path, outcome: &ArticleOutcome) -> Result<()> {
    fs::write(path, outcome.to_json()?)?;
    Ok(())
}
