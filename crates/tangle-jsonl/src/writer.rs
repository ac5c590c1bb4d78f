//! JSONL writing operations.

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::Result;

/// Buffered async writer emitting one JSON value per line.
///
/// Call [`JsonlWriter::finish`] when done; dropping the writer without it
/// may lose buffered records.
pub struct JsonlWriter<W: AsyncWrite + Unpin> {
    writer: BufWriter<W>,
    written: usize,
}

impl<W: AsyncWrite + Unpin> JsonlWriter<W> {
    /// Wraps `writer` in a buffered JSONL writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            written: 0,
        }
    }

    /// Serializes `value` as a single line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub async fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let mut line = serde_json::to_vec(value)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes buffered data and returns the inner writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub async fn finish(mut self) -> Result<W> {
        self.writer.flush().await?;
        Ok(self.writer.into_inner())
    }
}
