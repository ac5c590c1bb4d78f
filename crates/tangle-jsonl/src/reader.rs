//! JSONL reading operations.
//!
//! [`JsonlReader`] reads one JSON value per line from any tokio
//! [`AsyncRead`], tracking 1-based line numbers. Blank lines are ignored.
//! Two stream adapters are offered: [`JsonlReader::stream`] stops at the
//! first bad line, [`JsonlReader::stream_resilient`] records a warning and
//! keeps going.

use futures::Stream;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::warning::{Warning, WarningCollector};
use crate::{Error, Result};

/// Async line-oriented reader for JSONL data.
///
/// # Examples
///
/// ```no_run
/// use tangle_jsonl::reader::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("edges.jsonl").await?;
/// let mut reader = JsonlReader::new(file);
/// while let Some(value) = reader.read_value::<serde_json::Value>().await? {
///     println!("{value}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    reader: BufReader<R>,
    /// 1-based number of the last line read, 0 before the first read.
    line_number: usize,
    buf: String,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Wraps `reader` in a buffered JSONL reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buf: String::new(),
        }
    }

    /// Returns the 1-based number of the last line read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Advances to the next non-blank line.
    ///
    /// Returns `Ok(false)` at end of input.
    async fn advance(&mut self) -> Result<bool> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf).await? == 0 {
                return Ok(false);
            }
            self.line_number += 1;
            if !self.buf.trim().is_empty() {
                return Ok(true);
            }
        }
    }

    /// Reads and decodes the next non-blank line.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Line`] when the line is not valid JSON for `T`, or
    /// [`Error::Io`] if the underlying reader fails.
    pub async fn read_value<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        if !self.advance().await? {
            return Ok(None);
        }
        serde_json::from_str(self.buf.trim())
            .map(Some)
            .map_err(|source| Error::Line {
                line_number: self.line_number,
                source,
            })
    }

    /// Converts the reader into a stream that ends after the first error.
    pub fn stream<T: DeserializeOwned>(self) -> impl Stream<Item = Result<T>> {
        futures::stream::unfold(Some(self), |state| async move {
            let mut reader = state?;
            match reader.read_value::<T>().await {
                Ok(Some(value)) => Some((Ok(value), Some(reader))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Converts the reader into a stream that skips undecodable lines.
    ///
    /// Each skipped line is recorded in `warnings`. An IO failure ends the
    /// stream and is recorded as [`Warning::ReadFailed`].
    pub fn stream_resilient<T: DeserializeOwned>(
        self,
        warnings: WarningCollector,
    ) -> impl Stream<Item = T> {
        futures::stream::unfold(Some(self), move |state| {
            let warnings = warnings.clone();
            async move {
                let mut reader = state?;
                loop {
                    let decoded = match reader.advance().await {
                        Ok(true) => serde_json::from_str::<T>(reader.buf.trim()),
                        Ok(false) => return None,
                        Err(e) => {
                            warnings.add(Warning::ReadFailed {
                                line_number: reader.line_number,
                                error: e.to_string(),
                            });
                            return None;
                        }
                    };
                    match decoded {
                        Ok(value) => return Some((value, Some(reader))),
                        Err(e) => warnings.add(Warning::MalformedJson {
                            line_number: reader.line_number,
                            error: e.to_string(),
                        }),
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde::Deserialize;
    use std::io::Cursor;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Edge {
        from: String,
        to: String,
    }

    #[tokio::test]
    async fn blank_lines_are_skipped_but_counted() {
        let data = Cursor::new(b"\n{\"from\":\"a\",\"to\":\"b\"}\n\n".to_vec());
        let mut reader = JsonlReader::new(data);

        let edge: Option<Edge> = reader.read_value().await.unwrap();

        assert_eq!(
            edge,
            Some(Edge {
                from: "a".to_string(),
                to: "b".to_string()
            })
        );
        assert_eq!(reader.line_number(), 2);
        assert!(reader.read_value::<Edge>().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn strict_stream_stops_at_first_error() {
        let data = Cursor::new(b"{\"from\":\"a\",\"to\":\"b\"}\nnot json\n{\"from\":\"c\",\"to\":\"d\"}\n".to_vec());

        let items: Vec<Result<Edge>> = JsonlReader::new(data).stream().collect().await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        match &items[1] {
            Err(Error::Line { line_number, .. }) => assert_eq!(*line_number, 2),
            other => panic!("expected line error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resilient_stream_collects_warnings() {
        let data = Cursor::new(
            b"{\"from\":\"a\",\"to\":\"b\"}\n{\"from\":1}\n{\"from\":\"c\",\"to\":\"d\"}\n".to_vec(),
        );
        let warnings = WarningCollector::new();

        let edges: Vec<Edge> = JsonlReader::new(data)
            .stream_resilient(warnings.clone())
            .collect()
            .await;

        assert_eq!(edges.len(), 2);
        let collected = warnings.warnings();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].line_number(), 2);
        assert_eq!(collected[0].kind(), "malformed_json");
    }
}
