//! JSON Lines record loading for the tangle dependency analyzer.
//!
//! Source parsers hand their output to tangle as JSONL files: one edge,
//! module or history sample per line. This crate reads such files without
//! giving up on the first bad line, and writes reports and histories back
//! with crash-safe replacement.
//!
//! ```no_run
//! use tangle_jsonl::read_jsonl_resilient;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Edge {
//!     from: String,
//!     to: String,
//! }
//!
//! # async fn example() -> tangle_jsonl::Result<()> {
//! let (edges, warnings) = read_jsonl_resilient::<Edge, _>("edges.jsonl").await?;
//! for warning in &warnings {
//!     eprintln!("{warning}");
//! }
//! println!("{} edges", edges.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

use std::path::Path;

use futures::StreamExt;
use serde::de::DeserializeOwned;

pub use atomic::{write_json_atomic, write_jsonl_atomic};
pub use error::{Error, Result};
pub use reader::JsonlReader;
pub use warning::{Warning, WarningCollector};
pub use writer::JsonlWriter;

/// Reads every decodable record from a JSONL file.
///
/// Lines that fail to decode are skipped and returned as warnings.
///
/// # Errors
///
/// Returns [`Error::Open`] if the file cannot be opened. Decode failures are
/// never errors.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = tokio::fs::File::open(path).await.map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let warnings = WarningCollector::new();
    let records: Vec<T> = JsonlReader::new(file)
        .stream_resilient(warnings.clone())
        .collect()
        .await;

    let warnings = warnings.take();
    if !warnings.is_empty() {
        tracing::warn!(
            path = %path.display(),
            skipped = warnings.len(),
            "Skipped undecodable JSONL lines"
        );
    }
    Ok((records, warnings))
}
