//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use serde::Serialize;
use tangle::{DependencyEdge, DependencyKind, DependencyStrength};

/// Strong import edge.
pub fn strong(from: &str, to: &str, language: &str) -> DependencyEdge {
    DependencyEdge::new(from, to, DependencyKind::Import, DependencyStrength::Strong, language)
}

/// Weak call edge.
pub fn weak(from: &str, to: &str, language: &str) -> DependencyEdge {
    DependencyEdge::new(from, to, DependencyKind::Call, DependencyStrength::Weak, language)
}

/// Writes one JSON record per line.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) {
    let lines: Vec<String> = records
        .iter()
        .map(|r| serde_json::to_string(r).expect("record serializes"))
        .collect();
    std::fs::write(path, lines.join("\n") + "\n").expect("Failed to write records");
}

/// Run the tangle binary in the specified directory with colors off.
pub fn run_tangle_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tangle"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute tangle binary")
}
