//! Content-derived identifiers.
//!
//! Report entities (cycles, alerts, change sets) get IDs hashed from their
//! content rather than numbered in discovery order, so the same cycle keeps
//! the same ID across runs, across input orderings and across machines.
//!
//! Format: `{prefix}-{hash}` where `hash` is the first 8 bytes of a SHA-256
//! digest, base36-encoded to [`ID_HASH_LEN`] characters (e.g.
//! `cycle-0k3f9xq2`).

use std::collections::HashSet;

use sha2::{Digest, Sha256};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of base36 characters in the hash part of an ID.
pub const ID_HASH_LEN: usize = 8;

/// Upper bound on nonce retries before giving up on a clean ID.
const MAX_NONCE: u32 = 100;

/// Hashes `content` into a `{prefix}-{hash}` identifier.
///
/// # Examples
///
/// ```
/// use tangle::ids::content_id;
///
/// let a = content_id("cycle", "a->b");
/// assert_eq!(a, content_id("cycle", "a->b"));
/// assert_ne!(a, content_id("cycle", "a->c"));
/// assert!(a.starts_with("cycle-"));
/// ```
#[must_use]
pub fn content_id(prefix: &str, content: &str) -> String {
    hashed(prefix, content, 0)
}

fn hashed(prefix: &str, content: &str, nonce: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    if nonce > 0 {
        hasher.update(b"|");
        hasher.update(nonce.to_le_bytes());
    }
    let digest = hasher.finalize();
    format!("{prefix}-{}", encode_base36(&digest[..8], ID_HASH_LEN))
}

/// Encodes up to 8 bytes as a fixed-width base36 string.
///
/// Bytes are folded into a `u64` with wrapping shifts, so only the first 8
/// bytes are significant.
fn encode_base36(bytes: &[u8], length: usize) -> String {
    let mut num: u64 = 0;
    for &byte in bytes {
        num = num.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    let mut out = Vec::with_capacity(length);
    while out.len() < length {
        out.push(BASE36_CHARS[usize::try_from(num % 36).unwrap_or(0)]);
        num /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Issues content IDs that are unique within one report.
///
/// Distinct contents that collide on the short hash are re-hashed with a
/// nonce; the first content to claim a hash keeps it.
#[derive(Debug, Default)]
pub struct IdAllocator {
    issued: HashSet<String>,
}

impl IdAllocator {
    /// Creates an allocator with no IDs issued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a unique ID for `content`.
    ///
    /// Falls back to a numeric suffix if every nonce collides, which only
    /// happens with adversarial inputs.
    pub fn allocate(&mut self, prefix: &str, content: &str) -> String {
        for nonce in 0..MAX_NONCE {
            let id = hashed(prefix, content, nonce);
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
        tracing::warn!(prefix, "Exhausted ID nonces, using numeric suffix");
        let id = format!("{}.{}", hashed(prefix, content, 0), self.issued.len());
        self.issued.insert(id.clone());
        id
    }
}
