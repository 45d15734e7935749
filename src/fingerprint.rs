//! Content fingerprinting for cache validity.
//!
//! A fingerprint is a SHA-256 digest of a document's full raw serialized
//! form, front matter included, so that metadata-only edits also invalidate
//! cached translations.

use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Deterministic content digest, rendered as `sha256:<hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Computes the fingerprint of a document's raw content. Pure, no I/O.
pub fn fingerprint(raw: &[u8]) -> Fingerprint {
    let digest = Sha256::digest(raw);
    let mut hex = String::with_capacity(2 * digest.len() + 7);
    hex.push_str("sha256:");
    for byte in digest {
        let _ = write!(hex, "{:02x}", byte);
    }
    Fingerprint(hex)
}
