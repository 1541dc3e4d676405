//! Snapshot envelope — the document plus an integrity hash.
//!
//! The hash is SHA-256 over the canonical (compact) JSON of the document,
//! independent of how the envelope itself is formatted on disk.

use serde::{Deserialize, Serialize};

use cinema_model::hashing::document_hash;
use cinema_model::{Cinema, Document, DOCUMENT_VERSION};

/// On-disk format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    /// Document layout version.
    pub version: u32,
    /// SHA-256 of the canonical document JSON.
    pub hash: String,
    pub document: Document,
}

impl Snapshot {
    /// Capture `cinema` and stamp the hash.
    pub fn seal(cinema: &Cinema) -> Result<Self, serde_json::Error> {
        let document = Document::capture(cinema);
        let hash = document_hash(&document)?;
        Ok(Self {
            version: DOCUMENT_VERSION,
            hash,
            document,
        })
    }

    /// Recompute the document hash.
    pub fn computed_hash(&self) -> Result<String, serde_json::Error> {
        document_hash(&self.document)
    }
}

/// True if the stored hash matches the document content.
pub fn verify_snapshot_hash(snap: &Snapshot) -> bool {
    snap.computed_hash().is_ok_and(|h| h == snap.hash)
}
