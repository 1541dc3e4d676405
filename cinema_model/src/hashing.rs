/// Cinema Model — Canonical Hashing
///
/// Deterministic serialization of the document form plus SHA-256.
///
/// Rules:
///   - extents in fixed declaration order
///   - records in id order, fields in declaration order
///   - reverse slots omitted
///   - UTF-8 JSON, no whitespace, no float

use sha2::{Digest, Sha256};

use crate::document::Document;
use crate::state::Cinema;

/// Canonical JSON bytes of a document.
pub fn document_bytes(document: &Document) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(document)
}

/// SHA-256 of the canonical bytes. Lowercase hex.
pub fn document_hash(document: &Document) -> Result<String, serde_json::Error> {
    document_bytes(document).map(|bytes| sha256_hex(&bytes))
}

pub fn canonical_serialize(cinema: &Cinema) -> Result<Vec<u8>, serde_json::Error> {
    document_bytes(&Document::capture(cinema))
}

pub fn canonical_hash(cinema: &Cinema) -> Result<String, serde_json::Error> {
    document_hash(&Document::capture(cinema))
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
