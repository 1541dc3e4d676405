//! Persistence gateway — encode, decode and file I/O for a whole cinema.
//!
//! - `encode`:         cinema → snapshot JSON
//! - `decode`:         JSON → verified snapshot (strict, hash checked)
//! - `restore`:        decode + rebuild graph + invariant checks
//! - `save_to_file`:   overwrite a file, creating parent directories
//! - `load_from_file`: replace a cinema from a file; no-op when missing

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use cinema_model::{Cinema, ModelError, DOCUMENT_VERSION};

use crate::snapshot::Snapshot;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Malformed JSON, missing fields or unknown fields.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("integrity check failed: stored hash {stored}, computed {computed}")]
    Integrity { stored: String, computed: String },

    /// The document decoded but does not describe a consistent graph.
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> GatewayError + '_ {
    move |source| GatewayError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Encoder / decoder
// ---------------------------------------------------------------------------

pub fn encode(cinema: &Cinema, pretty: bool) -> Result<String> {
    let snap = Snapshot::seal(cinema).map_err(GatewayError::Serialization)?;
    let json = if pretty {
        serde_json::to_string_pretty(&snap)
    } else {
        serde_json::to_string(&snap)
    };
    json.map_err(GatewayError::Serialization)
}

/// Parse and verify a snapshot. No graph is built.
pub fn decode(json: &str) -> Result<Snapshot> {
    let snap: Snapshot = serde_json::from_str(json).map_err(GatewayError::Deserialization)?;
    if snap.version != DOCUMENT_VERSION {
        return Err(GatewayError::Version {
            found: snap.version,
            expected: DOCUMENT_VERSION,
        });
    }
    let computed = snap.computed_hash().map_err(GatewayError::Serialization)?;
    if computed != snap.hash {
        return Err(GatewayError::Integrity {
            stored: snap.hash,
            computed,
        });
    }
    Ok(snap)
}

/// Decode and rebuild a fresh cinema.
pub fn restore(json: &str) -> Result<Cinema> {
    let snap = decode(json)?;
    Ok(snap.document.restore()?)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

pub fn save_to_file(cinema: &Cinema, path: &Path, pretty: bool) -> Result<()> {
    let json = encode(cinema, pretty)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    fs::write(path, json.as_bytes()).map_err(io_error(path))?;
    info!(path = %path.display(), entities = cinema.total_entities(), "cinema saved");
    Ok(())
}

/// Replace `cinema` with the graph stored at `path`.
///
/// Returns `Ok(false)` and leaves `cinema` untouched when the file does
/// not exist. Any failure also leaves `cinema` untouched.
pub fn load_from_file(cinema: &mut Cinema, path: &Path) -> Result<bool> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no store file; nothing loaded");
            return Ok(false);
        }
        Err(e) => return Err(io_error(path)(e)),
    };
    let restored = restore(&content).map_err(|e| {
        warn!(path = %path.display(), error = %e, "store file rejected");
        e
    })?;
    *cinema = restored;
    info!(path = %path.display(), entities = cinema.total_entities(), "cinema loaded");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("cinema_gateway_tests").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn encode_is_deterministic() {
        let cinema = Cinema::new();
        assert_eq!(encode(&cinema, false).unwrap(), encode(&cinema, false).unwrap());
    }

    #[test]
    fn pretty_and_compact_decode_alike() {
        let cinema = Cinema::new();
        let a = decode(&encode(&cinema, false).unwrap()).unwrap();
        let b = decode(&encode(&cinema, true).unwrap()).unwrap();
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn malformed_json_is_deserialization_error() {
        assert!(matches!(decode("{ nope"), Err(GatewayError::Deserialization(_))));
    }

    #[test]
    fn missing_field_is_deserialization_error() {
        assert!(matches!(
            decode(r#"{"version":1,"hash":"00"}"#),
            Err(GatewayError::Deserialization(_))
        ));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let json = encode(&Cinema::new(), false).unwrap().replacen("\"version\":1", "\"version\":9", 1);
        assert!(matches!(decode(&json), Err(GatewayError::Version { found: 9, .. })));
    }

    #[test]
    fn missing_file_is_a_noop() {
        let dir = temp_dir("missing");
        let mut cinema = Cinema::new();
        cinema.add_hall("Red", 10).unwrap();
        let loaded = load_from_file(&mut cinema, &dir.join("absent.json")).unwrap();
        assert!(!loaded);
        assert_eq!(cinema.total_entities(), 1);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = temp_dir("nested");
        let path = dir.join("a").join("b").join("cinema.json");
        save_to_file(&Cinema::new(), &path, false).unwrap();
        assert!(path.exists());
    }
}
