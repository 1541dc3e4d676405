//! Store configuration.
//!
//! Loads from environment variables with defaults.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the cinema is stored and how it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the store file (`CINEMA_DATA_DIR`, default `data`)
    pub data_dir: PathBuf,
    /// File name inside `data_dir` (`CINEMA_STORE_FILE`, default `cinema.json`)
    pub file_name: String,
    /// Indent the written JSON (`CINEMA_PRETTY_JSON`, default false)
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            file_name: "cinema.json".to_string(),
            pretty: false,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: env::var("CINEMA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            file_name: env::var("CINEMA_STORE_FILE")
                .ok()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.file_name),
            pretty: env::var("CINEMA_PRETTY_JSON")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.pretty),
        }
    }

    /// Store rooted at `data_dir` with the default file name.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
