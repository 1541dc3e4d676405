//! Store session — a cinema bound to a store file.
//!
//! Opening a session loads the file if it exists. Mutations go through
//! `cinema_mut`; `save` overwrites the whole file.
//! Concurrency: `SharedSession` serializes access with a Mutex; there is
//! no global mutable state.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use cinema_model::hashing::canonical_hash;
use cinema_model::Cinema;

use crate::config::StoreConfig;
use crate::gateway::{self, GatewayError, Result};

pub struct Session {
    path: PathBuf,
    pretty: bool,
    cinema: Cinema,
    loaded_from_disk: bool,
}

impl Session {
    /// Open the store described by `config`, loading it if present.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let path = config.path();
        let mut cinema = Cinema::new();
        let loaded_from_disk = gateway::load_from_file(&mut cinema, &path)?;
        Ok(Self {
            path,
            pretty: config.pretty,
            cinema,
            loaded_from_disk,
        })
    }

    pub fn cinema(&self) -> &Cinema {
        &self.cinema
    }

    pub fn cinema_mut(&mut self) -> &mut Cinema {
        &mut self.cinema
    }

    pub fn save(&self) -> Result<()> {
        gateway::save_to_file(&self.cinema, &self.path, self.pretty)
    }

    /// Discard in-memory changes and re-read the file. Returns whether a
    /// file was found; without one the cinema is left as it is.
    pub fn reload(&mut self) -> Result<bool> {
        let found = gateway::load_from_file(&mut self.cinema, &self.path)?;
        self.loaded_from_disk |= found;
        Ok(found)
    }

    /// Empty every extent. The file is not touched until `save`.
    pub fn reset(&mut self) {
        self.cinema.reset();
    }

    pub fn current_hash(&self) -> Result<String> {
        canonical_hash(&self.cinema).map_err(GatewayError::Serialization)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store file existed when the session was opened or last
    /// reloaded.
    pub fn loaded_from_disk(&self) -> bool {
        self.loaded_from_disk
    }
}

/// Thread-safe session handle.
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    /// A poisoned lock still holds a consistent graph: model operations
    /// validate before they mutate.
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the cinema under the lock.
    pub fn with_cinema<R>(&self, f: impl FnOnce(&mut Cinema) -> R) -> R {
        let mut session = self.lock();
        f(session.cinema_mut())
    }

    pub fn save(&self) -> Result<()> {
        self.lock().save()
    }

    pub fn reload(&self) -> Result<bool> {
        self.lock().reload()
    }

    pub fn current_hash(&self) -> Result<String> {
        self.lock().current_hash()
    }

    pub fn into_inner(self) -> Session {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
