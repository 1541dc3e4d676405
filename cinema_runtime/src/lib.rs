#![forbid(unsafe_code)]

//! Cinema runtime.
//!
//! Wraps the cinema model with file persistence, snapshot integrity,
//! store sessions, configuration and drift detection.
//!
//! No domain logic lives here; every rule is enforced by the model.

pub mod config;
pub mod snapshot;
pub mod gateway;
pub mod session;
pub mod drift;

pub use config::StoreConfig;
pub use gateway::{load_from_file, save_to_file, GatewayError};
pub use session::{Session, SharedSession};
