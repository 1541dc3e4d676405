#![forbid(unsafe_code)]

//! Cinema domain model.
//!
//! Entities live in per-type extents owned by a [`Cinema`]. Every
//! relationship is a pair of slots kept symmetric by one generic link
//! protocol; deletes cascade along ownership; the whole graph round-trips
//! through a [`Document`] with identity preserved.

/// Version of the persisted document layout.
pub const DOCUMENT_VERSION: u32 = 1;

pub mod error;
pub mod extent;
pub mod domain;
pub mod state;
pub mod validate;
pub mod link;
pub mod qualified;
pub mod associations;
pub mod graph;
pub mod staff;
pub mod venue;
pub mod sales;
pub mod cascade;
pub mod invariants;
pub mod document;
pub mod hashing;

pub use cascade::Cascade;
pub use document::{Document, Record};
pub use error::{ErrorCategory, ModelError, Result, ValidationError};
pub use extent::{Extent, Id};
pub use invariants::{check_invariants, InvariantViolation};
pub use link::Change;
pub use sales::{NewCustomer, NewOrder, NewPromotion, NewReview, NewTicket};
pub use staff::{NewEmployee, NewRole};
pub use state::{Cinema, Entity};
pub use venue::{NewMovie, NewSeat, NewSession, NewShift};
