//! Error types for the cinema model.
//!
//! Every fallible operation returns [`ModelError`]. Checks run before any
//! slot is touched, so an `Err` always means nothing changed.

use thiserror::Error;

use crate::invariants::InvariantViolation;

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Coarse classification used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A required reference was missing. Never retried.
    Argument,
    /// The operation conflicts with the current graph. The caller may pick
    /// a different operation.
    State,
    /// A scalar field failed validation.
    Validation,
    /// A persisted document does not describe a consistent graph.
    Corrupt,
}

/// Scalar field rejected by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    // ═══════════════════════════════════════════════════════════
    // Argument errors
    // ═══════════════════════════════════════════════════════════

    #[error("{association} requires a {role}")]
    MissingReference {
        association: &'static str,
        role: &'static str,
    },

    // ═══════════════════════════════════════════════════════════
    // State errors
    // ═══════════════════════════════════════════════════════════

    #[error("{entity} is not live")]
    NotLive { entity: String },

    #[error("{association}: {holder} must keep at least {min} link(s)")]
    Multiplicity {
        association: &'static str,
        holder: String,
        min: usize,
    },

    #[error("{association}: {part} already belongs to {owner}; detach it first")]
    AlreadyOwned {
        association: &'static str,
        part: String,
        owner: String,
    },

    #[error("{association}: {target} is already bound to {holder}")]
    SlotOccupied {
        association: &'static str,
        target: String,
        holder: String,
    },

    #[error("{association}: {holder} is not linked to {target}")]
    NotLinked {
        association: &'static str,
        holder: String,
        target: String,
    },

    #[error("{container}: key {key} is already bound")]
    DuplicateKey { container: String, key: String },

    #[error("{container} is at capacity ({capacity})")]
    CapacityExceeded { container: String, capacity: usize },

    #[error("{association}: {entity} cannot reference itself")]
    SelfReference {
        association: &'static str,
        entity: String,
    },

    #[error("{association}: linking would create the cycle {path}")]
    Cycle {
        association: &'static str,
        path: String,
    },

    #[error("{order} ({order_type}): {detail}")]
    Discriminator {
        order: String,
        order_type: &'static str,
        detail: &'static str,
    },

    #[error("{employee} does not hold a {role} role")]
    MissingRole {
        employee: String,
        role: &'static str,
    },

    #[error("{employee} already holds a {role} role")]
    DuplicateRole {
        employee: String,
        role: &'static str,
    },

    #[error("{role} is not a {expected} role")]
    WrongRoleKind {
        role: String,
        expected: &'static str,
    },

    #[error("cannot {action} {entity} while it is {status}")]
    InvalidTransition {
        entity: String,
        status: &'static str,
        action: &'static str,
    },

    #[error("{seat} is not part of {hall}")]
    SeatNotInHall { seat: String, hall: String },

    #[error("{seat} is already ticketed for {session}")]
    SeatTaken { seat: String, session: String },

    // ═══════════════════════════════════════════════════════════
    // Validation / corruption
    // ═══════════════════════════════════════════════════════════

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("corrupt document: {0}")]
    Corrupt(String),

    #[error("corrupt document: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl ModelError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingReference { .. } => ErrorCategory::Argument,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Corrupt(_) | Self::Invariant(_) => ErrorCategory::Corrupt,
            _ => ErrorCategory::State,
        }
    }

    pub fn is_state(&self) -> bool {
        self.category() == ErrorCategory::State
    }
}
