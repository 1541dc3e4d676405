//! Drift detection — compare two cinemas extent by extent.
//!
//! Used to confirm that a save/load cycle reproduced the same graph and
//! to summarise what changed between two stored versions.

use std::collections::BTreeSet;

use cinema_model::hashing::canonical_hash;
use cinema_model::{Cinema, Document, Record};

/// Per-extent difference in ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtentDrift {
    pub kind: &'static str,
    pub count_a: usize,
    pub count_b: usize,
    pub added: Vec<u64>,
    pub removed: Vec<u64>,
}

impl ExtentDrift {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DriftReport {
    pub hash_a: String,
    pub hash_b: String,
    /// Only extents whose id sets differ.
    pub extents: Vec<ExtentDrift>,
}

impl DriftReport {
    /// Same ids everywhere and the same canonical hash.
    pub fn is_identical(&self) -> bool {
        self.hash_a == self.hash_b && self.extents.is_empty()
    }

    /// Same ids everywhere; attribute values may still differ.
    pub fn same_shape(&self) -> bool {
        self.extents.is_empty()
    }
}

fn ids<T>(records: &[Record<T>]) -> BTreeSet<u64> {
    records.iter().map(|r| r.id.raw()).collect()
}

fn extent_drift(kind: &'static str, a: BTreeSet<u64>, b: BTreeSet<u64>) -> ExtentDrift {
    ExtentDrift {
        kind,
        count_a: a.len(),
        count_b: b.len(),
        added: b.difference(&a).copied().collect(),
        removed: a.difference(&b).copied().collect(),
    }
}

pub fn compare(a: &Cinema, b: &Cinema) -> Result<DriftReport, serde_json::Error> {
    let da = Document::capture(a);
    let db = Document::capture(b);

    let extents = vec![
        extent_drift("contract", ids(&da.contracts), ids(&db.contracts)),
        extent_drift("employee", ids(&da.employees), ids(&db.employees)),
        extent_drift("role", ids(&da.roles), ids(&db.roles)),
        extent_drift("customer", ids(&da.customers), ids(&db.customers)),
        extent_drift("hall", ids(&da.halls), ids(&db.halls)),
        extent_drift("seat", ids(&da.seats), ids(&db.seats)),
        extent_drift("equipment", ids(&da.equipment), ids(&db.equipment)),
        extent_drift("movie", ids(&da.movies), ids(&db.movies)),
        extent_drift("session", ids(&da.sessions), ids(&db.sessions)),
        extent_drift("shift", ids(&da.shifts), ids(&db.shifts)),
        extent_drift("promotion", ids(&da.promotions), ids(&db.promotions)),
        extent_drift("ticket", ids(&da.tickets), ids(&db.tickets)),
        extent_drift("order", ids(&da.orders), ids(&db.orders)),
        extent_drift("review", ids(&da.reviews), ids(&db.reviews)),
    ]
    .into_iter()
    .filter(|d| !d.is_empty())
    .collect();

    Ok(DriftReport {
        hash_a: canonical_hash(a)?,
        hash_b: canonical_hash(b)?,
        extents,
    })
}

/// Encode, decode and restore `cinema`; report any difference.
pub fn verify_round_trip(cinema: &Cinema) -> Result<DriftReport, crate::gateway::GatewayError> {
    let json = crate::gateway::encode(cinema, false)?;
    let restored = crate::gateway::restore(&json)?;
    compare(cinema, &restored).map_err(crate::gateway::GatewayError::Serialization)
}
