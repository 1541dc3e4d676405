/// Cinema Model — Invariant Checks
///
/// Whole-graph validation. Run after every load and by the property tests.
/// Returns the first failure as `[INVARIANT:name] detail`.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::associations::{self, Supervision};
use crate::domain::{OrderType, RoleType};
use crate::graph::detect_cycles;
use crate::state::{label, Cinema};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[INVARIANT:{invariant}] {detail}")]
pub struct InvariantViolation {
    pub invariant: &'static str,
    pub detail: String,
}

impl InvariantViolation {
    pub fn new(invariant: &'static str, detail: impl Into<String>) -> Self {
        Self {
            invariant,
            detail: detail.into(),
        }
    }
}

type Checked = Result<(), InvariantViolation>;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn check_invariants(cinema: &Cinema) -> Checked {
    associations::check_all(cinema)?;
    check_supervision_acyclic(cinema)?;
    check_unique_role_types(cinema)?;
    check_role_kinds(cinema)?;
    check_seats_per_session(cinema)?;
    check_order_pairs(cinema)?;
    check_hall_capacity(cinema)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

fn check_supervision_acyclic(cinema: &Cinema) -> Checked {
    if let Some(cycle) = detect_cycles::<Supervision, _>(cinema).first() {
        let path: Vec<String> = cycle.iter().map(|id| label(*id)).collect();
        return Err(InvariantViolation::new("supervision_acyclic", path.join(" -> ")));
    }
    Ok(())
}

fn check_unique_role_types(cinema: &Cinema) -> Checked {
    for (employee, e) in cinema.employees.all() {
        let mut seen: BTreeSet<RoleType> = BTreeSet::new();
        for role in &e.roles {
            if let Some(r) = cinema.find(*role) {
                if !seen.insert(r.role_type()) {
                    return Err(InvariantViolation::new(
                        "unique_role_type",
                        format!("{} holds two {} roles", label(employee), r.role_type().name()),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Technician and cleaner slots only reference roles of that type.
fn check_role_kinds(cinema: &Cinema) -> Checked {
    for (session, s) in cinema.sessions.all() {
        for role in &s.technicians {
            if cinema.find(*role).is_some_and(|r| r.role_type() != RoleType::Technician) {
                return Err(InvariantViolation::new(
                    "role_kind",
                    format!("{} lists non-technician {}", label(session), label(*role)),
                ));
            }
        }
    }
    for (shift, s) in cinema.shifts.all() {
        if let Some(role) = s.cleaner {
            if cinema.find(role).is_some_and(|r| r.role_type() != RoleType::Cleaner) {
                return Err(InvariantViolation::new(
                    "role_kind",
                    format!("{} is assigned to non-cleaner {}", label(shift), label(role)),
                ));
            }
        }
    }
    Ok(())
}

fn check_seats_per_session(cinema: &Cinema) -> Checked {
    for (session, s) in cinema.sessions.all() {
        let mut seats = BTreeSet::new();
        for ticket in &s.tickets {
            if let Some(seat) = cinema.find(*ticket).and_then(|t| t.seat) {
                if !seats.insert(seat) {
                    return Err(InvariantViolation::new(
                        "seat_once_per_session",
                        format!("{} is sold twice for {}", label(seat), label(session)),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn check_order_pairs(cinema: &Cinema) -> Checked {
    for (order, o) in cinema.orders.all() {
        if o.order_type == OrderType::Online && o.cashier.is_some() {
            return Err(InvariantViolation::new(
                "order_discriminator",
                format!("online {} has a cashier", label(order)),
            ));
        }
        if let Some(cashier) = o.cashier {
            if !cinema.has_role(cashier, RoleType::Cashier) {
                return Err(InvariantViolation::new(
                    "order_cashier_role",
                    format!("{} is served by {} without a cashier role", label(order), label(cashier)),
                ));
            }
        }
    }
    Ok(())
}

fn check_hall_capacity(cinema: &Cinema) -> Checked {
    let max = cinema.limits.max_hall_capacity;
    for (hall, h) in cinema.halls.all() {
        if h.capacity == 0 || h.capacity > max {
            return Err(InvariantViolation::new(
                "hall_capacity",
                format!("{} has capacity {} outside 1..={}", label(hall), h.capacity, max),
            ));
        }
    }
    Ok(())
}
