/// Cinema Model — Cascading Delete
///
/// Deleting an entity settles every relationship before it leaves its
/// extent, in a fixed order:
///
/// 1. clear its reflexive parent link;
/// 2. turn its reflexive children into roots;
/// 3. delete its composition parts, recursively;
/// 4. detach aggregation and optional-link counterparts (a cashier role
///    takes its owner's served orders with it);
/// 5. drop many-to-many links, ignoring minimum multiplicities;
/// 6. unregister it.
///
/// Every step is infallible once the entity is known to be live.

use tracing::info;

use crate::associations::{
    EmployeeContract, HallEquipment, HallSeats, OrderCashier, OrderCustomer, OrderTickets,
    ReviewAuthor, ReviewSession, RoleOwnership, SessionHall, SessionMovie, SessionPromotions,
    SessionTechnicians, ShiftCleaner, ShiftHall, Supervision, TicketPromotions, TicketSeat,
    TicketSession,
};
use crate::domain::{
    Contract, Customer, Employee, Equipment, Hall, Movie, Order, Promotion, Review, Role, RoleType,
    Seat, Session, Shift, Ticket,
};
use crate::error::Result;
use crate::extent::Id;
use crate::link;
use crate::qualified;
use crate::state::{label, Cinema, Entity};

/// An entity type with a delete path.
pub trait Cascade: Entity {
    /// Remove `id` and everything it owns. Returns the number of entities
    /// unregistered. `id` must be live.
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize;
}

impl Cinema {
    /// Delete a live entity and settle all of its relationships.
    pub fn delete<T: Cascade>(&mut self, id: Id<T>) -> Result<usize> {
        self.entity(id)?;
        let removed = T::cascade(self, id);
        info!(entity = %label(id), removed, "deleted");
        Ok(removed)
    }
}

/// Delete each part still live; parts may already be gone through another
/// owner.
fn delete_parts<T: Cascade>(cinema: &mut Cinema, parts: Vec<Id<T>>) -> usize {
    parts
        .into_iter()
        .map(|part| if cinema.contains(part) { T::cascade(cinema, part) } else { 0 })
        .sum()
}

fn finish<T: Entity>(cinema: &mut Cinema, id: Id<T>) -> usize {
    usize::from(cinema.unregister(id))
}

impl Cascade for Contract {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        link::sever_reverse::<EmployeeContract>(cinema, id);
        finish(cinema, id)
    }
}

impl Cascade for Employee {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        link::sever_forward::<Supervision>(cinema, id);
        link::sever_reverse::<Supervision>(cinema, id);
        let roles = link::holders::<RoleOwnership>(cinema, id);
        let mut removed = delete_parts(cinema, roles);
        link::sever_forward::<EmployeeContract>(cinema, id);
        link::sever_reverse::<OrderCashier>(cinema, id);
        removed += finish(cinema, id);
        removed
    }
}

impl Cascade for Role {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        // Orders served by the owner lose their cashier with the cashier role.
        let cashier = cinema
            .find(id)
            .filter(|r| r.role_type() == RoleType::Cashier)
            .and_then(|r| r.employee);
        if let Some(employee) = cashier {
            link::sever_reverse::<OrderCashier>(cinema, employee);
        }
        let shifts = link::holders::<ShiftCleaner>(cinema, id);
        let mut removed = delete_parts(cinema, shifts);
        link::sever_forward::<RoleOwnership>(cinema, id);
        link::sever_reverse::<SessionTechnicians>(cinema, id);
        removed += finish(cinema, id);
        removed
    }
}

impl Cascade for Customer {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        let reviews = link::holders::<ReviewAuthor>(cinema, id);
        let mut removed = delete_parts(cinema, reviews);
        link::sever_reverse::<OrderCustomer>(cinema, id);
        removed += finish(cinema, id);
        removed
    }
}

impl Cascade for Hall {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        let seats = cinema.find(id).map(|h| h.seats.members()).unwrap_or_default();
        let mut removed = delete_parts(cinema, seats);
        let sessions = link::holders::<SessionHall>(cinema, id);
        removed += delete_parts(cinema, sessions);
        let shifts = link::holders::<ShiftHall>(cinema, id);
        removed += delete_parts(cinema, shifts);
        link::sever_reverse::<HallEquipment>(cinema, id);
        removed += finish(cinema, id);
        removed
    }
}

impl Cascade for Seat {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        qualified::release::<HallSeats>(cinema, id);
        link::sever_reverse::<TicketSeat>(cinema, id);
        finish(cinema, id)
    }
}

impl Cascade for Equipment {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        link::sever_forward::<HallEquipment>(cinema, id);
        finish(cinema, id)
    }
}

impl Cascade for Movie {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        let sessions = link::holders::<SessionMovie>(cinema, id);
        delete_parts(cinema, sessions) + finish(cinema, id)
    }
}

impl Cascade for Session {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        let tickets = link::holders::<TicketSession>(cinema, id);
        let mut removed = delete_parts(cinema, tickets);
        let reviews = link::holders::<ReviewSession>(cinema, id);
        removed += delete_parts(cinema, reviews);
        link::sever_forward::<SessionHall>(cinema, id);
        link::sever_forward::<SessionMovie>(cinema, id);
        link::sever_forward::<SessionTechnicians>(cinema, id);
        link::sever_forward::<SessionPromotions>(cinema, id);
        removed += finish(cinema, id);
        removed
    }
}

impl Cascade for Shift {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        link::sever_forward::<ShiftCleaner>(cinema, id);
        link::sever_forward::<ShiftHall>(cinema, id);
        finish(cinema, id)
    }
}

impl Cascade for Ticket {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        link::sever_forward::<TicketSession>(cinema, id);
        link::sever_forward::<OrderTickets>(cinema, id);
        link::sever_forward::<TicketSeat>(cinema, id);
        link::sever_forward::<TicketPromotions>(cinema, id);
        finish(cinema, id)
    }
}

impl Cascade for Promotion {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        link::sever_reverse::<SessionPromotions>(cinema, id);
        link::sever_reverse::<TicketPromotions>(cinema, id);
        finish(cinema, id)
    }
}

impl Cascade for Order {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        let tickets = link::holders::<OrderTickets>(cinema, id);
        let mut removed = delete_parts(cinema, tickets);
        link::sever_forward::<OrderCustomer>(cinema, id);
        link::sever_forward::<OrderCashier>(cinema, id);
        removed += finish(cinema, id);
        removed
    }
}

impl Cascade for Review {
    fn cascade(cinema: &mut Cinema, id: Id<Self>) -> usize {
        link::sever_forward::<ReviewAuthor>(cinema, id);
        link::sever_forward::<ReviewSession>(cinema, id);
        finish(cinema, id)
    }
}
