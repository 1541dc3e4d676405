/// Cinema Model — Sales
///
/// Customers, promotions, tickets, orders and reviews.
///
/// An order is either online or box office. The type decides which side
/// of the customer/cashier pair is allowed or required:
///
/// | type       | customer                      | cashier                    |
/// |------------|-------------------------------|----------------------------|
/// | online     | required by finalize          | forbidden                  |
/// | box office | optional (bonus attribution)  | required, must be cashier  |
///
/// Orders move pending -> paid -> refunded and can only be edited while
/// pending.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::associations::{
    OrderCashier, OrderCustomer, OrderTickets, ReviewAuthor, ReviewSession, TicketPromotions,
    TicketSeat, TicketSession,
};
use crate::domain::{
    Customer, Employee, Order, OrderStatus, OrderType, Person, Promotion, Review, RoleType, Seat,
    Session, Ticket,
};
use crate::error::{ModelError, Result};
use crate::extent::Id;
use crate::link::{self, Change};
use crate::state::{label, Cinema};
use crate::validate::{self, CENTS_PER_POINT};

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub person: Person,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct NewPromotion {
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub description: String,
    pub discount_cents: i64,
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub session: Id<Session>,
    pub seat: Option<Id<Seat>>,
    pub discount_cents: i64,
    pub bonus_points_used: u32,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub created_at: NaiveDateTime,
    pub order_type: OrderType,
    pub tickets: Vec<Id<Ticket>>,
    pub customer: Option<Id<Customer>>,
    pub cashier: Option<Id<Employee>>,
    pub email_for_bonus_points: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub author: Id<Customer>,
    pub session: Id<Session>,
    pub rating_of_movie: u8,
    pub rating_of_hall: u8,
    pub comment: String,
}

const NEW_ORDER: &str = "new order";

fn discriminator(order: String, order_type: OrderType, detail: &'static str) -> ModelError {
    ModelError::Discriminator {
        order,
        order_type: order_type.name(),
        detail,
    }
}

impl Cinema {
    // ── Customers ──────────────────────────────────────────────────

    pub fn register_customer(&mut self, new: NewCustomer) -> Result<Id<Customer>> {
        validate::validate_person(&new.person, self.today(), self.limits.max_age_years)?;
        validate::validate_email(&new.email)?;
        validate::validate_password(&new.password)?;
        Ok(self.insert(Customer {
            person: new.person,
            email: new.email.trim().to_string(),
            password_hash: validate::hash_secret(&new.password),
            orders: Vec::new(),
            reviews: Vec::new(),
        }))
    }

    pub fn change_email(&mut self, customer: Id<Customer>, email: &str) -> Result<()> {
        self.entity(customer)?;
        validate::validate_email(email)?;
        if let Some(c) = self.entity_mut(customer) {
            c.email = email.trim().to_string();
        }
        Ok(())
    }

    pub fn change_password(&mut self, customer: Id<Customer>, password: &str) -> Result<()> {
        self.entity(customer)?;
        validate::validate_password(password)?;
        if let Some(c) = self.entity_mut(customer) {
            c.password_hash = validate::hash_secret(password);
        }
        Ok(())
    }

    pub fn verify_password(&self, customer: Id<Customer>, password: &str) -> Result<bool> {
        Ok(self.entity(customer)?.password_hash == validate::hash_secret(password))
    }

    /// First customer, in registration order, whose email matches
    /// ignoring case.
    pub fn find_customer_by_email(&self, email: &str) -> Option<Id<Customer>> {
        let wanted = email.trim().to_lowercase();
        self.customers
            .all()
            .find(|(_, c)| c.email.to_lowercase() == wanted)
            .map(|(id, _)| id)
    }

    /// Points earned by the customer's paid orders.
    pub fn customer_bonus_points(&self, customer: Id<Customer>) -> Result<u32> {
        let mut total: u32 = 0;
        for order in link::holders::<OrderCustomer>(self, customer) {
            if self.entity(order)?.status == OrderStatus::Paid {
                total = total.saturating_add(self.order_points(order)?);
            }
        }
        Ok(total)
    }

    // ── Promotions ─────────────────────────────────────────────────

    pub fn add_promotion(&mut self, new: NewPromotion) -> Result<Id<Promotion>> {
        validate::validate_period(new.valid_from, new.valid_to)?;
        validate::require_text("description", &new.description)?;
        validate::non_negative("discount", new.discount_cents)?;
        Ok(self.insert(Promotion {
            valid_from: new.valid_from,
            valid_to: new.valid_to,
            description: new.description.trim().to_string(),
            discount_cents: new.discount_cents,
            sessions: Vec::new(),
            tickets: Vec::new(),
        }))
    }

    pub fn active_promotions(&self, on: NaiveDate) -> Vec<Id<Promotion>> {
        self.promotions
            .all()
            .filter(|(_, p)| p.is_active_on(on))
            .map(|(id, _)| id)
            .collect()
    }

    // ── Tickets ────────────────────────────────────────────────────

    /// A ticket for `session`, not yet in any order. A seat must belong to
    /// the session's hall and be free for that session.
    pub fn issue_ticket(&mut self, new: NewTicket) -> Result<Id<Ticket>> {
        validate::non_negative("discount", new.discount_cents)?;
        link::admit::<TicketSession>(self, new.session)?;
        if let Some(seat) = new.seat {
            self.check_seat_free(new.session, seat)?;
        }

        let id = self.insert(Ticket {
            session: Some(new.session),
            seat: new.seat,
            order: None,
            promotions: Vec::new(),
            discount_cents: new.discount_cents,
            bonus_points_used: new.bonus_points_used,
            booked: false,
        });
        link::connect::<TicketSession>(self, id);
        link::connect::<TicketSeat>(self, id);
        Ok(id)
    }

    fn check_seat_free(&self, session: Id<Session>, seat: Id<Seat>) -> Result<()> {
        let hall = self.hall_of_session(session)?;
        let placed_in = self.entity(seat)?.placement.map(|p| p.hall);
        if placed_in != Some(hall) {
            return Err(ModelError::SeatNotInHall {
                seat: label(seat),
                hall: label(hall),
            });
        }
        let taken = link::holders::<TicketSession>(self, session)
            .into_iter()
            .any(|ticket| self.find(ticket).is_some_and(|t| t.seat == Some(seat)));
        if taken {
            return Err(ModelError::SeatTaken {
                seat: label(seat),
                session: label(session),
            });
        }
        Ok(())
    }

    /// Move a ticket to another seat of the same session, or drop the seat.
    pub fn change_seat(&mut self, ticket: Id<Ticket>, seat: Option<Id<Seat>>) -> Result<Change> {
        let t = self.entity(ticket)?;
        if t.seat == seat {
            return Ok(Change::Unchanged);
        }
        if let (Some(session), Some(seat)) = (t.session, seat) {
            self.check_seat_free(session, seat)?;
        }
        link::set::<TicketSeat, _>(self, ticket, seat)
    }

    pub fn book_ticket(&mut self, ticket: Id<Ticket>) -> Result<()> {
        if self.entity(ticket)?.booked {
            return Err(ModelError::InvalidTransition {
                entity: label(ticket),
                status: "booked",
                action: "book",
            });
        }
        if let Some(t) = self.entity_mut(ticket) {
            t.booked = true;
        }
        Ok(())
    }

    pub fn apply_ticket_promotion(&mut self, ticket: Id<Ticket>, promotion: Id<Promotion>) -> Result<Change> {
        link::link::<TicketPromotions>(self, ticket, promotion)
    }

    pub fn remove_ticket_promotion(&mut self, ticket: Id<Ticket>, promotion: Id<Promotion>) -> Result<Change> {
        link::unlink::<TicketPromotions>(self, ticket, promotion)
    }

    /// Seat price minus discount and redeemed points, never below zero.
    pub fn ticket_price_cents(&self, ticket: Id<Ticket>) -> Result<i64> {
        let t = self.entity(ticket)?;
        let base = t
            .seat
            .and_then(|seat| self.find(seat))
            .map_or(0, Seat::final_price_cents);
        let points = i64::from(t.bonus_points_used).saturating_mul(CENTS_PER_POINT);
        Ok(base.saturating_sub(t.discount_cents).saturating_sub(points).max(0))
    }

    // ── Orders ─────────────────────────────────────────────────────

    pub fn place_order(&mut self, new: NewOrder) -> Result<Id<Order>> {
        validate::not_in_future("created_at", new.created_at, self.now())?;
        if let Some(email) = &new.email_for_bonus_points {
            validate::validate_email(email)?;
        }
        if new.tickets.is_empty() {
            return Err(ModelError::MissingReference {
                association: "order-tickets",
                role: "ticket",
            });
        }
        let mut tickets: Vec<Id<Ticket>> = Vec::new();
        for ticket in new.tickets {
            if let Some(owner) = self.entity(ticket)?.order {
                return Err(ModelError::AlreadyOwned {
                    association: "order-tickets",
                    part: label(ticket),
                    owner: label(owner),
                });
            }
            if !tickets.contains(&ticket) {
                tickets.push(ticket);
            }
        }
        self.check_order_pair(
            NEW_ORDER.to_string(),
            new.order_type,
            new.customer,
            new.cashier,
            new.email_for_bonus_points.is_some(),
        )?;

        let id = self.insert(Order {
            created_at: new.created_at,
            order_type: new.order_type,
            status: OrderStatus::Pending,
            email_for_bonus_points: new.email_for_bonus_points.map(|e| e.trim().to_string()),
            customer: new.customer,
            cashier: new.cashier,
            tickets: Vec::new(),
        });
        for ticket in tickets {
            link::attach::<OrderTickets>(self, ticket, id);
        }
        link::connect::<OrderCustomer>(self, id);
        link::connect::<OrderCashier>(self, id);
        info!(order = %id, order_type = new.order_type.name(), "order placed");
        Ok(id)
    }

    /// Discriminator rules shared by construction and retyping.
    fn check_order_pair(
        &self,
        order: String,
        order_type: OrderType,
        customer: Option<Id<Customer>>,
        cashier: Option<Id<Employee>>,
        has_email: bool,
    ) -> Result<()> {
        if let Some(customer) = customer {
            self.entity(customer)?;
        }
        match order_type {
            OrderType::Online => {
                if cashier.is_some() {
                    return Err(discriminator(order, order_type, "an online order cannot have a cashier"));
                }
                if customer.is_none() && !has_email {
                    return Err(ModelError::MissingReference {
                        association: "order-customer",
                        role: "customer or bonus email",
                    });
                }
            }
            OrderType::BoxOffice => {
                let Some(cashier) = cashier else {
                    return Err(ModelError::MissingReference {
                        association: "order-cashier",
                        role: "cashier",
                    });
                };
                self.require_role(cashier, RoleType::Cashier)?;
            }
        }
        Ok(())
    }

    fn pending_order(&self, order: Id<Order>, action: &'static str) -> Result<&Order> {
        let o = self.entity(order)?;
        if o.status != OrderStatus::Pending {
            return Err(ModelError::InvalidTransition {
                entity: label(order),
                status: o.status.name(),
                action,
            });
        }
        Ok(o)
    }

    pub fn add_ticket_to_order(&mut self, order: Id<Order>, ticket: Id<Ticket>) -> Result<Change> {
        self.pending_order(order, "edit")?;
        link::set::<OrderTickets, _>(self, ticket, Some(order))
    }

    /// Release `ticket` from `order`. The last ticket cannot be removed.
    pub fn remove_ticket_from_order(&mut self, order: Id<Order>, ticket: Id<Ticket>) -> Result<Change> {
        self.pending_order(order, "edit")?;
        if self.entity(ticket)?.order != Some(order) {
            return Err(ModelError::NotLinked {
                association: "order-tickets",
                holder: label(ticket),
                target: label(order),
            });
        }
        link::set::<OrderTickets, _>(self, ticket, None)
    }

    pub fn set_order_customer(&mut self, order: Id<Order>, customer: Option<Id<Customer>>) -> Result<Change> {
        self.pending_order(order, "edit")?;
        link::set::<OrderCustomer, _>(self, order, customer)
    }

    pub fn set_order_cashier(&mut self, order: Id<Order>, cashier: Option<Id<Employee>>) -> Result<Change> {
        let order_type = self.pending_order(order, "edit")?.order_type;
        match (order_type, cashier) {
            (OrderType::Online, Some(_)) => {
                return Err(discriminator(label(order), order_type, "an online order cannot have a cashier"));
            }
            (OrderType::BoxOffice, None) => {
                return Err(ModelError::MissingReference {
                    association: "order-cashier",
                    role: "cashier",
                });
            }
            (_, Some(cashier)) => {
                self.require_role(cashier, RoleType::Cashier)?;
            }
            (OrderType::Online, None) => {}
        }
        link::set::<OrderCashier, _>(self, order, cashier)
    }

    /// Change the order type together with both sides of the pair.
    pub fn retype_order(
        &mut self,
        order: Id<Order>,
        order_type: OrderType,
        customer: Option<Id<Customer>>,
        cashier: Option<Id<Employee>>,
    ) -> Result<()> {
        let has_email = self
            .pending_order(order, "retype")?
            .email_for_bonus_points
            .is_some();
        self.check_order_pair(label(order), order_type, customer, cashier, has_email)?;

        link::set::<OrderCustomer, _>(self, order, customer)?;
        link::set::<OrderCashier, _>(self, order, cashier)?;
        if let Some(o) = self.entity_mut(order) {
            o.order_type = order_type;
        }
        Ok(())
    }

    /// Mark the order paid.
    ///
    /// An order without a customer but with a bonus email is first linked
    /// to the first customer whose email matches. A miss is logged; online
    /// orders still need a customer at this point.
    pub fn finalize_order(&mut self, order: Id<Order>) -> Result<()> {
        let o = self.pending_order(order, "finalize")?;
        if o.tickets.is_empty() {
            return Err(ModelError::MissingReference {
                association: "order-tickets",
                role: "ticket",
            });
        }
        let matched = match (o.customer, &o.email_for_bonus_points) {
            (None, Some(email)) => {
                let found = self.find_customer_by_email(email);
                if found.is_none() {
                    warn!(order = %order, email = %email, "no customer matches bonus email");
                }
                found
            }
            _ => None,
        };
        let customer = o.customer.or(matched);
        match o.order_type {
            OrderType::Online if customer.is_none() => {
                return Err(discriminator(label(order), o.order_type, "an online order needs a customer"));
            }
            OrderType::BoxOffice => {
                let Some(cashier) = o.cashier else {
                    return Err(ModelError::MissingReference {
                        association: "order-cashier",
                        role: "cashier",
                    });
                };
                self.require_role(cashier, RoleType::Cashier)?;
            }
            _ => {}
        }

        if let Some(customer) = matched {
            link::set::<OrderCustomer, _>(self, order, Some(customer))?;
        }
        if let Some(o) = self.entity_mut(order) {
            o.status = OrderStatus::Paid;
        }
        info!(order = %order, customer = ?customer, "order finalized");
        Ok(())
    }

    pub fn refund_order(&mut self, order: Id<Order>) -> Result<()> {
        let status = self.entity(order)?.status;
        if status != OrderStatus::Paid {
            return Err(ModelError::InvalidTransition {
                entity: label(order),
                status: status.name(),
                action: "refund",
            });
        }
        if let Some(o) = self.entity_mut(order) {
            o.status = OrderStatus::Refunded;
        }
        info!(order = %order, "order refunded");
        Ok(())
    }

    /// Tickets times points per ticket.
    pub fn order_points(&self, order: Id<Order>) -> Result<u32> {
        let tickets = self.entity(order)?.tickets.len() as u32;
        Ok(tickets.saturating_mul(self.limits.points_per_ticket))
    }

    pub fn order_total_cents(&self, order: Id<Order>) -> Result<i64> {
        let mut total: i64 = 0;
        for ticket in link::holders::<OrderTickets>(self, order) {
            total = total.saturating_add(self.ticket_price_cents(ticket)?);
        }
        Ok(total)
    }

    // ── Reviews ────────────────────────────────────────────────────

    pub fn write_review(&mut self, new: NewReview) -> Result<Id<Review>> {
        validate::validate_rating("rating_of_movie", new.rating_of_movie)?;
        validate::validate_rating("rating_of_hall", new.rating_of_hall)?;
        validate::require_text("comment", &new.comment)?;
        link::admit::<ReviewAuthor>(self, new.author)?;
        link::admit::<ReviewSession>(self, new.session)?;

        let id = self.insert(Review {
            rating_of_movie: new.rating_of_movie,
            rating_of_hall: new.rating_of_hall,
            date: self.now(),
            comment: new.comment.trim().to_string(),
            author: Some(new.author),
            session: Some(new.session),
        });
        link::connect::<ReviewAuthor>(self, id);
        link::connect::<ReviewSession>(self, id);
        Ok(id)
    }

    pub fn edit_review(&mut self, review: Id<Review>, rating_of_movie: u8, rating_of_hall: u8, comment: &str) -> Result<()> {
        self.entity(review)?;
        validate::validate_rating("rating_of_movie", rating_of_movie)?;
        validate::validate_rating("rating_of_hall", rating_of_hall)?;
        validate::require_text("comment", comment)?;
        let now = self.now();
        if let Some(r) = self.entity_mut(review) {
            r.rating_of_movie = rating_of_movie;
            r.rating_of_hall = rating_of_hall;
            r.comment = comment.trim().to_string();
            r.date = now;
        }
        Ok(())
    }
}
