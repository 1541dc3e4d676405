/// Cinema Model — Association Catalogue
///
/// Every bidirectional relationship in the model, declared once. The
/// generic protocol in `link` and `qualified` does the rest.

use crate::domain::{
    Contract, Customer, Employee, Equipment, Hall, Movie, Order, Promotion, Review, Role, Seat,
    SeatPlacement, Session, Shift, Ticket,
};
use crate::error::Result;
use crate::extent::Id;
use crate::invariants::InvariantViolation;
use crate::link::{self, Association, AssociationKind};
use crate::qualified::{self, Qualified, QualifiedSlot};
use crate::state::Cinema;

macro_rules! association {
    (
        $(#[$meta:meta])*
        $name:ident: $left:ty => $right:ty,
        $kind:ident, $label:literal,
        forward $fwd:ident: $fwd_ty:ty,
        reverse $rev:ident: $rev_ty:ty
        $(, left_min $lmin:literal)?
        $(, right_min $rmin:literal)?
    ) => {
        $(#[$meta])*
        pub enum $name {}

        impl Association for $name {
            type Left = $left;
            type Right = $right;
            type Forward = $fwd_ty;
            type Reverse = $rev_ty;

            const NAME: &'static str = $label;
            const KIND: AssociationKind = AssociationKind::$kind;
            $(const LEFT_MIN: usize = $lmin;)?
            $(const RIGHT_MIN: usize = $rmin;)?

            fn forward(left: &$left) -> &$fwd_ty {
                &left.$fwd
            }

            fn forward_mut(left: &mut $left) -> &mut $fwd_ty {
                &mut left.$fwd
            }

            fn reverse(right: &$right) -> &$rev_ty {
                &right.$rev
            }

            fn reverse_mut(right: &mut $right) -> &mut $rev_ty {
                &mut right.$rev
            }
        }
    };
}

// ── Staff ──────────────────────────────────────────────────────────

association! {
    /// At most one contract per employee and vice versa.
    EmployeeContract: Employee => Contract,
    OptionalLink, "employee-contract",
    forward contract: Option<Id<Contract>>,
    reverse employee: Option<Id<Employee>>
}

association! {
    /// Roles are parts of their employee.
    RoleOwnership: Role => Employee,
    Composition, "role-ownership",
    forward employee: Option<Id<Employee>>,
    reverse roles: Vec<Id<Role>>,
    left_min 1
}

association! {
    Supervision: Employee => Employee,
    Reflexive, "supervision",
    forward supervisor: Option<Id<Employee>>,
    reverse subordinates: Vec<Id<Employee>>
}

// ── Venue ──────────────────────────────────────────────────────────

association! {
    /// Equipment outlives its hall.
    HallEquipment: Equipment => Hall,
    Aggregation, "hall-equipment",
    forward hall: Option<Id<Hall>>,
    reverse equipment: Vec<Id<Equipment>>
}

association! {
    SessionHall: Session => Hall,
    Composition, "session-hall",
    forward hall: Option<Id<Hall>>,
    reverse sessions: Vec<Id<Session>>,
    left_min 1
}

association! {
    SessionMovie: Session => Movie,
    Composition, "session-movie",
    forward movie: Option<Id<Movie>>,
    reverse sessions: Vec<Id<Session>>,
    left_min 1
}

association! {
    /// A session keeps at least one technician once it has one.
    SessionTechnicians: Session => Role,
    ManyToMany, "session-technicians",
    forward technicians: Vec<Id<Role>>,
    reverse sessions: Vec<Id<Session>>,
    left_min 1
}

association! {
    SessionPromotions: Session => Promotion,
    ManyToMany, "session-promotions",
    forward promotions: Vec<Id<Promotion>>,
    reverse sessions: Vec<Id<Session>>
}

association! {
    /// Required, but a shift may move between halls.
    ShiftHall: Shift => Hall,
    OptionalLink, "shift-hall",
    forward hall: Option<Id<Hall>>,
    reverse shifts: Vec<Id<Shift>>,
    left_min 1
}

association! {
    ShiftCleaner: Shift => Role,
    Composition, "shift-cleaner",
    forward cleaner: Option<Id<Role>>,
    reverse shifts: Vec<Id<Shift>>,
    left_min 1
}

// ── Sales ──────────────────────────────────────────────────────────

association! {
    TicketSession: Ticket => Session,
    Composition, "ticket-session",
    forward session: Option<Id<Session>>,
    reverse tickets: Vec<Id<Ticket>>,
    left_min 1
}

association! {
    TicketSeat: Ticket => Seat,
    OptionalLink, "ticket-seat",
    forward seat: Option<Id<Seat>>,
    reverse tickets: Vec<Id<Ticket>>
}

association! {
    TicketPromotions: Ticket => Promotion,
    ManyToMany, "ticket-promotions",
    forward promotions: Vec<Id<Promotion>>,
    reverse tickets: Vec<Id<Ticket>>
}

association! {
    /// An order keeps at least one ticket; the last one cannot be detached.
    OrderTickets: Ticket => Order,
    Composition, "order-tickets",
    forward order: Option<Id<Order>>,
    reverse tickets: Vec<Id<Ticket>>,
    right_min 1
}

association! {
    OrderCustomer: Order => Customer,
    Exclusive, "order-customer",
    forward customer: Option<Id<Customer>>,
    reverse orders: Vec<Id<Order>>
}

association! {
    OrderCashier: Order => Employee,
    Exclusive, "order-cashier",
    forward cashier: Option<Id<Employee>>,
    reverse served_orders: Vec<Id<Order>>
}

association! {
    ReviewAuthor: Review => Customer,
    Composition, "review-author",
    forward author: Option<Id<Customer>>,
    reverse reviews: Vec<Id<Review>>,
    left_min 1
}

association! {
    ReviewSession: Review => Session,
    Composition, "review-session",
    forward session: Option<Id<Session>>,
    reverse reviews: Vec<Id<Review>>,
    left_min 1
}

// ── Keyed containment ──────────────────────────────────────────────

/// Seats of a hall, keyed by seat number.
pub enum HallSeats {}

impl Qualified for HallSeats {
    type Container = Hall;
    type Member = Seat;
    type Key = u32;

    const NAME: &'static str = "hall-seats";

    fn slot(hall: &Hall) -> &QualifiedSlot<u32, Seat> {
        &hall.seats
    }

    fn slot_mut(hall: &mut Hall) -> &mut QualifiedSlot<u32, Seat> {
        &mut hall.seats
    }

    fn capacity(hall: &Hall) -> usize {
        hall.capacity as usize
    }

    fn placement(seat: &Seat) -> Option<(Id<Hall>, u32)> {
        seat.placement.map(|p| (p.hall, p.number))
    }

    fn set_placement(seat: &mut Seat, placement: Option<(Id<Hall>, u32)>) {
        seat.placement = placement.map(|(hall, number)| SeatPlacement { hall, number });
    }
}

// ── Catalogue-wide passes ──────────────────────────────────────────

macro_rules! for_each_association {
    ($apply:ident, $cinema:expr) => {{
        link::$apply::<EmployeeContract>($cinema)?;
        link::$apply::<RoleOwnership>($cinema)?;
        link::$apply::<Supervision>($cinema)?;
        link::$apply::<HallEquipment>($cinema)?;
        link::$apply::<SessionHall>($cinema)?;
        link::$apply::<SessionMovie>($cinema)?;
        link::$apply::<SessionTechnicians>($cinema)?;
        link::$apply::<SessionPromotions>($cinema)?;
        link::$apply::<ShiftHall>($cinema)?;
        link::$apply::<ShiftCleaner>($cinema)?;
        link::$apply::<TicketSession>($cinema)?;
        link::$apply::<TicketSeat>($cinema)?;
        link::$apply::<TicketPromotions>($cinema)?;
        link::$apply::<OrderTickets>($cinema)?;
        link::$apply::<OrderCustomer>($cinema)?;
        link::$apply::<OrderCashier>($cinema)?;
        link::$apply::<ReviewAuthor>($cinema)?;
        link::$apply::<ReviewSession>($cinema)?;
        qualified::$apply::<HallSeats>($cinema)?;
    }};
}

/// Rebuild every derived slot from the persisted forward slots.
pub(crate) fn restore_all(cinema: &mut Cinema) -> Result<()> {
    for_each_association!(restore, cinema);
    Ok(())
}

/// Symmetry of every association and keyed container.
pub(crate) fn check_all(cinema: &Cinema) -> std::result::Result<(), InvariantViolation> {
    for_each_association!(check, cinema);
    Ok(())
}
