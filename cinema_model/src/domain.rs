/// Cinema Model — Core Domain Types
///
/// Pure data plus small derived calculations. Relationship slots come in
/// pairs: the forward slot is persisted, the reverse slot (`#[serde(skip)]`)
/// is rebuilt by the link protocol on load.
/// Money: i64 cents. No float.

use chrono::{Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::extent::Id;
use crate::qualified::QualifiedSlot;

// ── Limits ─────────────────────────────────────────────────────────

/// Model-wide bounds, persisted with the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelLimits {
    pub max_hall_capacity: u32,
    pub points_per_ticket: u32,
    pub max_shift_minutes: i64,
    /// Percent applied to a VIP seat's normal price.
    pub default_vip_multiplier_pct: u32,
    pub max_age_years: u32,
}

impl Default for ModelLimits {
    fn default() -> Self {
        Self {
            max_hall_capacity: 150,
            points_per_ticket: 10,
            max_shift_minutes: 240,
            default_vip_multiplier_pct: 180,
            max_age_years: 120,
        }
    }
}

// ── People ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
}

impl Person {
    /// Whole years completed on `today`.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.date_of_birth).unwrap_or(0)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContractTerms {
    FullTime {
        salary_cents: i64,
        has_benefits_plan: bool,
    },
    PartTime {
        hourly_rate_cents: i64,
        max_week_hours: u8,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contract {
    pub terms: ContractTerms,
    #[serde(skip)]
    pub employee: Option<Id<Employee>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Employee {
    pub person: Person,
    pub hiring_date: NaiveDate,
    pub phone_number: String,
    pub contract: Option<Id<Contract>>,
    pub supervisor: Option<Id<Employee>>,
    #[serde(skip)]
    pub subordinates: Vec<Id<Employee>>,
    #[serde(skip)]
    pub roles: Vec<Id<Role>>,
    #[serde(skip)]
    pub served_orders: Vec<Id<Order>>,
}

/// Discriminant of [`RoleKind`]; an employee holds at most one role of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    Cashier,
    Technician,
    Cleaner,
}

impl RoleType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cashier => "cashier",
            Self::Technician => "technician",
            Self::Cleaner => "cleaner",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoleKind {
    Cashier {
        pos_login: String,
        pos_password_hash: String,
    },
    Technician {
        degree: String,
        on_call: bool,
    },
    Cleaner {
        has_safety_training: bool,
        last_safety_training: NaiveDate,
    },
}

impl RoleKind {
    pub const fn role_type(&self) -> RoleType {
        match self {
            Self::Cashier { .. } => RoleType::Cashier,
            Self::Technician { .. } => RoleType::Technician,
            Self::Cleaner { .. } => RoleType::Cleaner,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Role {
    pub kind: RoleKind,
    pub employee: Option<Id<Employee>>,
    #[serde(skip)]
    pub sessions: Vec<Id<Session>>,
    #[serde(skip)]
    pub shifts: Vec<Id<Shift>>,
}

impl Role {
    pub const fn role_type(&self) -> RoleType {
        self.kind.role_type()
    }

    /// Cleaner safety training counts as current for six months.
    pub fn is_training_up_to_date(&self, today: NaiveDate) -> bool {
        match &self.kind {
            RoleKind::Cleaner {
                has_safety_training: true,
                last_safety_training,
            } => today
                .checked_sub_months(Months::new(6))
                .is_some_and(|cutoff| *last_safety_training > cutoff),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Customer {
    pub person: Person,
    pub email: String,
    pub password_hash: String,
    #[serde(skip)]
    pub orders: Vec<Id<Order>>,
    #[serde(skip)]
    pub reviews: Vec<Id<Review>>,
}

// ── Venue ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hall {
    pub name: String,
    pub capacity: u32,
    #[serde(skip)]
    pub seats: QualifiedSlot<u32, Seat>,
    #[serde(skip)]
    pub equipment: Vec<Id<Equipment>>,
    #[serde(skip)]
    pub sessions: Vec<Id<Session>>,
    #[serde(skip)]
    pub shifts: Vec<Id<Shift>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatType {
    Normal,
    Vip,
}

/// Where a seat sits: the hall and its number within that hall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeatPlacement {
    pub hall: Id<Hall>,
    pub number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Seat {
    pub seat_type: SeatType,
    pub normal_price_cents: i64,
    pub accessible: bool,
    pub vip_multiplier_pct: u32,
    pub placement: Option<SeatPlacement>,
    #[serde(skip)]
    pub tickets: Vec<Id<Ticket>>,
}

impl Seat {
    pub fn final_price_cents(&self) -> i64 {
        match self.seat_type {
            SeatType::Normal => self.normal_price_cents,
            SeatType::Vip => {
                self.normal_price_cents
                    .saturating_mul(i64::from(self.vip_multiplier_pct))
                    / 100
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Audio,
    Projection,
    Lighting,
    Network,
    Storage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Equipment {
    pub kind: EquipmentKind,
    pub last_check_up: NaiveDate,
    pub hall: Option<Id<Hall>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Movie {
    pub title: String,
    pub duration_minutes: u32,
    pub genres: Vec<String>,
    pub age_restriction: Option<u8>,
    #[serde(skip)]
    pub sessions: Vec<Id<Session>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Session {
    pub start_at: NaiveDateTime,
    pub language: String,
    pub hall: Option<Id<Hall>>,
    pub movie: Option<Id<Movie>>,
    pub technicians: Vec<Id<Role>>,
    pub promotions: Vec<Id<Promotion>>,
    #[serde(skip)]
    pub tickets: Vec<Id<Ticket>>,
    #[serde(skip)]
    pub reviews: Vec<Id<Review>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shift {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub cleaner: Option<Id<Role>>,
    pub hall: Option<Id<Hall>>,
}

impl Shift {
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

// ── Sales ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ticket {
    pub session: Option<Id<Session>>,
    pub seat: Option<Id<Seat>>,
    pub order: Option<Id<Order>>,
    pub promotions: Vec<Id<Promotion>>,
    pub discount_cents: i64,
    pub bonus_points_used: u32,
    pub booked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Promotion {
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub description: String,
    pub discount_cents: i64,
    #[serde(skip)]
    pub sessions: Vec<Id<Session>>,
    #[serde(skip)]
    pub tickets: Vec<Id<Ticket>>,
}

impl Promotion {
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.valid_from <= day && day <= self.valid_to
    }
}

/// Discriminator of the customer/cashier exclusive pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Online,
    BoxOffice,
}

impl OrderType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::BoxOffice => "box office",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Refunded,
}

impl OrderStatus {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Order {
    pub created_at: NaiveDateTime,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub email_for_bonus_points: Option<String>,
    pub customer: Option<Id<Customer>>,
    pub cashier: Option<Id<Employee>>,
    #[serde(skip)]
    pub tickets: Vec<Id<Ticket>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Review {
    pub rating_of_movie: u8,
    pub rating_of_hall: u8,
    pub date: NaiveDateTime,
    pub comment: String,
    pub author: Option<Id<Customer>>,
    pub session: Option<Id<Session>>,
}
