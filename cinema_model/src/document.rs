/// Cinema Model — Persisted Document
///
/// The whole graph as one serializable value. Every entity is written once,
/// under its id; references are ids. Reverse slots are skipped and rebuilt
/// on restore, so shared and cyclic references come back with the same
/// shape.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::associations;
use crate::domain::{
    Contract, Customer, Employee, Equipment, Hall, ModelLimits, Movie, Order, Promotion, Review,
    Role, Seat, Session, Shift, Ticket,
};
use crate::error::{ModelError, Result};
use crate::extent::Id;
use crate::invariants::check_invariants;
use crate::state::{label, Cinema, Entity};
use crate::DOCUMENT_VERSION;

/// One entity with its id.
///
/// Written flat. Read by splitting `id` off and handing the remaining keys
/// to the entity, which rejects any it does not know.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<T> {
    pub id: Id<T>,
    #[serde(flatten)]
    pub entity: T,
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Record<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut fields = Map::deserialize(deserializer)?;
        let id = fields.remove("id").ok_or_else(|| de::Error::missing_field("id"))?;
        let id = Id::deserialize(id).map_err(de::Error::custom)?;
        let entity = T::deserialize(Value::Object(fields)).map_err(de::Error::custom)?;
        Ok(Self { id, entity })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    pub version: u32,
    pub limits: ModelLimits,
    pub contracts: Vec<Record<Contract>>,
    pub employees: Vec<Record<Employee>>,
    pub roles: Vec<Record<Role>>,
    pub customers: Vec<Record<Customer>>,
    pub halls: Vec<Record<Hall>>,
    pub seats: Vec<Record<Seat>>,
    pub equipment: Vec<Record<Equipment>>,
    pub movies: Vec<Record<Movie>>,
    pub sessions: Vec<Record<Session>>,
    pub shifts: Vec<Record<Shift>>,
    pub promotions: Vec<Record<Promotion>>,
    pub tickets: Vec<Record<Ticket>>,
    pub orders: Vec<Record<Order>>,
    pub reviews: Vec<Record<Review>>,
}

fn records<T: Entity + Clone>(cinema: &Cinema) -> Vec<Record<T>> {
    T::extent(cinema)
        .all()
        .map(|(id, entity)| Record {
            id,
            entity: entity.clone(),
        })
        .collect()
}

fn register_all<T: Entity>(cinema: &mut Cinema, records: Vec<Record<T>>) -> Result<()> {
    for record in records {
        if !T::extent_mut(cinema).register(record.id, record.entity) {
            return Err(ModelError::Corrupt(format!("duplicate id for {}", label(record.id))));
        }
    }
    Ok(())
}

impl Document {
    /// Snapshot of every extent in insertion order.
    pub fn capture(cinema: &Cinema) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            limits: cinema.limits.clone(),
            contracts: records(cinema),
            employees: records(cinema),
            roles: records(cinema),
            customers: records(cinema),
            halls: records(cinema),
            seats: records(cinema),
            equipment: records(cinema),
            movies: records(cinema),
            sessions: records(cinema),
            shifts: records(cinema),
            promotions: records(cinema),
            tickets: records(cinema),
            orders: records(cinema),
            reviews: records(cinema),
        }
    }

    /// Build a fresh graph: register every record, relink every
    /// association, then check all invariants.
    pub fn restore(self) -> Result<Cinema> {
        if self.version != DOCUMENT_VERSION {
            return Err(ModelError::Corrupt(format!(
                "document version {} (expected {})",
                self.version, DOCUMENT_VERSION
            )));
        }
        let mut cinema = Cinema::with_limits(self.limits);
        register_all(&mut cinema, self.contracts)?;
        register_all(&mut cinema, self.employees)?;
        register_all(&mut cinema, self.roles)?;
        register_all(&mut cinema, self.customers)?;
        register_all(&mut cinema, self.halls)?;
        register_all(&mut cinema, self.seats)?;
        register_all(&mut cinema, self.equipment)?;
        register_all(&mut cinema, self.movies)?;
        register_all(&mut cinema, self.sessions)?;
        register_all(&mut cinema, self.shifts)?;
        register_all(&mut cinema, self.promotions)?;
        register_all(&mut cinema, self.tickets)?;
        register_all(&mut cinema, self.orders)?;
        register_all(&mut cinema, self.reviews)?;

        associations::restore_all(&mut cinema)?;
        check_invariants(&cinema)?;
        Ok(cinema)
    }

    pub fn record_count(&self) -> usize {
        self.contracts.len()
            + self.employees.len()
            + self.roles.len()
            + self.customers.len()
            + self.halls.len()
            + self.seats.len()
            + self.equipment.len()
            + self.movies.len()
            + self.sessions.len()
            + self.shifts.len()
            + self.promotions.len()
            + self.tickets.len()
            + self.orders.len()
            + self.reviews.len()
    }
}

impl Cinema {
    pub fn to_document(&self) -> Document {
        Document::capture(self)
    }

    /// Replace the whole graph with the one described by `document`. On
    /// error the current graph is left untouched.
    pub fn load_document(&mut self, document: Document) -> Result<()> {
        let restored = document.restore()?;
        *self = restored;
        info!(entities = self.total_entities(), "document loaded");
        Ok(())
    }
}
