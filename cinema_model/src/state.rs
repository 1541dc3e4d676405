/// Cinema Model — Context
///
/// `Cinema` owns one extent per entity type. Nothing is global: tests and
/// hosts construct as many independent cinemas as they need.

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::domain::{
    Contract, Customer, Employee, Equipment, Hall, ModelLimits, Movie, Order, Promotion, Review,
    Role, Seat, Session, Shift, Ticket,
};
use crate::error::{ModelError, Result};
use crate::extent::{Extent, Id};

/// A type with an extent in [`Cinema`].
pub trait Entity: Sized + 'static {
    /// Lowercase type tag used in messages and documents.
    const KIND: &'static str;

    fn extent(cinema: &Cinema) -> &Extent<Self>;
    fn extent_mut(cinema: &mut Cinema) -> &mut Extent<Self>;
}

/// `"employee #3"`
pub fn label<T: Entity>(id: Id<T>) -> String {
    format!("{} {}", T::KIND, id)
}

#[derive(Debug, Clone, Default)]
pub struct Cinema {
    pub(crate) limits: ModelLimits,
    pub(crate) contracts: Extent<Contract>,
    pub(crate) employees: Extent<Employee>,
    pub(crate) roles: Extent<Role>,
    pub(crate) customers: Extent<Customer>,
    pub(crate) halls: Extent<Hall>,
    pub(crate) seats: Extent<Seat>,
    pub(crate) equipment: Extent<Equipment>,
    pub(crate) movies: Extent<Movie>,
    pub(crate) sessions: Extent<Session>,
    pub(crate) shifts: Extent<Shift>,
    pub(crate) promotions: Extent<Promotion>,
    pub(crate) tickets: Extent<Ticket>,
    pub(crate) orders: Extent<Order>,
    pub(crate) reviews: Extent<Review>,
}

macro_rules! entities {
    ($($ty:ty => $field:ident, $kind:literal;)*) => {
        $(
            impl Entity for $ty {
                const KIND: &'static str = $kind;

                fn extent(cinema: &Cinema) -> &Extent<Self> {
                    &cinema.$field
                }

                fn extent_mut(cinema: &mut Cinema) -> &mut Extent<Self> {
                    &mut cinema.$field
                }
            }
        )*

        impl Cinema {
            /// `(kind, live count)` for every extent, in declaration order.
            pub fn extent_sizes(&self) -> Vec<(&'static str, usize)> {
                vec![$(($kind, self.$field.len()),)*]
            }

            /// Empty every extent. Limits are kept.
            pub fn reset(&mut self) {
                $(self.$field.clear();)*
                debug!("all extents cleared");
            }
        }
    };
}

entities! {
    Contract => contracts, "contract";
    Employee => employees, "employee";
    Role => roles, "role";
    Customer => customers, "customer";
    Hall => halls, "hall";
    Seat => seats, "seat";
    Equipment => equipment, "equipment";
    Movie => movies, "movie";
    Session => sessions, "session";
    Shift => shifts, "shift";
    Promotion => promotions, "promotion";
    Ticket => tickets, "ticket";
    Order => orders, "order";
    Review => reviews, "review";
}

impl Cinema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ModelLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> &ModelLimits {
        &self.limits
    }

    pub fn extent<T: Entity>(&self) -> &Extent<T> {
        T::extent(self)
    }

    pub fn contains<T: Entity>(&self, id: Id<T>) -> bool {
        T::extent(self).contains(id)
    }

    /// Live entity, or `None`.
    pub fn find<T: Entity>(&self, id: Id<T>) -> Option<&T> {
        T::extent(self).get(id)
    }

    /// Live entity, or a state error naming it.
    pub fn entity<T: Entity>(&self, id: Id<T>) -> Result<&T> {
        self.find(id).ok_or_else(|| ModelError::NotLive { entity: label(id) })
    }

    pub(crate) fn entity_mut<T: Entity>(&mut self, id: Id<T>) -> Option<&mut T> {
        T::extent_mut(self).get_mut(id)
    }

    /// Allocate an id and register `item` under it.
    pub(crate) fn insert<T: Entity>(&mut self, item: T) -> Id<T> {
        let extent = T::extent_mut(self);
        let id = extent.allocate();
        extent.register(id, item);
        debug!(entity = %label(id), "registered");
        id
    }

    pub(crate) fn unregister<T: Entity>(&mut self, id: Id<T>) -> bool {
        let removed = T::extent_mut(self).unregister(id).is_some();
        if removed {
            debug!(entity = %label(id), "unregistered");
        }
        removed
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    pub fn total_entities(&self) -> usize {
        self.extent_sizes().iter().map(|(_, n)| n).sum()
    }
}
