/// Cinema Model — Qualified Containment
///
/// A container holds members indexed by an explicit key. Keys are unique
/// per container instance and the container has a capacity bound. The
/// member side records `(container, key)`; the keyed map is the reverse
/// slot and is rebuilt on load.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::error::{ModelError, Result};
use crate::extent::Id;
use crate::invariants::InvariantViolation;
use crate::state::{label, Cinema, Entity};

// ---------------------------------------------------------------------------
// Keyed slot
// ---------------------------------------------------------------------------

pub struct QualifiedSlot<K, T> {
    entries: BTreeMap<K, Id<T>>,
}

impl<K, T> Default for QualifiedSlot<K, T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Clone, T> Clone for QualifiedSlot<K, T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K: fmt::Debug, T> fmt::Debug for QualifiedSlot<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: Ord + Copy, T> QualifiedSlot<K, T> {
    pub fn get(&self, key: K) -> Option<Id<T>> {
        self.entries.get(&key).copied()
    }

    pub fn key_of(&self, id: Id<T>) -> Option<K> {
        self.entries
            .iter()
            .find(|(_, member)| **member == id)
            .map(|(key, _)| *key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, Id<T>)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    pub fn members(&self) -> Vec<Id<T>> {
        self.entries.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn bind(&mut self, key: K, id: Id<T>) {
        self.entries.insert(key, id);
    }

    fn unbind(&mut self, key: K) -> Option<Id<T>> {
        self.entries.remove(&key)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// Association descriptor
// ---------------------------------------------------------------------------

/// Slot accessors for one keyed containment.
pub trait Qualified {
    type Container: Entity;
    type Member: Entity;
    type Key: Ord + Copy + fmt::Display;

    const NAME: &'static str;

    fn slot(container: &Self::Container) -> &QualifiedSlot<Self::Key, Self::Member>;
    fn slot_mut(container: &mut Self::Container) -> &mut QualifiedSlot<Self::Key, Self::Member>;
    fn capacity(container: &Self::Container) -> usize;
    fn placement(member: &Self::Member) -> Option<(Id<Self::Container>, Self::Key)>;
    fn set_placement(member: &mut Self::Member, placement: Option<(Id<Self::Container>, Self::Key)>);
}

fn container_label<Q: Qualified>(container: Id<Q::Container>) -> String {
    format!("{} {}", Q::NAME, label(container))
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Bind `member` under `key`. Re-putting the same member under the same
/// key is a no-op.
pub fn put<Q: Qualified>(
    cinema: &mut Cinema,
    container: Id<Q::Container>,
    key: Q::Key,
    member: Id<Q::Member>,
) -> Result<()> {
    let owner = cinema.entity(container)?;
    let part = cinema.entity(member)?;

    if let Some((current, current_key)) = Q::placement(part) {
        if current == container && current_key == key {
            return Ok(());
        }
        return Err(ModelError::AlreadyOwned {
            association: Q::NAME,
            part: label(member),
            owner: format!("{} (key {})", label(current), current_key),
        });
    }
    let slot = Q::slot(owner);
    if slot.get(key).is_some() {
        return Err(ModelError::DuplicateKey {
            container: container_label::<Q>(container),
            key: key.to_string(),
        });
    }
    let capacity = Q::capacity(owner);
    if slot.len() >= capacity {
        return Err(ModelError::CapacityExceeded {
            container: container_label::<Q>(container),
            capacity,
        });
    }

    if let Some(owner) = cinema.entity_mut(container) {
        Q::slot_mut(owner).bind(key, member);
    }
    if let Some(part) = cinema.entity_mut(member) {
        Q::set_placement(part, Some((container, key)));
    }
    debug!(association = Q::NAME, %container, %key, %member, "bound");
    Ok(())
}

/// Member bound under `key`, or `None` when the key is free or the
/// container is not live.
pub fn get<Q: Qualified>(
    cinema: &Cinema,
    container: Id<Q::Container>,
    key: Q::Key,
) -> Option<Id<Q::Member>> {
    cinema.find(container).and_then(|c| Q::slot(c).get(key))
}

/// Unbind `key`. Absent keys are a no-op returning `None`.
pub fn remove<Q: Qualified>(
    cinema: &mut Cinema,
    container: Id<Q::Container>,
    key: Q::Key,
) -> Option<Id<Q::Member>> {
    let member = cinema
        .entity_mut(container)
        .and_then(|c| Q::slot_mut(c).unbind(key))?;
    if let Some(part) = cinema.entity_mut(member) {
        Q::set_placement(part, None);
    }
    debug!(association = Q::NAME, %container, %key, %member, "unbound");
    Some(member)
}

/// Detach `member` from whatever container holds it.
pub(crate) fn release<Q: Qualified>(cinema: &mut Cinema, member: Id<Q::Member>) {
    let placement = cinema.find(member).and_then(Q::placement);
    if let Some((container, key)) = placement {
        remove::<Q>(cinema, container, key);
    }
}

/// Rebuild every container's keyed slot from member placements.
pub(crate) fn restore<Q: Qualified>(cinema: &mut Cinema) -> Result<()> {
    for container in <Q::Container as Entity>::extent(cinema).ids() {
        if let Some(c) = cinema.entity_mut(container) {
            Q::slot_mut(c).clear();
        }
    }

    let placements: Vec<(Id<Q::Member>, Id<Q::Container>, Q::Key)> = <Q::Member as Entity>::extent(cinema)
        .all()
        .filter_map(|(id, m)| Q::placement(m).map(|(c, k)| (id, c, k)))
        .collect();

    for (member, container, key) in placements {
        let Some(owner) = cinema.find(container) else {
            return Err(ModelError::Corrupt(format!(
                "{}: {} references missing {}",
                Q::NAME,
                label(member),
                label(container)
            )));
        };
        if let Some(other) = Q::slot(owner).get(key) {
            return Err(ModelError::Corrupt(format!(
                "{}: key {} of {} claimed by {} and {}",
                Q::NAME,
                key,
                label(container),
                label(other),
                label(member)
            )));
        }
        if Q::slot(owner).len() >= Q::capacity(owner) {
            return Err(ModelError::Corrupt(format!(
                "{} exceeds capacity {}",
                container_label::<Q>(container),
                Q::capacity(owner)
            )));
        }
        if let Some(owner) = cinema.entity_mut(container) {
            Q::slot_mut(owner).bind(key, member);
        }
    }
    Ok(())
}

/// Both sides of every keyed binding agree, and no container is over
/// capacity.
pub(crate) fn check<Q: Qualified>(cinema: &Cinema) -> std::result::Result<(), InvariantViolation> {
    for (container_id, container) in <Q::Container as Entity>::extent(cinema).all() {
        let slot = Q::slot(container);
        if slot.len() > Q::capacity(container) {
            return Err(InvariantViolation::new(
                "qualified_capacity",
                format!("{} holds {} members", container_label::<Q>(container_id), slot.len()),
            ));
        }
        for (key, member) in slot.iter() {
            let placement = cinema.find(member).and_then(Q::placement);
            if placement != Some((container_id, key)) {
                return Err(InvariantViolation::new(
                    "qualified_symmetry",
                    format!(
                        "{} key {} points at {} which does not point back",
                        container_label::<Q>(container_id),
                        key,
                        label(member)
                    ),
                ));
            }
        }
    }
    for (member_id, member) in <Q::Member as Entity>::extent(cinema).all() {
        if let Some((container, key)) = Q::placement(member) {
            let bound = cinema.find(container).and_then(|c| Q::slot(c).get(key));
            if bound != Some(member_id) {
                return Err(InvariantViolation::new(
                    "qualified_symmetry",
                    format!(
                        "{} claims key {} of {} without a back-reference",
                        label(member_id),
                        key,
                        label(container)
                    ),
                ));
            }
        }
    }
    Ok(())
}
