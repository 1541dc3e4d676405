/// Cinema Model — Link Protocol
///
/// One implementation of bidirectional linking shared by every
/// association. Each association names a forward slot on the left entity
/// and a reverse slot on the right entity; the protocol keeps the two in
/// agreement. Public operations validate first and mutate second, so an
/// error leaves both sides untouched.

use tracing::debug;

use crate::error::{ModelError, Result};
use crate::extent::Id;
use crate::invariants::InvariantViolation;
use crate::state::{label, Cinema, Entity};

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// One end of an association: a bounded or unbounded set of ids.
pub trait Slot<T>: Default {
    fn contains(&self, id: Id<T>) -> bool;
    fn len(&self) -> usize;
    /// Maximum number of members; `None` when unbounded.
    fn bound(&self) -> Option<usize>;
    fn members(&self) -> Vec<Id<T>>;
    fn put(&mut self, id: Id<T>);
    fn take(&mut self, id: Id<T>) -> bool;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_full(&self) -> bool {
        self.bound().is_some_and(|max| self.len() >= max)
    }
}

impl<T> Slot<T> for Option<Id<T>> {
    fn contains(&self, id: Id<T>) -> bool {
        *self == Some(id)
    }

    fn len(&self) -> usize {
        usize::from(self.is_some())
    }

    fn bound(&self) -> Option<usize> {
        Some(1)
    }

    fn members(&self) -> Vec<Id<T>> {
        self.iter().copied().collect()
    }

    fn put(&mut self, id: Id<T>) {
        *self = Some(id);
    }

    fn take(&mut self, id: Id<T>) -> bool {
        if *self == Some(id) {
            *self = None;
            return true;
        }
        false
    }
}

impl<T> Slot<T> for Vec<Id<T>> {
    fn contains(&self, id: Id<T>) -> bool {
        self.iter().any(|member| *member == id)
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn bound(&self) -> Option<usize> {
        None
    }

    fn members(&self) -> Vec<Id<T>> {
        self.clone()
    }

    fn put(&mut self, id: Id<T>) {
        if !Slot::contains(self, id) {
            self.push(id);
        }
    }

    fn take(&mut self, id: Id<T>) -> bool {
        let before = Vec::len(self);
        self.retain(|member| *member != id);
        Vec::len(self) != before
    }
}

// ---------------------------------------------------------------------------
// Association descriptor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// Plain link. Reassignable; required only when `LEFT_MIN` says so.
    OptionalLink,
    /// Whole/part. A part belongs to one whole and must be detached before
    /// it can be moved.
    Composition,
    /// Shared, non-owning. Reassignable.
    Aggregation,
    /// Parent/child within one entity type.
    Reflexive,
    ManyToMany,
    /// One of a pair of links selected by a discriminator on the holder.
    Exclusive,
}

impl AssociationKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::OptionalLink => "optional link",
            Self::Composition => "composition",
            Self::Aggregation => "aggregation",
            Self::Reflexive => "reflexive",
            Self::ManyToMany => "many-to-many",
            Self::Exclusive => "exclusive",
        }
    }
}

/// Static description of one bidirectional association.
///
/// The left entity holds the persisted forward slot; the right entity
/// holds the derived reverse slot.
pub trait Association {
    type Left: Entity;
    type Right: Entity;
    type Forward: Slot<Self::Right>;
    type Reverse: Slot<Self::Left>;

    const NAME: &'static str;
    const KIND: AssociationKind;
    /// Forward links a holder keeps under user-initiated unlinking.
    const LEFT_MIN: usize = 0;
    /// Reverse links a target keeps under user-initiated unlinking.
    const RIGHT_MIN: usize = 0;

    fn forward(left: &Self::Left) -> &Self::Forward;
    fn forward_mut(left: &mut Self::Left) -> &mut Self::Forward;
    fn reverse(right: &Self::Right) -> &Self::Reverse;
    fn reverse_mut(right: &mut Self::Right) -> &mut Self::Reverse;
}

/// What a link-protocol call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Unchanged,
    Linked,
    Relinked,
    Unlinked,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Forward members of `left`; empty when `left` is not live.
pub fn targets<A: Association>(cinema: &Cinema, left: Id<A::Left>) -> Vec<Id<A::Right>> {
    cinema
        .find(left)
        .map(|holder| A::forward(holder).members())
        .unwrap_or_default()
}

/// Reverse members of `right`; empty when `right` is not live.
pub fn holders<A: Association>(cinema: &Cinema, right: Id<A::Right>) -> Vec<Id<A::Left>> {
    cinema
        .find(right)
        .map(|target| A::reverse(target).members())
        .unwrap_or_default()
}

pub fn is_linked<A: Association>(cinema: &Cinema, left: Id<A::Left>, right: Id<A::Right>) -> bool {
    cinema
        .find(left)
        .is_some_and(|holder| A::forward(holder).contains(right))
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn check_not_self<A: Association>(left: Id<A::Left>, right: Id<A::Right>) -> Result<()> {
    if A::KIND == AssociationKind::Reflexive && left.raw() == right.raw() {
        return Err(ModelError::SelfReference {
            association: A::NAME,
            entity: label(left),
        });
    }
    Ok(())
}

/// `right` is live and its reverse slot has room for a new holder.
pub(crate) fn admit<A: Association>(cinema: &Cinema, right: Id<A::Right>) -> Result<()> {
    let target = cinema.entity(right)?;
    let reverse = A::reverse(target);
    if reverse.is_full() {
        let holder = reverse
            .members()
            .first()
            .map(|h| label(*h))
            .unwrap_or_default();
        return Err(ModelError::SlotOccupied {
            association: A::NAME,
            target: label(right),
            holder,
        });
    }
    Ok(())
}

fn check_right_min<A: Association>(cinema: &Cinema, right: Id<A::Right>) -> Result<()> {
    let target = cinema.entity(right)?;
    if A::RIGHT_MIN > 0 && A::reverse(target).len() <= A::RIGHT_MIN {
        return Err(ModelError::Multiplicity {
            association: A::NAME,
            holder: label(right),
            min: A::RIGHT_MIN,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public protocol
// ---------------------------------------------------------------------------

/// Replace the single forward target of `left`.
///
/// `None` unlinks. Moving a composition part to a different whole is
/// rejected; the part must be detached first.
pub fn set<A, R>(cinema: &mut Cinema, left: Id<A::Left>, target: Option<Id<R>>) -> Result<Change>
where
    A: Association<Right = R, Forward = Option<Id<R>>>,
    R: Entity,
{
    let current = *A::forward(cinema.entity(left)?);
    if current == target {
        return Ok(Change::Unchanged);
    }

    if let Some(old) = current {
        if target.is_some() && A::KIND == AssociationKind::Composition {
            return Err(ModelError::AlreadyOwned {
                association: A::NAME,
                part: label(left),
                owner: label(old),
            });
        }
        check_right_min::<A>(cinema, old)?;
    }
    match target {
        None if A::LEFT_MIN > 0 => {
            return Err(ModelError::Multiplicity {
                association: A::NAME,
                holder: label(left),
                min: A::LEFT_MIN,
            });
        }
        None => {}
        Some(new) => {
            check_not_self::<A>(left, new)?;
            admit::<A>(cinema, new)?;
        }
    }

    if let Some(old) = current {
        detach::<A>(cinema, left, old);
    }
    if let Some(new) = target {
        attach::<A>(cinema, left, new);
    }
    Ok(match (current, target) {
        (None, Some(_)) => Change::Linked,
        (Some(_), Some(_)) => Change::Relinked,
        (Some(_), None) => Change::Unlinked,
        (None, None) => Change::Unchanged,
    })
}

/// Add `right` to the forward slot of `left`. Linking an existing pair is
/// a no-op.
pub fn link<A: Association>(cinema: &mut Cinema, left: Id<A::Left>, right: Id<A::Right>) -> Result<Change> {
    let forward = A::forward(cinema.entity(left)?);
    if forward.contains(right) {
        return Ok(Change::Unchanged);
    }
    if forward.is_full() {
        let holder = forward.members().first().map(|t| label(*t)).unwrap_or_default();
        return Err(ModelError::SlotOccupied {
            association: A::NAME,
            target: label(left),
            holder,
        });
    }
    check_not_self::<A>(left, right)?;
    admit::<A>(cinema, right)?;

    attach::<A>(cinema, left, right);
    Ok(Change::Linked)
}

/// Remove the `left`/`right` pair, honouring both minimums. Unlinking a
/// pair that is not linked is a no-op.
pub fn unlink<A: Association>(cinema: &mut Cinema, left: Id<A::Left>, right: Id<A::Right>) -> Result<Change> {
    let forward = A::forward(cinema.entity(left)?);
    if !forward.contains(right) {
        return Ok(Change::Unchanged);
    }
    if forward.len() <= A::LEFT_MIN {
        return Err(ModelError::Multiplicity {
            association: A::NAME,
            holder: label(left),
            min: A::LEFT_MIN,
        });
    }
    check_right_min::<A>(cinema, right)?;

    detach::<A>(cinema, left, right);
    Ok(Change::Unlinked)
}

// ---------------------------------------------------------------------------
// Internal mutation (no checks)
// ---------------------------------------------------------------------------

pub(crate) fn attach<A: Association>(cinema: &mut Cinema, left: Id<A::Left>, right: Id<A::Right>) {
    if let Some(holder) = cinema.entity_mut(left) {
        A::forward_mut(holder).put(right);
    }
    if let Some(target) = cinema.entity_mut(right) {
        A::reverse_mut(target).put(left);
    }
    debug!(association = A::NAME, left = %label(left), right = %label(right), "linked");
}

pub(crate) fn detach<A: Association>(cinema: &mut Cinema, left: Id<A::Left>, right: Id<A::Right>) {
    if let Some(holder) = cinema.entity_mut(left) {
        A::forward_mut(holder).take(right);
    }
    if let Some(target) = cinema.entity_mut(right) {
        A::reverse_mut(target).take(left);
    }
    debug!(association = A::NAME, left = %label(left), right = %label(right), "unlinked");
}

/// Write back-references for a holder registered with its forward slot
/// already filled.
pub(crate) fn connect<A: Association>(cinema: &mut Cinema, left: Id<A::Left>) {
    for right in targets::<A>(cinema, left) {
        attach::<A>(cinema, left, right);
    }
}

/// Drop every forward link of `left`, bypassing minimums.
pub(crate) fn sever_forward<A: Association>(cinema: &mut Cinema, left: Id<A::Left>) -> Vec<Id<A::Right>> {
    let former = targets::<A>(cinema, left);
    for right in &former {
        detach::<A>(cinema, left, *right);
    }
    former
}

/// Drop every holder pointing at `right`, bypassing minimums.
pub(crate) fn sever_reverse<A: Association>(cinema: &mut Cinema, right: Id<A::Right>) -> Vec<Id<A::Left>> {
    let former = holders::<A>(cinema, right);
    for left in &former {
        detach::<A>(cinema, *left, right);
    }
    former
}

// ---------------------------------------------------------------------------
// Load support
// ---------------------------------------------------------------------------

/// Rebuild every reverse slot of `A` from the forward slots.
pub(crate) fn restore<A: Association>(cinema: &mut Cinema) -> Result<()> {
    for right in <A::Right as Entity>::extent(cinema).ids() {
        if let Some(target) = cinema.entity_mut(right) {
            *A::reverse_mut(target) = A::Reverse::default();
        }
    }

    let pairs: Vec<(Id<A::Left>, Id<A::Right>)> = <A::Left as Entity>::extent(cinema)
        .all()
        .flat_map(|(left, holder)| A::forward(holder).members().into_iter().map(move |r| (left, r)))
        .collect();

    for (left, right) in pairs {
        let Some(target) = cinema.find(right) else {
            return Err(ModelError::Corrupt(format!(
                "{}: {} references missing {}",
                A::NAME,
                label(left),
                label(right)
            )));
        };
        let reverse = A::reverse(target);
        if reverse.contains(left) {
            return Err(ModelError::Corrupt(format!(
                "{}: {} lists {} twice",
                A::NAME,
                label(left),
                label(right)
            )));
        }
        if reverse.is_full() {
            return Err(ModelError::Corrupt(format!(
                "{}: {} is claimed by more than one holder",
                A::NAME,
                label(right)
            )));
        }
        if A::KIND == AssociationKind::Reflexive && left.raw() == right.raw() {
            return Err(ModelError::Corrupt(format!("{}: {} references itself", A::NAME, label(left))));
        }
        if let Some(target) = cinema.entity_mut(right) {
            A::reverse_mut(target).put(left);
        }
    }
    Ok(())
}

/// Forward and reverse slots mirror each other, and every composition
/// part that must be owned is owned.
pub(crate) fn check<A: Association>(cinema: &Cinema) -> std::result::Result<(), InvariantViolation> {
    for (left, holder) in <A::Left as Entity>::extent(cinema).all() {
        let forward = A::forward(holder);
        if A::KIND == AssociationKind::Composition && forward.len() < A::LEFT_MIN {
            return Err(InvariantViolation::new(
                "part_owned",
                format!("{}: {} has no owner", A::NAME, label(left)),
            ));
        }
        for right in forward.members() {
            let mirrored = cinema
                .find(right)
                .is_some_and(|target| A::reverse(target).contains(left));
            if !mirrored {
                return Err(InvariantViolation::new(
                    "link_symmetry",
                    format!("{}: {} -> {} has no back-reference", A::NAME, label(left), label(right)),
                ));
            }
        }
    }
    for (right, target) in <A::Right as Entity>::extent(cinema).all() {
        for left in A::reverse(target).members() {
            let mirrored = cinema
                .find(left)
                .is_some_and(|holder| A::forward(holder).contains(right));
            if !mirrored {
                return Err(InvariantViolation::new(
                    "link_symmetry",
                    format!("{}: {} <- {} has no forward reference", A::NAME, label(right), label(left)),
                ));
            }
        }
    }
    Ok(())
}
