/// Cinema Model — Reflexive Hierarchies
///
/// Parent/child links within one entity type (supervision). A node has at
/// most one parent. Self-reference and cycles of any length are rejected
/// before anything is linked.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::{ModelError, Result};
use crate::extent::Id;
use crate::link::{self, Association, Change};
use crate::state::{label, Cinema, Entity};

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Parents of `start`, nearest first. Stops early if a cycle is met.
pub fn ancestors<A, E>(cinema: &Cinema, start: Id<E>) -> Vec<Id<E>>
where
    A: Association<Left = E, Right = E, Forward = Option<Id<E>>>,
    E: Entity,
{
    let mut seen: BTreeSet<Id<E>> = BTreeSet::new();
    seen.insert(start);
    let mut chain = Vec::new();
    let mut cursor = cinema.find(start).and_then(|node| *A::forward(node));
    while let Some(parent) = cursor {
        if !seen.insert(parent) {
            break;
        }
        chain.push(parent);
        cursor = cinema.find(parent).and_then(|node| *A::forward(node));
    }
    chain
}

/// Every node below `root`, breadth first.
pub fn descendants<A, E>(cinema: &Cinema, root: Id<E>) -> Vec<Id<E>>
where
    A: Association<Left = E, Right = E, Forward = Option<Id<E>>>,
    E: Entity,
{
    let mut seen: BTreeSet<Id<E>> = BTreeSet::new();
    seen.insert(root);
    let mut out = Vec::new();
    let mut queue: VecDeque<Id<E>> = link::holders::<A>(cinema, root).into();
    while let Some(node) = queue.pop_front() {
        if !seen.insert(node) {
            continue;
        }
        out.push(node);
        queue.extend(link::holders::<A>(cinema, node));
    }
    out
}

/// Nodes without a parent, in insertion order.
pub fn roots<A, E>(cinema: &Cinema) -> Vec<Id<E>>
where
    A: Association<Left = E, Right = E, Forward = Option<Id<E>>>,
    E: Entity,
{
    E::extent(cinema)
        .all()
        .filter(|(_, node)| A::forward(node).is_none())
        .map(|(id, _)| id)
        .collect()
}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

/// Make `parent` the parent of `child`, or clear it with `None`.
pub fn set_parent<A, E>(cinema: &mut Cinema, child: Id<E>, parent: Option<Id<E>>) -> Result<Change>
where
    A: Association<Left = E, Right = E, Forward = Option<Id<E>>>,
    E: Entity,
{
    cinema.entity(child)?;
    if let Some(parent) = parent {
        cinema.entity(parent)?;
        if parent == child {
            return Err(ModelError::SelfReference {
                association: A::NAME,
                entity: label(child),
            });
        }
        let above = ancestors::<A, E>(cinema, parent);
        if let Some(pos) = above.iter().position(|id| *id == child) {
            let mut path: Vec<String> = vec![label(child), label(parent)];
            path.extend(above[..=pos].iter().map(|id| label(*id)));
            return Err(ModelError::Cycle {
                association: A::NAME,
                path: path.join(" -> "),
            });
        }
    }
    link::set::<A, E>(cinema, child, parent)
}

// ---------------------------------------------------------------------------
// Cycle detection
// ---------------------------------------------------------------------------

/// Cycles in the parent links, each listed from its smallest id. Only a
/// document loaded from disk can contain one; `set_parent` refuses to
/// create them.
pub fn detect_cycles<A, E>(cinema: &Cinema) -> Vec<Vec<Id<E>>>
where
    A: Association<Left = E, Right = E, Forward = Option<Id<E>>>,
    E: Entity,
{
    const WHITE: u8 = 0;
    const GREY: u8 = 1;
    const BLACK: u8 = 2;

    let mut colour: BTreeMap<Id<E>, u8> = E::extent(cinema).ids().into_iter().map(|id| (id, WHITE)).collect();
    let mut cycles = Vec::new();

    for start in E::extent(cinema).ids() {
        if colour.get(&start).copied() != Some(WHITE) {
            continue;
        }
        // Out-degree is at most one, so the DFS stack is a simple path.
        let mut path = vec![start];
        colour.insert(start, GREY);
        let mut cursor = cinema.find(start).and_then(|node| *A::forward(node));
        while let Some(next) = cursor {
            match colour.get(&next).copied() {
                Some(WHITE) => {
                    colour.insert(next, GREY);
                    path.push(next);
                    cursor = cinema.find(next).and_then(|node| *A::forward(node));
                }
                Some(GREY) => {
                    if let Some(pos) = path.iter().position(|id| *id == next) {
                        let mut cycle = path[pos..].to_vec();
                        if let Some(min_pos) = cycle.iter().enumerate().min_by_key(|(_, id)| **id).map(|(i, _)| i) {
                            cycle.rotate_left(min_pos);
                        }
                        cycles.push(cycle);
                    }
                    break;
                }
                _ => break,
            }
        }
        for node in path {
            colour.insert(node, BLACK);
        }
    }
    cycles
}
