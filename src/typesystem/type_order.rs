//! Linear type order
//!
//! A total order over all types, used as the tie-break when merging the
//! per-type members of an aggregate index. The default order is a
//! depth-first walk of the hierarchy (children in declaration order), either
//! pre-order (supertypes first) or post-order (subtypes first). Type priority
//! lists add "a before b" constraints on top of it; the final order is the
//! topological sort of those constraints that stays closest to the default.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use super::errors::{TypeSystemError, TypeSystemResult};
use super::types::TypeId;

/// Placement of a supertype relative to its subtypes in the default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeOrderPolicy {
    /// Pre-order: every type precedes its subtypes.
    #[default]
    SupertypesFirst,
    /// Post-order: every type follows its subtypes.
    SubtypesFirst,
}

/// A committed total order over the types of one type system.
#[derive(Debug, Clone)]
pub struct LinearTypeOrder {
    order: Vec<TypeId>,
    rank: Vec<u32>,
}

impl LinearTypeOrder {
    pub(crate) fn build(
        top: TypeId,
        children: &[Vec<TypeId>],
        policy: TypeOrderPolicy,
        priorities: &[Vec<TypeId>],
    ) -> TypeSystemResult<Self> {
        let default_order = match policy {
            TypeOrderPolicy::SupertypesFirst => pre_order(top, children),
            TypeOrderPolicy::SubtypesFirst => post_order(top, children),
        };
        if default_order.len() != children.len() {
            return Err(TypeSystemError::Inconsistent(
                "type hierarchy is not a single rooted tree".to_string(),
            ));
        }

        let order = if priorities.iter().all(|list| list.len() < 2) {
            default_order
        } else {
            constrained_order(&default_order, priorities)?
        };

        let mut rank = vec![0u32; order.len()];
        for (position, t) in order.iter().enumerate() {
            rank[t.index()] = position as u32;
        }
        Ok(Self { order, rank })
    }

    /// Position of `t` in the order.
    #[inline]
    pub fn rank(&self, t: TypeId) -> u32 {
        self.rank[t.index()]
    }

    /// All types, first to last.
    pub fn order(&self) -> &[TypeId] {
        &self.order
    }

    /// True if `a` strictly precedes `b`.
    pub fn less_than(&self, a: TypeId, b: TypeId) -> bool {
        self.rank(a) < self.rank(b)
    }
}

fn pre_order(top: TypeId, children: &[Vec<TypeId>]) -> Vec<TypeId> {
    let mut out = Vec::with_capacity(children.len());
    let mut stack = vec![top];
    while let Some(t) = stack.pop() {
        out.push(t);
        stack.extend(children[t.index()].iter().rev());
    }
    out
}

fn post_order(top: TypeId, children: &[Vec<TypeId>]) -> Vec<TypeId> {
    let mut out = Vec::with_capacity(children.len());
    let mut stack = vec![(top, false)];
    while let Some((t, expanded)) = stack.pop() {
        if expanded {
            out.push(t);
            continue;
        }
        stack.push((t, true));
        for child in children[t.index()].iter().rev() {
            stack.push((*child, false));
        }
    }
    out
}

/// Kahn's algorithm; among the ready types the one earliest in the default
/// order goes next.
fn constrained_order(default_order: &[TypeId], priorities: &[Vec<TypeId>]) -> TypeSystemResult<Vec<TypeId>> {
    let n = default_order.len();
    let mut default_rank = vec![0u32; n];
    for (position, t) in default_order.iter().enumerate() {
        default_rank[t.index()] = position as u32;
    }

    let mut successors: Vec<Vec<TypeId>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    for list in priorities {
        for pair in list.windows(2) {
            let (before, after) = (pair[0], pair[1]);
            if before == after || successors[before.index()].contains(&after) {
                continue;
            }
            successors[before.index()].push(after);
            in_degree[after.index()] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<(u32, TypeId)>> = default_order
        .iter()
        .filter(|t| in_degree[t.index()] == 0)
        .map(|t| Reverse((default_rank[t.index()], *t)))
        .collect();

    let mut out = Vec::with_capacity(n);
    while let Some(Reverse((_, t))) = ready.pop() {
        out.push(t);
        for next in &successors[t.index()] {
            in_degree[next.index()] -= 1;
            if in_degree[next.index()] == 0 {
                ready.push(Reverse((default_rank[next.index()], *next)));
            }
        }
    }

    if out.len() != n {
        return Err(TypeSystemError::Inconsistent(
            "type priority lists contain a cycle".to_string(),
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0 -> {1, 2}, 1 -> {3}
    fn sample_children() -> Vec<Vec<TypeId>> {
        vec![
            vec![TypeId::new(1), TypeId::new(2)],
            vec![TypeId::new(3)],
            vec![],
            vec![],
        ]
    }

    fn ids(order: &LinearTypeOrder) -> Vec<usize> {
        order.order().iter().map(|t| t.index()).collect()
    }

    #[test]
    fn test_supertypes_first() {
        let order = LinearTypeOrder::build(
            TypeId::new(0),
            &sample_children(),
            TypeOrderPolicy::SupertypesFirst,
            &[],
        )
        .unwrap();
        assert_eq!(ids(&order), vec![0, 1, 3, 2]);
        assert!(order.less_than(TypeId::new(1), TypeId::new(3)));
    }

    #[test]
    fn test_subtypes_first() {
        let order = LinearTypeOrder::build(
            TypeId::new(0),
            &sample_children(),
            TypeOrderPolicy::SubtypesFirst,
            &[],
        )
        .unwrap();
        assert_eq!(ids(&order), vec![3, 1, 2, 0]);
        assert_eq!(order.rank(TypeId::new(0)), 3);
    }

    #[test]
    fn test_priorities_override_default() {
        let order = LinearTypeOrder::build(
            TypeId::new(0),
            &sample_children(),
            TypeOrderPolicy::SupertypesFirst,
            &[vec![TypeId::new(2), TypeId::new(1)]],
        )
        .unwrap();
        assert!(order.less_than(TypeId::new(2), TypeId::new(1)));
        assert_eq!(order.order().len(), 4);
    }

    #[test]
    fn test_priority_cycle_rejected() {
        let result = LinearTypeOrder::build(
            TypeId::new(0),
            &sample_children(),
            TypeOrderPolicy::SupertypesFirst,
            &[
                vec![TypeId::new(2), TypeId::new(1)],
                vec![TypeId::new(1), TypeId::new(2)],
            ],
        );
        assert!(matches!(result, Err(TypeSystemError::Inconsistent(_))));
    }
}
