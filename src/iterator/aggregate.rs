//! Aggregate cursors
//!
//! An aggregate cursor merges the leaf cursors of a type and all its
//! subtypes. The merge order is the comparator key first, then the linear
//! type order of the member, then the member's own tie-break. For BAG
//! families the key is empty, so the merge degenerates to concatenating the
//! members in type order.
//!
//! While moving in one direction every member cursor sits on its next
//! candidate in that direction. Reversing direction realigns the other
//! members around the current element, inside their existing snapshots.

use std::cmp::Ordering;

use super::cursor::LeafCursor;
use super::errors::{IteratorError, IteratorResult};
use super::FsIterator;
use crate::index::{IndexEntry, IndexKey};
use crate::store::{FsId, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Current {
    BeforeFirst,
    Member(usize),
    AfterLast,
}

/// Cursor over a type and its subtypes.
#[derive(Debug, Clone)]
pub struct AggregateCursor {
    /// Members in linear type order.
    members: Vec<LeafCursor>,
    current: Current,
    direction: Direction,
}

impl AggregateCursor {
    pub(crate) fn new(members: Vec<LeafCursor>) -> Self {
        let mut cursor = Self {
            members,
            current: Current::BeforeFirst,
            direction: Direction::Forward,
        };
        cursor.select(Direction::Forward);
        cursor
    }

    /// Number of member cursors.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn current_ranked(&self) -> Option<(&IndexEntry, u32)> {
        match self.current {
            Current::Member(i) => {
                let member = &self.members[i];
                member.current_entry().map(|entry| (entry, member.type_rank()))
            }
            _ => None,
        }
    }

    /// Refreshes every member and positions on the first element ordered
    /// after (`key`, `rank`).
    pub(crate) fn move_past(&mut self, key: &IndexKey, rank: u32) {
        for member in &mut self.members {
            member.move_past(key, rank);
        }
        self.select(Direction::Forward);
    }

    fn compare_members(&self, a: usize, b: usize) -> Ordering {
        let (ma, mb) = (&self.members[a], &self.members[b]);
        match (ma.current_entry(), mb.current_entry()) {
            (Some(ea), Some(eb)) => ea
                .key
                .cmp(&eb.key)
                .then(ma.type_rank().cmp(&mb.type_rank()))
                .then(ea.tie.cmp(&eb.tie)),
            _ => Ordering::Equal,
        }
    }

    /// Picks the least (forward) or greatest (backward) valid member.
    fn select(&mut self, direction: Direction) {
        self.direction = direction;
        let valid = (0..self.members.len()).filter(|i| self.members[*i].is_valid());
        let chosen = match direction {
            Direction::Forward => valid.min_by(|a, b| self.compare_members(*a, *b)),
            Direction::Backward => valid.max_by(|a, b| self.compare_members(*a, *b)),
        };
        self.current = match (chosen, direction) {
            (Some(i), _) => Current::Member(i),
            (None, Direction::Forward) => Current::AfterLast,
            (None, Direction::Backward) => Current::BeforeFirst,
        };
    }

    /// Positions every member other than `current` on its first element
    /// after (forward) or last element before (backward) the current one.
    fn realign(&mut self, current: usize, direction: Direction) {
        let (key, rank) = match self.members[current].current_entry() {
            Some(entry) => (entry.key.clone(), self.members[current].type_rank()),
            None => return,
        };
        for (j, member) in self.members.iter_mut().enumerate() {
            if j == current {
                continue;
            }
            let lower_rank = member.type_rank() < rank;
            match direction {
                Direction::Forward => member.seek_after(&key, lower_rank),
                Direction::Backward => member.seek_before(&key, lower_rank),
            }
        }
    }
}

impl FsIterator for AggregateCursor {
    fn is_valid(&self) -> bool {
        matches!(self.current, Current::Member(_))
    }

    fn get(&self) -> IteratorResult<FsId> {
        match self.current {
            Current::Member(i) => self.members[i].get(),
            _ => Err(IteratorError::NoSuchElement),
        }
    }

    fn move_to_first(&mut self) {
        for member in &mut self.members {
            member.move_to_first();
        }
        self.select(Direction::Forward);
    }

    fn move_to_last(&mut self) {
        for member in &mut self.members {
            member.move_to_last();
        }
        self.select(Direction::Backward);
    }

    fn move_to_next(&mut self) {
        match self.current {
            Current::AfterLast => {}
            Current::BeforeFirst => {
                for member in &mut self.members {
                    member.seek_first();
                }
                self.select(Direction::Forward);
            }
            Current::Member(i) => {
                if self.direction == Direction::Backward {
                    self.realign(i, Direction::Forward);
                }
                self.members[i].move_to_next();
                self.select(Direction::Forward);
            }
        }
    }

    fn move_to_previous(&mut self) {
        match self.current {
            Current::BeforeFirst => {}
            Current::AfterLast => {
                for member in &mut self.members {
                    member.seek_last();
                }
                self.select(Direction::Backward);
            }
            Current::Member(i) => {
                if self.direction == Direction::Forward {
                    self.realign(i, Direction::Backward);
                }
                self.members[i].move_to_previous();
                self.select(Direction::Backward);
            }
        }
    }

    fn move_to(&mut self, store: &Store, template: FsId) -> IteratorResult<()> {
        for member in &mut self.members {
            member.move_to(store, template)?;
        }
        self.select(Direction::Forward);
        if let Current::Member(i) = self.current {
            self.realign(i, Direction::Forward);
        }
        Ok(())
    }

    fn is_stale(&self) -> bool {
        self.members.iter().any(FsIterator::is_stale)
    }
}
