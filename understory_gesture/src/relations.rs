// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declared relations between recognizers.
//!
//! Three relations are kept per recognizer:
//!
//! - *wait for*: `a` does not activate while any recognizer it waits for is still undecided.
//! - *simultaneous with*: `a` and `b` may be active at the same time. Either side declaring it is enough.
//! - *blocks*: the mirror of *wait for*, declared from the blocking side.
//!
//! Relations are directional and independent: `a` waiting for `b` says nothing about `b`.
//!
//! ```
//! use understory_gesture::relations::InteractionRegistry;
//! use understory_gesture::types::RecognizerId;
//!
//! let (single, double) = (RecognizerId(1), RecognizerId(2));
//! let mut relations = InteractionRegistry::new();
//! relations.set_wait_for(single, [double]).unwrap();
//! assert!(relations.waits_for(single, double));
//! assert!(!relations.waits_for(double, single));
//!
//! relations.drop_relations(single);
//! relations.drop_relations(single);
//! assert!(!relations.waits_for(single, double));
//! ```

use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::GestureError;
use crate::types::RecognizerId;

type Tags = SmallVec<[RecognizerId; 4]>;

#[derive(Clone, Debug, Default)]
struct Relations {
    wait_for: Tags,
    simultaneous_with: Tags,
    blocks: Tags,
}

impl Relations {
    fn is_empty(&self) -> bool {
        self.wait_for.is_empty() && self.simultaneous_with.is_empty() && self.blocks.is_empty()
    }
}

/// Per-recognizer relation sets, keyed by [`RecognizerId`].
#[derive(Clone, Debug, Default)]
pub struct InteractionRegistry {
    relations: HashMap<RecognizerId, Relations>,
}

impl InteractionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of recognizers `id` waits for. Order is preserved, duplicates dropped.
    pub fn set_wait_for(
        &mut self,
        id: RecognizerId,
        others: impl IntoIterator<Item = RecognizerId>,
    ) -> Result<(), GestureError> {
        let tags = collect_tags(id, others)?;
        self.entry(id).wait_for = tags;
        self.prune(id);
        Ok(())
    }

    /// Replace the set of recognizers `id` may run simultaneously with.
    pub fn set_simultaneous(
        &mut self,
        id: RecognizerId,
        others: impl IntoIterator<Item = RecognizerId>,
    ) -> Result<(), GestureError> {
        let tags = collect_tags(id, others)?;
        self.entry(id).simultaneous_with = tags;
        self.prune(id);
        Ok(())
    }

    /// Replace the set of recognizers that must wait for `id`.
    pub fn set_blocks(
        &mut self,
        id: RecognizerId,
        others: impl IntoIterator<Item = RecognizerId>,
    ) -> Result<(), GestureError> {
        let tags = collect_tags(id, others)?;
        self.entry(id).blocks = tags;
        self.prune(id);
        Ok(())
    }

    /// Add one wait-for dependency.
    pub fn add_wait_for(
        &mut self,
        id: RecognizerId,
        other: RecognizerId,
    ) -> Result<(), GestureError> {
        check_pair(id, other)?;
        push_unique(&mut self.entry(id).wait_for, other);
        Ok(())
    }

    /// Add one simultaneity declaration.
    pub fn add_simultaneous(
        &mut self,
        id: RecognizerId,
        other: RecognizerId,
    ) -> Result<(), GestureError> {
        check_pair(id, other)?;
        push_unique(&mut self.entry(id).simultaneous_with, other);
        Ok(())
    }

    /// Whether `id` declared that it waits for `other`.
    pub fn waits_for(&self, id: RecognizerId, other: RecognizerId) -> bool {
        self.relations
            .get(&id)
            .is_some_and(|r| r.wait_for.contains(&other))
    }

    /// Whether `blocker` declared that `id` must wait for it.
    pub fn blocks(&self, blocker: RecognizerId, id: RecognizerId) -> bool {
        self.relations
            .get(&blocker)
            .is_some_and(|r| r.blocks.contains(&id))
    }

    /// Whether either side declared `a` and `b` simultaneous-compatible.
    pub fn simultaneous(&self, a: RecognizerId, b: RecognizerId) -> bool {
        let declared = |x: RecognizerId, y: RecognizerId| {
            self.relations
                .get(&x)
                .is_some_and(|r| r.simultaneous_with.contains(&y))
        };
        declared(a, b) || declared(b, a)
    }

    /// Recognizers `id` waits for, in declaration order.
    pub fn wait_for_of(&self, id: RecognizerId) -> &[RecognizerId] {
        self.relations
            .get(&id)
            .map(|r| r.wait_for.as_slice())
            .unwrap_or(&[])
    }

    /// Recognizers `id` declared simultaneous-compatible.
    pub fn simultaneous_of(&self, id: RecognizerId) -> &[RecognizerId] {
        self.relations
            .get(&id)
            .map(|r| r.simultaneous_with.as_slice())
            .unwrap_or(&[])
    }

    /// Forget every relation declared by `id`. Relations other recognizers declared
    /// towards `id` stay in place. Idempotent.
    pub fn drop_relations(&mut self, id: RecognizerId) {
        self.relations.remove(&id);
    }

    /// Number of recognizers with at least one declared relation.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Whether no relations are declared.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    fn entry(&mut self, id: RecognizerId) -> &mut Relations {
        self.relations.entry(id).or_default()
    }

    fn prune(&mut self, id: RecognizerId) {
        if self.relations.get(&id).is_some_and(Relations::is_empty) {
            self.relations.remove(&id);
        }
    }
}

/// Parse a relation list such as `"3, 4 #7"` into tags.
pub fn parse_tags(list: &str) -> Result<Vec<RecognizerId>, GestureError> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

fn check_pair(id: RecognizerId, other: RecognizerId) -> Result<(), GestureError> {
    if id == other {
        return Err(GestureError::InvalidRelation(id));
    }
    Ok(())
}

fn push_unique(tags: &mut Tags, tag: RecognizerId) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}

fn collect_tags(
    id: RecognizerId,
    others: impl IntoIterator<Item = RecognizerId>,
) -> Result<Tags, GestureError> {
    let mut tags = Tags::new();
    for other in others {
        check_pair(id, other)?;
        push_unique(&mut tags, other);
    }
    Ok(tags)
}
