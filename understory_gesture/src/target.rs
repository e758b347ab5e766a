// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The target tree the orchestrator hit-tests and maps coordinates through.
//!
//! The crate does not own a scene. Implement [`TargetTree`] over whatever holds
//! your targets; [`adapters::box_tree`](crate::adapters) provides one for
//! Understory Box Tree.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Affine, Rect, Vec2};

/// Which part of a subtree may become a hit candidate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointerMode {
    /// The target and its descendants.
    #[default]
    Auto,
    /// The target only; descendants are not visited.
    BoxOnly,
    /// Descendants only; the target itself is never a candidate.
    BoxNone,
    /// Nothing in the subtree.
    None,
}

/// Read access to a tree of hit-testable targets.
///
/// Coordinates: each target has a local space in which [`bounds`](Self::bounds) is
/// expressed. A child's [`transform`](Self::transform) maps child-local points into the
/// parent's content space, and the parent's [`scroll_offset`](Self::scroll_offset) is
/// subtracted to reach the parent's local space. Going down the tree the order is reversed:
/// add the parent's scroll offset, then apply the inverse of the child's transform.
pub trait TargetTree {
    /// Target identifier.
    type Id: Copy + Eq + Hash + Debug;

    /// The target hit-testing starts from; its local space is the root space of events.
    fn root(&self) -> Self::Id;

    /// Whether `id` refers to a live target.
    fn contains(&self, id: Self::Id) -> bool;

    /// Parent of `id`, `None` for the root or a detached target.
    fn parent(&self, id: Self::Id) -> Option<Self::Id>;

    /// Children of `id` in paint order, back to front.
    fn children(&self, id: Self::Id) -> &[Self::Id];

    /// Bounds in the target's local space.
    fn bounds(&self, id: Self::Id) -> Rect;

    /// Content scroll applied to the target's children.
    fn scroll_offset(&self, _id: Self::Id) -> Vec2 {
        Vec2::ZERO
    }

    /// Child-local to parent-content transform.
    fn transform(&self, _id: Self::Id) -> Affine {
        Affine::IDENTITY
    }

    /// Pointer acceptance of the subtree rooted at `id`.
    fn pointer_mode(&self, _id: Self::Id) -> PointerMode {
        PointerMode::Auto
    }

    /// Invisible targets and their subtrees are skipped by hit testing.
    fn is_visible(&self, _id: Self::Id) -> bool {
        true
    }

    /// When set, descendants are only visited for points inside the target's bounds.
    fn clips_children(&self, _id: Self::Id) -> bool {
        true
    }
}
