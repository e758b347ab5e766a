// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the box tree: node identifiers, flags, and local geometry.

use kurbo::{Affine, Rect, Vec2};

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// ### Liveness
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check whether a `NodeId` still refers to a live node.
/// Stale `NodeId`s never alias a different live node because the generation must match.
///
/// ### Notes
///
/// - The generation increments on slot reuse and never decreases.
/// - `u32` is ample for practical lifetimes; behavior on generation overflow is unspecified.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node flags controlling visibility, picking, and clipping.
    ///
    /// `PICKABLE` and `PICK_CHILDREN` are independent: a container that should pass
    /// pointers through to its children without being hit itself keeps only
    /// `PICK_CHILDREN`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible. Invisible nodes hide their whole subtree from hit testing.
        const VISIBLE       = 0b0000_0001;
        /// Node itself can be hit.
        const PICKABLE      = 0b0000_0010;
        /// Node's descendants can be hit.
        const PICK_CHILDREN = 0b0000_0100;
        /// Descendants are only reachable through points inside the node's bounds.
        const CLIP_CHILDREN = 0b0000_1000;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Local geometry for a node.
#[derive(Clone, Debug)]
pub struct LocalNode {
    /// Local (untransformed) bounds.
    pub local_bounds: Rect,
    /// Maps this node's local space into its parent's content space.
    pub local_transform: Affine,
    /// Scroll of this node's content; subtracted from children's positions.
    pub scroll_offset: Vec2,
    /// Z-order within the parent. Higher is on top; ties keep insertion order.
    pub z_index: i32,
    /// Visibility, picking, and clipping flags.
    pub flags: NodeFlags,
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            local_bounds: Rect::ZERO,
            local_transform: Affine::IDENTITY,
            scroll_offset: Vec2::ZERO,
            z_index: 0,
            flags: NodeFlags::default(),
        }
    }
}
