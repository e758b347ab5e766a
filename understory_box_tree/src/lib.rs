// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_box_tree --heading-base-level=0

//! Understory Box Tree: a Kurbo-native box tree.
//!
//! Understory Box Tree is a reusable building block for UIs, canvas and vector editors, and CAD viewers.
//!
//! - Represents a hierarchy of regions with local transforms, scroll offsets, z-order, and flags.
//! - Keeps children in paint order so consumers can walk them front to back.
//! - Provides point hit testing that honours visibility, picking, and clipping flags.
//!
//! ## Where this fits: three-tree model
//!
//! We’re standardizing on a simple separation of concerns for UI stacks.
//! - Widget tree: interaction/state.
//! - Box tree: geometry and hit testing (this crate).
//! - Render tree: display list (future crate).
//!
//! Gesture recognition sits next to the widget tree: `understory_gesture` hit-tests and
//! maps pointer coordinates through a box tree via its `box_tree_adapter` feature.
//!
//! ## Not a layout engine
//!
//! This crate does not perform layout (measurement or arrangement) or apply layout policies such as flex, grid, or stack.
//! Upstream code is expected to compute positions and sizes using whatever layout system you choose and then update this tree with the resulting boxes, transforms, scroll offsets, and z-order.
//!
//! ## API overview
//!
//! - [`Tree`]: container managing nodes.
//! - [`LocalNode`]: per-node local data (bounds, transform, scroll offset, z, flags).
//! - [`NodeFlags`]: visibility, picking, and clipping controls.
//! - [`NodeId`]: generational handle of a node.
//! - [`QueryFilter`]: whether hit testing honours the flags.
//!
//! Key operations:
//! - [`Tree::insert`] → [`NodeId`], [`Tree::remove`], [`Tree::reparent`]
//! - [`Tree::set_local_transform`] / [`Tree::set_scroll_offset`] / [`Tree::set_z_index`]
//! - [`Tree::world_transform`] and [`Tree::hit_test_point`].
//!
//! ## Minimal usage
//!
//! ```
//! use understory_box_tree::{LocalNode, QueryFilter, Tree};
//! use kurbo::{Affine, Point, Rect, Vec2};
//!
//! let mut tree = Tree::new();
//! let root = tree.insert(
//!     None,
//!     LocalNode { local_bounds: Rect::new(0.0, 0.0, 200.0, 200.0), ..Default::default() },
//! );
//! let child = tree.insert(
//!     Some(root),
//!     LocalNode { local_bounds: Rect::new(10.0, 10.0, 60.0, 60.0), ..Default::default() },
//! );
//!
//! // Move and hit-test.
//! tree.set_local_transform(child, Affine::translate(Vec2::new(10.0, 0.0)));
//! let filter = QueryFilter { visible_only: true, pickable_only: true };
//! let hit = tree.hit_test_point(Point::new(25.0, 25.0), filter).unwrap();
//! assert_eq!(hit.node, child);
//! assert_eq!(hit.path, [root, child]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod tree;
mod types;

pub use tree::{Hit, QueryFilter, Tree};
pub use types::{LocalNode, NodeFlags, NodeId};
