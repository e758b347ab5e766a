// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`TargetTree`] over Understory Box Tree.
//!
//! ## Feature
//!
//! Enable with `box_tree_adapter`.
//!
//! ## Notes
//!
//! Node flags translate to pointer modes as follows:
//!
//! | `PICKABLE` | `PICK_CHILDREN` | [`PointerMode`] |
//! |---|---|---|
//! | yes | yes | `Auto` |
//! | yes | no | `BoxOnly` |
//! | no | yes | `BoxNone` |
//! | no | no | `None` |
//!
//! `VISIBLE` and `CLIP_CHILDREN` map to [`TargetTree::is_visible`] and
//! [`TargetTree::clips_children`]. The surface root's own transform is not applied:
//! event coordinates are in the root node's local space.

use kurbo::{Affine, Rect, Vec2};
use understory_box_tree::{NodeFlags, NodeId, Tree};

use crate::target::{PointerMode, TargetTree};

/// A box-tree subtree seen as a gesture surface.
#[derive(Copy, Clone, Debug)]
pub struct BoxTreeSurface<'a> {
    tree: &'a Tree,
    root: NodeId,
}

impl<'a> BoxTreeSurface<'a> {
    /// Use the subtree under `root` as the surface.
    pub fn new(tree: &'a Tree, root: NodeId) -> Self {
        Self { tree, root }
    }

    /// The underlying tree.
    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    fn flags(&self, id: NodeId) -> NodeFlags {
        self.tree
            .local(id)
            .map_or(NodeFlags::empty(), |local| local.flags)
    }
}

impl TargetTree for BoxTreeSurface<'_> {
    type Id = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn contains(&self, id: NodeId) -> bool {
        self.tree.is_alive(id)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.tree.children(id)
    }

    fn bounds(&self, id: NodeId) -> Rect {
        self.tree.local(id).map_or(Rect::ZERO, |l| l.local_bounds)
    }

    fn scroll_offset(&self, id: NodeId) -> Vec2 {
        self.tree.local(id).map_or(Vec2::ZERO, |l| l.scroll_offset)
    }

    fn transform(&self, id: NodeId) -> Affine {
        self.tree
            .local(id)
            .map_or(Affine::IDENTITY, |l| l.local_transform)
    }

    fn pointer_mode(&self, id: NodeId) -> PointerMode {
        let flags = self.flags(id);
        match (
            flags.contains(NodeFlags::PICKABLE),
            flags.contains(NodeFlags::PICK_CHILDREN),
        ) {
            (true, true) => PointerMode::Auto,
            (true, false) => PointerMode::BoxOnly,
            (false, true) => PointerMode::BoxNone,
            (false, false) => PointerMode::None,
        }
    }

    fn is_visible(&self, id: NodeId) -> bool {
        self.flags(id).contains(NodeFlags::VISIBLE)
    }

    fn clips_children(&self, id: NodeId) -> bool {
        self.flags(id).contains(NodeFlags::CLIP_CHILDREN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gestures::TapConfig;
    use crate::input::PointerStream;
    use crate::listener::GestureEvent;
    use crate::mapper::CoordinateMapper;
    use crate::orchestrator::Orchestrator;
    use crate::recognizer::Recognizer;
    use crate::types::{PointerId, RecognizerId, State};
    use alloc::vec::Vec;
    use kurbo::Point;
    use understory_box_tree::LocalNode;

    fn scene() -> (Tree, NodeId, NodeId) {
        let mut tree = Tree::new();
        let root = tree.insert(
            None,
            LocalNode {
                local_bounds: Rect::new(0.0, 0.0, 400.0, 400.0),
                ..Default::default()
            },
        );
        let list = tree.insert(
            Some(root),
            LocalNode {
                local_bounds: Rect::new(0.0, 0.0, 200.0, 300.0),
                local_transform: Affine::translate((100.0, 50.0)),
                scroll_offset: Vec2::new(0.0, 40.0),
                ..Default::default()
            },
        );
        (tree, root, list)
    }

    #[test]
    fn flags_map_to_pointer_modes() {
        let (mut tree, root, list) = scene();
        let modes = [
            (NodeFlags::all(), PointerMode::Auto),
            (NodeFlags::VISIBLE | NodeFlags::PICKABLE, PointerMode::BoxOnly),
            (NodeFlags::VISIBLE | NodeFlags::PICK_CHILDREN, PointerMode::BoxNone),
            (NodeFlags::VISIBLE, PointerMode::None),
        ];
        for (flags, mode) in modes {
            tree.set_flags(list, flags);
            let surface = BoxTreeSurface::new(&tree, root);
            assert_eq!(surface.pointer_mode(list), mode, "flags {flags:?}");
            assert!(surface.is_visible(list));
            assert_eq!(
                surface.clips_children(list),
                flags.contains(NodeFlags::CLIP_CHILDREN)
            );
        }
    }

    #[test]
    fn mapping_matches_box_tree_world_transform() {
        let (mut tree, root, list) = scene();
        let row = tree.insert(
            Some(list),
            LocalNode {
                local_bounds: Rect::new(0.0, 0.0, 200.0, 40.0),
                local_transform: Affine::translate((0.0, 80.0)),
                ..Default::default()
            },
        );
        let surface = BoxTreeSurface::new(&tree, root);
        let mapper = CoordinateMapper::new(&surface);
        let local = Point::new(5.0, 5.0);
        let via_mapper = mapper.to_root(row, local).unwrap();
        let via_tree = tree.world_transform(row).unwrap() * local;
        assert!(
            (via_mapper - via_tree).hypot() < 1e-9,
            "{via_mapper:?} != {via_tree:?}"
        );
    }

    #[test]
    fn tap_on_scrolled_row() {
        let (mut tree, root, list) = scene();
        let row = tree.insert(
            Some(list),
            LocalNode {
                local_bounds: Rect::new(0.0, 80.0, 200.0, 120.0),
                ..Default::default()
            },
        );
        let mut orch = Orchestrator::new();
        orch.register(row, Recognizer::new(RecognizerId(1), TapConfig::default()))
            .unwrap();
        let surface = BoxTreeSurface::new(&tree, root);
        let mut log: Vec<GestureEvent> = Vec::new();
        let mut s = PointerStream::new();
        // Row content y 80..120, scrolled by 40, under a list at y 50: root y 90..130.
        orch.handle_event(&surface, &s.down(PointerId(0), Point::new(150.0, 100.0), 0), &mut log)
            .unwrap();
        assert_eq!(orch.target_of(RecognizerId(1)), Some(row));
        orch.handle_event(&surface, &s.up(PointerId(0), 30), &mut log)
            .unwrap();
        let states: Vec<State> = log
            .iter()
            .filter_map(GestureEvent::as_state_change)
            .map(|c| c.state)
            .collect();
        assert_eq!(states, [State::Began, State::Active, State::End]);
    }
}
