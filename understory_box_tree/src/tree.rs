// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, updates, queries.

use alloc::vec::Vec;
use kurbo::{Affine, Point, Rect, Vec2};

use crate::types::{LocalNode, NodeFlags, NodeId};

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level region tree.
pub struct Tree {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    roots: Vec<NodeId>, // paint order, like children
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("roots", &self.roots.len())
            .finish_non_exhaustive()
    }
}

/// Results of a hit test.
#[derive(Clone, Debug)]
pub struct Hit {
    /// The matched node.
    pub node: NodeId,
    /// Path from root to node (inclusive).
    pub path: Vec<NodeId>,
}

/// Filters applied during hit testing.
///
/// Used by [`Tree::hit_test_point`].
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryFilter {
    /// If true, skip subtrees whose root lacks [`NodeFlags::VISIBLE`].
    pub visible_only: bool,
    /// If true, honour [`NodeFlags::PICKABLE`] and [`NodeFlags::PICK_CHILDREN`].
    pub pickable_only: bool,
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalNode,
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    ///
    /// A stale `parent` inserts a root.
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        let parent = parent.filter(|p| self.is_alive(*p));
        self.link(id, parent);
        id
    }

    /// Remove a node (and its subtree) from the tree.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        self.unlink(id);
        let mut stack = alloc::vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes[id.idx()].take() {
                stack.extend(node.children);
                self.free_list.push(id.idx());
            }
        }
    }

    /// Reparent `id` under `new_parent` (or make it a root).
    ///
    /// Ignored if either id is stale or the move would put `id` under itself.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(p) = new_parent {
            if !self.is_alive(p) || self.is_ancestor_or_self(id, p) {
                return;
            }
        }
        self.unlink(id);
        self.link(id, new_parent);
    }

    /// Update local transform.
    pub fn set_local_transform(&mut self, id: NodeId, tf: Affine) {
        if let Some(n) = self.node_mut(id) {
            n.local.local_transform = tf;
        }
    }

    /// Update local bounds.
    pub fn set_local_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(n) = self.node_mut(id) {
            n.local.local_bounds = bounds;
        }
    }

    /// Update the content scroll offset.
    pub fn set_scroll_offset(&mut self, id: NodeId, offset: Vec2) {
        if let Some(n) = self.node_mut(id) {
            n.local.scroll_offset = offset;
        }
    }

    /// Update z index, moving the node within its siblings.
    pub fn set_z_index(&mut self, id: NodeId, z: i32) {
        let Some(n) = self.node_mut(id) else {
            return;
        };
        n.local.z_index = z;
        let parent = n.parent;
        self.unlink(id);
        self.link(id, parent);
    }

    /// Update node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_mut(id) {
            n.local.flags = flags;
        }
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    /// See [`NodeId`] docs for the generational semantics.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Parent of a live node; `None` for roots and stale ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children in paint order: z ascending, insertion order on ties.
    ///
    /// Empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Root nodes in paint order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Local data of a live node.
    pub fn local(&self, id: NodeId) -> Option<&LocalNode> {
        self.node(id).map(|n| &n.local)
    }

    /// Returns the z-index of a node if the identifier is live.
    pub fn z_index(&self, id: NodeId) -> Option<i32> {
        self.local(id).map(|l| l.z_index)
    }

    /// Transform from `id`'s local space to world space, including ancestor scroll.
    pub fn world_transform(&self, id: NodeId) -> Option<Affine> {
        let node = self.node(id)?;
        let mut tf = node.local.local_transform;
        let mut parent = node.parent;
        while let Some(p) = parent {
            let pn = self.node(p)?;
            tf = pn.local.local_transform * Affine::translate(-pn.local.scroll_offset) * tf;
            parent = pn.parent;
        }
        Some(tf)
    }

    /// World-space bounding box of a node's local bounds.
    pub fn world_bounds(&self, id: NodeId) -> Option<Rect> {
        let bounds = self.local(id)?.local_bounds;
        Some(self.world_transform(id)?.transform_rect_bbox(bounds))
    }

    /// Hit test a world-space point. Returns the topmost node.
    ///
    /// Roots and children are searched front to back. Invisible subtrees are skipped
    /// with `visible_only`; with `pickable_only`, nodes without
    /// [`NodeFlags::PICKABLE`] are never returned and descendants of nodes without
    /// [`NodeFlags::PICK_CHILDREN`] are not searched. Children of a
    /// [`NodeFlags::CLIP_CHILDREN`] node are only searched inside its bounds.
    pub fn hit_test_point(&self, pt: Point, filter: QueryFilter) -> Option<Hit> {
        self.roots.iter().rev().find_map(|&root| {
            let inverse = invert(self.node(root)?.local.local_transform)?;
            let node = self.hit_in(root, inverse * pt, filter)?;
            Some(Hit {
                node,
                path: self.path_to_root(node),
            })
        })
    }

    // --- internals ---

    fn hit_in(&self, id: NodeId, local: Point, filter: QueryFilter) -> Option<NodeId> {
        let node = self.node(id)?;
        let flags = node.local.flags;
        if filter.visible_only && !flags.contains(NodeFlags::VISIBLE) {
            return None;
        }
        let inside = node.local.local_bounds.contains(local);
        let descend = !filter.pickable_only || flags.contains(NodeFlags::PICK_CHILDREN);
        if descend && (inside || !flags.contains(NodeFlags::CLIP_CHILDREN)) {
            let content = local + node.local.scroll_offset;
            for &child in node.children.iter().rev() {
                let Some(inverse) = self.node(child).and_then(|c| invert(c.local.local_transform))
                else {
                    continue;
                };
                if let Some(hit) = self.hit_in(child, inverse * content, filter) {
                    return Some(hit);
                }
            }
        }
        let pickable = !filter.pickable_only || flags.contains(NodeFlags::PICKABLE);
        (inside && pickable).then_some(id)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())?
            .as_ref()
            .filter(|n| n.generation == id.1)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn siblings_mut(&mut self, parent: Option<NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent {
            Some(p) => self.node_mut(p).map(|n| &mut n.children),
            None => Some(&mut self.roots),
        }
    }

    /// Insert `id` among `parent`'s children after every sibling with z <= its own.
    fn link(&mut self, id: NodeId, parent: Option<NodeId>) {
        let z = self.z_index(id).unwrap_or(0);
        let siblings = match parent {
            Some(p) => self.children(p),
            None => &self.roots,
        };
        let pos = siblings.partition_point(|s| self.z_index(*s).unwrap_or(0) <= z);
        if let Some(list) = self.siblings_mut(parent) {
            list.insert(pos, id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = parent;
        }
    }

    fn unlink(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).map(|n| n.parent) else {
            return;
        };
        if let Some(list) = self.siblings_mut(parent) {
            list.retain(|c| *c != id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent(id) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn path_to_root(&self, mut id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        loop {
            out.push(id);
            match self.parent(id) {
                Some(p) => id = p,
                None => break,
            }
        }
        out.reverse();
        out
    }
}

impl Node {
    fn new(generation: u32, local: LocalNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
        }
    }
}

fn invert(affine: Affine) -> Option<Affine> {
    let det = affine.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    Some(affine.inverse())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: QueryFilter = QueryFilter {
        visible_only: true,
        pickable_only: true,
    };

    fn rect_node(x0: f64, y0: f64, x1: f64, y1: f64) -> LocalNode {
        LocalNode {
            local_bounds: Rect::new(x0, y0, x1, y1),
            ..Default::default()
        }
    }

    #[test]
    fn insert_and_hit_test() {
        let mut tree = Tree::new();
        let root = tree.insert(None, rect_node(0.0, 0.0, 200.0, 200.0));
        let _a = tree.insert(Some(root), rect_node(10.0, 10.0, 60.0, 60.0));
        let b = tree.insert(
            Some(root),
            LocalNode {
                z_index: 10,
                ..rect_node(40.0, 40.0, 120.0, 120.0)
            },
        );

        let hit = tree.hit_test_point(Point::new(50.0, 50.0), ALL).unwrap();
        assert_eq!(hit.node, b, "topmost by z should win");
        assert_eq!(hit.path, [root, b]);

        let hit = tree.hit_test_point(Point::new(150.0, 10.0), ALL).unwrap();
        assert_eq!(hit.node, root, "outside every child the parent is hit");
        assert!(tree.hit_test_point(Point::new(250.0, 10.0), ALL).is_none());
    }

    #[test]
    fn children_are_in_paint_order() {
        let mut tree = Tree::new();
        let root = tree.insert(None, rect_node(0.0, 0.0, 10.0, 10.0));
        let high = tree.insert(
            Some(root),
            LocalNode {
                z_index: 5,
                ..Default::default()
            },
        );
        let first = tree.insert(Some(root), LocalNode::default());
        let second = tree.insert(Some(root), LocalNode::default());
        assert_eq!(tree.children(root), [first, second, high], "z ascending, ties by insertion");

        tree.set_z_index(first, 9);
        assert_eq!(tree.children(root), [second, high, first]);
        assert_eq!(tree.z_index(first), Some(9));
    }

    #[test]
    fn world_transform_includes_ancestor_scroll() {
        let mut tree = Tree::new();
        let root = tree.insert(None, rect_node(0.0, 0.0, 400.0, 400.0));
        let list = tree.insert(
            Some(root),
            LocalNode {
                local_transform: Affine::translate((100.0, 0.0)),
                scroll_offset: Vec2::new(0.0, 50.0),
                ..rect_node(0.0, 0.0, 100.0, 200.0)
            },
        );
        let row = tree.insert(Some(list), rect_node(0.0, 60.0, 100.0, 100.0));

        let world = tree.world_transform(row).unwrap();
        assert_eq!(world * Point::new(0.0, 60.0), Point::new(100.0, 10.0));
        assert_eq!(
            tree.world_bounds(row),
            Some(Rect::new(100.0, 10.0, 200.0, 50.0))
        );

        let hit = tree.hit_test_point(Point::new(150.0, 20.0), ALL).unwrap();
        assert_eq!(hit.node, row, "hit test honours scroll");
        tree.set_scroll_offset(list, Vec2::ZERO);
        let hit = tree.hit_test_point(Point::new(150.0, 20.0), ALL).unwrap();
        assert_eq!(hit.node, list);
    }

    #[test]
    fn flags_shape_hit_testing() {
        let mut tree = Tree::new();
        let root = tree.insert(None, rect_node(0.0, 0.0, 100.0, 100.0));
        let panel = tree.insert(Some(root), rect_node(0.0, 0.0, 50.0, 50.0));
        let overflow = tree.insert(Some(panel), rect_node(60.0, 60.0, 90.0, 90.0));

        let hit = tree.hit_test_point(Point::new(70.0, 70.0), ALL).unwrap();
        assert_eq!(hit.node, root, "clipped child is unreachable outside its parent");
        tree.set_flags(panel, NodeFlags::default() - NodeFlags::CLIP_CHILDREN);
        let hit = tree.hit_test_point(Point::new(70.0, 70.0), ALL).unwrap();
        assert_eq!(hit.node, overflow);

        tree.set_flags(panel, NodeFlags::VISIBLE | NodeFlags::PICK_CHILDREN);
        let hit = tree.hit_test_point(Point::new(10.0, 10.0), ALL).unwrap();
        assert_eq!(hit.node, root, "pass-through container is never hit itself");

        tree.set_flags(panel, NodeFlags::VISIBLE | NodeFlags::PICKABLE);
        tree.set_flags(root, NodeFlags::default() - NodeFlags::CLIP_CHILDREN);
        let hit = tree.hit_test_point(Point::new(70.0, 70.0), ALL).unwrap();
        assert_eq!(hit.node, root, "children of a box-only node are not searched");

        tree.set_flags(root, NodeFlags::default() - NodeFlags::VISIBLE);
        assert!(tree.hit_test_point(Point::new(10.0, 10.0), ALL).is_none());
        let unfiltered = QueryFilter::default();
        assert_eq!(
            tree.hit_test_point(Point::new(10.0, 10.0), unfiltered)
                .map(|h| h.node),
            Some(panel)
        );
    }

    #[test]
    fn liveness_insert_remove_reuse() {
        let mut tree = Tree::new();
        let root = tree.insert(None, rect_node(0.0, 0.0, 1.0, 1.0));
        let a = tree.insert(Some(root), rect_node(0.0, 0.0, 1.0, 1.0));
        let a_child = tree.insert(Some(a), rect_node(0.0, 0.0, 1.0, 1.0));

        tree.remove(a);
        assert!(!tree.is_alive(a));
        assert!(!tree.is_alive(a_child), "removal takes the subtree");
        assert!(tree.children(root).is_empty());

        let b = tree.insert(Some(root), rect_node(0.0, 0.0, 1.0, 1.0));
        assert!(tree.is_alive(b));
        assert!(!tree.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
        assert_eq!(tree.z_index(a), None, "stale ids must return None");
    }

    #[test]
    fn reparent_moves_subtrees_but_refuses_cycles() {
        let mut tree = Tree::new();
        let root = tree.insert(None, rect_node(0.0, 0.0, 1.0, 1.0));
        let a = tree.insert(Some(root), LocalNode::default());
        let b = tree.insert(Some(a), LocalNode::default());

        tree.reparent(a, Some(b));
        assert_eq!(tree.parent(a), Some(root), "cycle was refused");

        tree.reparent(b, Some(root));
        assert_eq!(tree.children(root), [a, b]);
        assert!(tree.children(a).is_empty());

        tree.reparent(a, None);
        assert_eq!(tree.parent(a), None);
        assert_eq!(tree.roots(), [root, a]);
    }
}
