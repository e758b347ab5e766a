// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-crate fixtures for unit tests.

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Vec2};
use smallvec::SmallVec;

use crate::context::GestureContext;
use crate::gestures::GestureStrategy;
use crate::input::{GestureInput, GesturePointer, PointerAction};
use crate::recognizer::RecognizerFlags;
use crate::target::{PointerMode, TargetTree};
use crate::types::{GestureData, PointerId, State, Transition};

#[derive(Clone, Debug)]
pub(crate) struct NodeSpec {
    bounds: Rect,
    transform: Affine,
    scroll: Vec2,
    mode: PointerMode,
    visible: bool,
    clips: bool,
}

pub(crate) fn node(bounds: Rect) -> NodeSpec {
    NodeSpec {
        bounds,
        transform: Affine::IDENTITY,
        scroll: Vec2::ZERO,
        mode: PointerMode::Auto,
        visible: true,
        clips: true,
    }
}

impl NodeSpec {
    pub(crate) fn transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    pub(crate) fn scroll(mut self, scroll: Vec2) -> Self {
        self.scroll = scroll;
        self
    }

    pub(crate) fn mode(mut self, mode: PointerMode) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[derive(Clone, Debug)]
struct TestNode {
    spec: NodeSpec,
    parent: Option<u32>,
    children: Vec<u32>,
    alive: bool,
}

/// Flat arena tree; ids are indices, the root is 0.
#[derive(Clone, Debug)]
pub(crate) struct TestTree {
    nodes: Vec<TestNode>,
}

impl TestTree {
    pub(crate) fn new(root_bounds: Rect) -> Self {
        Self {
            nodes: alloc::vec![TestNode {
                spec: node(root_bounds),
                parent: None,
                children: Vec::new(),
                alive: true,
            }],
        }
    }

    pub(crate) fn root_id(&self) -> u32 {
        0
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Test trees stay far below u32::MAX nodes."
    )]
    pub(crate) fn add(&mut self, parent: u32, spec: NodeSpec) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(TestNode {
            spec,
            parent: Some(parent),
            children: Vec::new(),
            alive: true,
        });
        self.nodes[parent as usize].children.push(id);
        id
    }

    pub(crate) fn set_scroll(&mut self, id: u32, scroll: Vec2) {
        self.nodes[id as usize].spec.scroll = scroll;
    }

    /// Unlink `id` from its parent while keeping it alive.
    pub(crate) fn detach(&mut self, id: u32) {
        if let Some(p) = self.nodes[id as usize].parent.take() {
            self.nodes[p as usize].children.retain(|c| *c != id);
        }
    }

    pub(crate) fn remove(&mut self, id: u32) {
        self.detach(id);
        self.nodes[id as usize].alive = false;
    }
}

impl TargetTree for TestTree {
    type Id = u32;

    fn root(&self) -> u32 {
        0
    }

    fn contains(&self, id: u32) -> bool {
        self.nodes.get(id as usize).is_some_and(|n| n.alive)
    }

    fn parent(&self, id: u32) -> Option<u32> {
        self.nodes.get(id as usize).and_then(|n| n.parent)
    }

    fn children(&self, id: u32) -> &[u32] {
        self.nodes
            .get(id as usize)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    fn bounds(&self, id: u32) -> Rect {
        self.nodes[id as usize].spec.bounds
    }

    fn scroll_offset(&self, id: u32) -> Vec2 {
        self.nodes[id as usize].spec.scroll
    }

    fn transform(&self, id: u32) -> Affine {
        self.nodes[id as usize].spec.transform
    }

    fn pointer_mode(&self, id: u32) -> PointerMode {
        self.nodes[id as usize].spec.mode
    }

    fn is_visible(&self, id: u32) -> bool {
        self.nodes[id as usize].spec.visible
    }

    fn clips_children(&self, id: u32) -> bool {
        self.nodes[id as usize].spec.clips
    }
}

/// Context that applies the state graph without any arbitration.
#[derive(Debug)]
pub(crate) struct MockContext {
    pub(crate) state: State,
    pub(crate) now: u64,
    pub(crate) timer: Option<u64>,
    pub(crate) data: GestureData,
    pub(crate) flags: RecognizerFlags,
    pub(crate) edge_slop: f64,
    pub(crate) history: Vec<State>,
}

impl MockContext {
    pub(crate) fn new() -> Self {
        Self {
            state: State::Undetermined,
            now: 0,
            timer: None,
            data: GestureData::None,
            flags: RecognizerFlags::ENABLED,
            edge_slop: 0.0,
            history: Vec::new(),
        }
    }

    /// Deliver `input` at its own timestamp.
    pub(crate) fn feed(&mut self, gesture: &mut dyn GestureStrategy, input: &GestureInput) {
        self.now = input.time;
        gesture.on_event(self, input);
    }

    /// Advance the clock, firing the pending timer if it is due.
    pub(crate) fn advance(&mut self, gesture: &mut dyn GestureStrategy, now: u64) {
        if self.due(now) {
            gesture.on_timer(self);
        }
    }

    /// Fire the pending timer if it is due at `now`.
    pub(crate) fn due(&mut self, now: u64) -> bool {
        self.now = now;
        match self.timer {
            Some(at) if at <= now => {
                self.timer = None;
                true
            }
            _ => false,
        }
    }
}

impl GestureContext for MockContext {
    fn state(&self) -> State {
        self.state
    }

    fn now(&self) -> u64 {
        self.now
    }

    fn flags(&self) -> RecognizerFlags {
        self.flags
    }

    fn edge_slop(&self) -> f64 {
        self.edge_slop
    }

    fn transition(&mut self, transition: Transition) {
        if transition.applies_to(self.state) {
            self.state = transition.target();
            self.timer = None;
            self.history.push(self.state);
        }
    }

    fn schedule_timer(&mut self, delay_ms: u64) {
        self.timer = Some(self.now + delay_ms);
    }

    fn cancel_timer(&mut self) {
        self.timer = None;
    }

    fn timer_pending(&self) -> bool {
        self.timer.is_some()
    }

    fn set_data(&mut self, data: GestureData) {
        self.data = data;
    }
}

/// Builds a [`GestureInput`] whose local and absolute positions coincide.
pub(crate) fn input(
    action: PointerAction,
    pointer: u32,
    pointers: &[(u32, f64, f64)],
    time: u64,
) -> GestureInput {
    let pointers: SmallVec<[GesturePointer; 4]> = pointers
        .iter()
        .map(|&(id, x, y)| GesturePointer {
            id: PointerId(id),
            position: Point::new(x, y),
            absolute: Point::new(x, y),
        })
        .collect();
    GestureInput {
        action,
        pointer: PointerId(pointer),
        pointers,
        time,
        viewport: Rect::new(0.0, 0.0, 1000.0, 1000.0),
    }
}
