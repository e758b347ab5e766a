// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The arbitration engine.
//!
//! ## Overview
//!
//! An [`Orchestrator`] owns every registered recognizer and drives one pointer stream
//! at a time through them:
//!
//! 1. On `Down`/`PointerDown` it hit-tests the [`TargetTree`] from the root, honouring
//!    [`PointerMode`], visibility, and clipping, and attaches the recognizers of every
//!    accepted target to the stream.
//! 2. Each event is mapped into each recognizer's target-local space and delivered in a
//!    stable order: active recognizers by activation order, then awaiting ones, then
//!    the rest in attach order.
//! 3. Every effective state change runs arbitration synchronously: activations wait
//!    for declared blockers, winners cancel competitors that share a pointer, and a
//!    blocker's outcome promotes or cancels the recognizers waiting on it.
//! 4. Finished recognizers are reset and detached once no arbitration is in progress.
//!
//! ## Timers
//!
//! Strategies arm at most one timer each. Due timers fire before every event, or when
//! the host calls [`Orchestrator::advance`]; [`Orchestrator::next_deadline`] tells the
//! host when that should next happen.
//!
//! ## Errors
//!
//! Recognition outcomes are states, never errors. [`Orchestrator::handle_event`] fails
//! only when the stream exceeds [`OrchestratorConfig::max_attached`] or an attached
//! target can no longer be mapped; the recognizer of an unmappable target is cancelled
//! and the remaining recognizers still receive the event.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::{Point, Rect};
use smallvec::SmallVec;

use crate::context::GestureContext;
use crate::error::GestureError;
use crate::gestures::{Gesture, GestureStrategy};
use crate::input::{PointerAction, PointerEvent};
use crate::listener::{GestureListener, GestureUpdate, StateChange};
use crate::mapper::{CoordinateMapper, child_from_parent};
use crate::recognizer::{Recognizer, RecognizerCore, RecognizerFlags};
use crate::relations::InteractionRegistry;
use crate::target::{PointerMode, TargetTree};
use crate::timer::TimerQueue;
use crate::types::{GestureData, PointerId, RecognizerId, State, Transition};

type Batch = SmallVec<[usize; 8]>;

/// Orchestrator-wide settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrchestratorConfig {
    /// Ceiling on recognizers attached to one stream. Exceeding it is an error.
    pub max_attached: usize,
    /// Margin along the viewport edge within which two-pointer detectors treat a
    /// pointer as unreliable.
    pub edge_slop: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_attached: 20,
            edge_slop: 12.0,
        }
    }
}

#[derive(Debug)]
struct Slot<K> {
    core: RecognizerCore<K>,
    /// Taken out while the strategy runs.
    gesture: Option<Gesture>,
    live: bool,
}

/// Recognizer registry and arbitration state for one surface.
///
/// ## Usage
///
/// - [`register`](Self::register) recognizers against the targets they belong to.
/// - Feed raw root-space events to [`handle_event`](Self::handle_event) together
///   with the current target tree.
/// - Call [`advance`](Self::advance) when the clock passes
///   [`next_deadline`](Self::next_deadline) without an event arriving.
/// - Observe outcomes through the [`GestureListener`] passed to each call.
pub struct Orchestrator<K> {
    config: OrchestratorConfig,
    slots: Vec<Slot<K>>,
    free_list: Vec<usize>,
    ids: HashMap<RecognizerId, usize>,
    by_target: HashMap<K, SmallVec<[usize; 2]>>,
    registry: InteractionRegistry,
    timers: TimerQueue,
    attached: Vec<usize>,
    awaiting: Vec<usize>,
    scratch: Vec<usize>,
    next_activation: u64,
    depth: u32,
    dispatching: bool,
    cleanup_scheduled: bool,
    now: u64,
    viewport: Rect,
}

impl<K: Debug> Debug for Orchestrator<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("registered", &self.ids.len())
            .field("attached", &self.attached.len())
            .field("awaiting", &self.awaiting.len())
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq + Hash + Debug> Default for Orchestrator<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash + Debug> Orchestrator<K> {
    /// Create an orchestrator with the default configuration.
    pub fn new() -> Self {
        Self::with_config(OrchestratorConfig::default())
    }

    /// Create an orchestrator with an explicit configuration.
    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            free_list: Vec::new(),
            ids: HashMap::new(),
            by_target: HashMap::new(),
            registry: InteractionRegistry::new(),
            timers: TimerQueue::default(),
            attached: Vec::new(),
            awaiting: Vec::new(),
            scratch: Vec::new(),
            next_activation: 0,
            depth: 0,
            dispatching: false,
            cleanup_scheduled: false,
            now: 0,
            viewport: Rect::ZERO,
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Declared relations.
    pub fn relations(&self) -> &InteractionRegistry {
        &self.registry
    }

    /// Declared relations, for changes after registration.
    pub fn relations_mut(&mut self) -> &mut InteractionRegistry {
        &mut self.registry
    }

    /// Register `recognizer` for `target`.
    ///
    /// Relations declared on the recognizer replace the registry's corresponding
    /// sets for it; empty lists leave the registry untouched.
    pub fn register(&mut self, target: K, recognizer: Recognizer) -> Result<(), GestureError> {
        let id = recognizer.id;
        if self.ids.contains_key(&id) {
            log::warn!("recognizer {id} registered twice");
            return Err(GestureError::DuplicateRecognizer(id));
        }
        let lists = [
            &recognizer.wait_for,
            &recognizer.simultaneous_with,
            &recognizer.blocks,
        ];
        if lists.iter().any(|l| l.contains(&id)) {
            return Err(GestureError::InvalidRelation(id));
        }
        if !recognizer.wait_for.is_empty() {
            self.registry
                .set_wait_for(id, recognizer.wait_for.iter().copied())?;
        }
        if !recognizer.simultaneous_with.is_empty() {
            self.registry
                .set_simultaneous(id, recognizer.simultaneous_with.iter().copied())?;
        }
        if !recognizer.blocks.is_empty() {
            self.registry
                .set_blocks(id, recognizer.blocks.iter().copied())?;
        }

        let core = RecognizerCore::new(&recognizer, target);
        let slot = Slot {
            core,
            gesture: Some(recognizer.gesture),
            live: true,
        };
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = slot;
            idx
        } else {
            self.slots.push(slot);
            self.slots.len() - 1
        };
        self.ids.insert(id, idx);
        self.by_target.entry(target).or_default().push(idx);
        log::debug!(
            "registered {} recognizer {id} on {target:?}",
            self.slots[idx].core.kind
        );
        Ok(())
    }

    /// Remove a recognizer, cancelling it first if it is attached to the stream.
    pub fn unregister(
        &mut self,
        id: RecognizerId,
        listener: &mut dyn GestureListener,
    ) -> Result<(), GestureError> {
        let idx = *self
            .ids
            .get(&id)
            .ok_or(GestureError::UnknownRecognizer(id))?;
        if self.attached.contains(&idx) {
            self.cancel(idx, listener);
            self.attached.retain(|i| *i != idx);
            self.awaiting.retain(|i| *i != idx);
        }
        self.timers.cancel(idx);
        self.ids.remove(&id);
        let owner = self.slots[idx].core.owner;
        if let Some(list) = self.by_target.get_mut(&owner) {
            list.retain(|i| *i != idx);
            if list.is_empty() {
                self.by_target.remove(&owner);
            }
        }
        self.registry.drop_relations(id);
        let slot = &mut self.slots[idx];
        slot.live = false;
        slot.gesture = None;
        self.free_list.push(idx);
        log::debug!("unregistered recognizer {id}");
        Ok(())
    }

    /// Unregister every recognizer of `target`.
    pub fn drop_target(&mut self, target: K, listener: &mut dyn GestureListener) {
        let ids: SmallVec<[RecognizerId; 4]> = self.recognizers_for(target).collect();
        for id in ids {
            // Every id came from the live registry.
            let _ = self.unregister(id, listener);
        }
    }

    /// Cancel everything attached to the current stream and end it.
    pub fn cancel_all(&mut self, listener: &mut dyn GestureListener) {
        let waiting: Batch = self.awaiting.iter().copied().collect();
        for &idx in waiting.iter().rev() {
            self.cancel(idx, listener);
        }
        let all: Batch = self.attached.iter().copied().collect();
        for &idx in all.iter().rev() {
            self.cancel(idx, listener);
        }
        self.awaiting.clear();
        log::debug!("cancelled {} attached recognizers", all.len());
        self.schedule_cleanup();
    }

    /// Process one raw event in root coordinates.
    ///
    /// Due timers fire first. The stream's recognizers are extracted from `tree` on
    /// contact; every attached target must still be reachable in `tree`.
    pub fn handle_event<T>(
        &mut self,
        tree: &T,
        event: &PointerEvent,
        listener: &mut dyn GestureListener,
    ) -> Result<(), GestureError>
    where
        T: TargetTree<Id = K> + ?Sized,
    {
        self.advance(event.time, listener);
        self.viewport = tree.bounds(tree.root());
        log::trace!(
            "{:?} of {:?} at {} ms",
            event.action,
            event.pointer,
            event.time
        );
        match event.action {
            PointerAction::Down | PointerAction::PointerDown => self.extract(tree, event)?,
            PointerAction::Cancel => {
                self.cancel_all(listener);
                return Ok(());
            }
            _ => {}
        }

        self.dispatching = true;
        let delivered = self.deliver(tree, event, listener);
        if event.action == PointerAction::Up {
            self.finish_stream(listener);
        }
        self.dispatching = false;
        self.run_scheduled_cleanup();
        delivered
    }

    /// Fire every timer due at or before `now`, in deadline order.
    pub fn advance(&mut self, now: u64, listener: &mut dyn GestureListener) {
        while let Some((idx, due)) = self.timers.pop_due(now) {
            let slot = &self.slots[idx];
            if !slot.live || slot.core.state.is_finished() {
                continue;
            }
            log::trace!("timer of recognizer {} fired at {due} ms", slot.core.id);
            self.now = self.now.max(due);
            self.dispatching = true;
            self.run_strategy(idx, listener, |g, cx| g.on_timer(cx));
            self.dispatching = false;
            self.run_scheduled_cleanup();
        }
        self.now = self.now.max(now);
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// State of a registered recognizer.
    pub fn state(&self, id: RecognizerId) -> Option<State> {
        self.slot_of(id).map(|s| s.core.state)
    }

    /// Latest data of a registered recognizer.
    pub fn data(&self, id: RecognizerId) -> Option<&GestureData> {
        self.slot_of(id).map(|s| &s.core.data)
    }

    /// Target the recognizer is attached to in the current stream.
    pub fn target_of(&self, id: RecognizerId) -> Option<K> {
        self.slot_of(id).and_then(|s| s.core.target)
    }

    /// Whether the recognizer takes part in the current stream.
    pub fn is_attached(&self, id: RecognizerId) -> bool {
        self.ids
            .get(&id)
            .is_some_and(|idx| self.attached.contains(idx))
    }

    /// Whether the recognizer has activated but is waiting on another one.
    pub fn is_awaiting(&self, id: RecognizerId) -> bool {
        self.slot_of(id).is_some_and(|s| s.core.is_awaiting)
    }

    /// Number of recognizers attached to the current stream.
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Recognizers registered for `target`, in registration order.
    pub fn recognizers_for(&self, target: K) -> impl Iterator<Item = RecognizerId> + '_ {
        self.by_target
            .get(&target)
            .into_iter()
            .flatten()
            .map(|&idx| self.slots[idx].core.id)
    }

    fn slot_of(&self, id: RecognizerId) -> Option<&Slot<K>> {
        self.ids.get(&id).map(|&idx| &self.slots[idx])
    }

    // Hit testing.

    fn extract<T>(&mut self, tree: &T, event: &PointerEvent) -> Result<(), GestureError>
    where
        T: TargetTree<Id = K> + ?Sized,
    {
        let Some(point) = event.position_of(event.pointer) else {
            return Ok(());
        };
        self.traverse(tree, tree.root(), point, event.pointer)?;
        Ok(())
    }

    fn traverse<T>(
        &mut self,
        tree: &T,
        id: K,
        point: Point,
        pointer: PointerId,
    ) -> Result<bool, GestureError>
    where
        T: TargetTree<Id = K> + ?Sized,
    {
        Ok(match tree.pointer_mode(id) {
            PointerMode::None => false,
            PointerMode::BoxOnly => {
                self.record(tree, id, point, pointer)? || is_bare_leaf_hit(tree, id, point)
            }
            PointerMode::BoxNone => self.descend(tree, id, point, pointer)?,
            PointerMode::Auto => {
                let found = self.descend(tree, id, point, pointer)?;
                self.record(tree, id, point, pointer)? || found || is_bare_leaf_hit(tree, id, point)
            }
        })
    }

    /// Children front to back; the first subtree that accepts the pointer ends the search.
    fn descend<T>(
        &mut self,
        tree: &T,
        parent: K,
        point: Point,
        pointer: PointerId,
    ) -> Result<bool, GestureError>
    where
        T: TargetTree<Id = K> + ?Sized,
    {
        for &child in tree.children(parent).iter().rev() {
            if !tree.is_visible(child) {
                continue;
            }
            let Some(local) = child_from_parent(tree, parent, child, point) else {
                continue;
            };
            if tree.clips_children(child) && !tree.bounds(child).contains(local) {
                continue;
            }
            if self.traverse(tree, child, local, pointer)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn record<T>(
        &mut self,
        tree: &T,
        target: K,
        point: Point,
        pointer: PointerId,
    ) -> Result<bool, GestureError>
    where
        T: TargetTree<Id = K> + ?Sized,
    {
        let Some(candidates) = self.by_target.get(&target) else {
            return Ok(false);
        };
        let candidates: SmallVec<[usize; 4]> = candidates.iter().copied().collect();
        let bounds = tree.bounds(target);
        let mut found = false;
        for idx in candidates {
            let core = &self.slots[idx].core;
            if !core.enabled() || !core.is_within_bounds(point, bounds) {
                continue;
            }
            self.record_if_not_present(idx, target)?;
            self.slots[idx].core.track(pointer);
            found = true;
        }
        Ok(found)
    }

    fn record_if_not_present(&mut self, idx: usize, target: K) -> Result<(), GestureError> {
        if self.attached.contains(&idx) {
            return Ok(());
        }
        if self.attached.len() >= self.config.max_attached {
            let limit = self.config.max_attached;
            log::warn!("stream exceeds {limit} attached recognizers");
            return Err(GestureError::TooManyRecognizers { limit });
        }
        let core = &mut self.slots[idx].core;
        core.attach(target).inspect_err(|e| log::warn!("{e}"))?;
        core.is_active = false;
        core.is_awaiting = false;
        core.activation_index = u64::MAX;
        log::debug!("attached recognizer {} to {target:?}", core.id);
        self.attached.push(idx);
        Ok(())
    }

    // Delivery.

    fn deliver<T>(
        &mut self,
        tree: &T,
        event: &PointerEvent,
        listener: &mut dyn GestureListener,
    ) -> Result<(), GestureError>
    where
        T: TargetTree<Id = K> + ?Sized,
    {
        let mut order = core::mem::take(&mut self.scratch);
        order.clear();
        order.extend_from_slice(&self.attached);
        order.sort_by_key(|&idx| self.delivery_rank(idx));

        let mapper = CoordinateMapper::new(tree);
        let mut first_error = None;
        for &idx in &order {
            if let Err(e) = self.deliver_one(tree, &mapper, idx, event, listener) {
                first_error.get_or_insert(e);
            }
            if event.action.is_up() {
                self.slots[idx].core.untrack(event.pointer);
            }
        }
        order.clear();
        self.scratch = order;
        first_error.map_or(Ok(()), Err)
    }

    fn delivery_rank(&self, idx: usize) -> (u8, u64) {
        let core = &self.slots[idx].core;
        if core.is_active {
            (0, core.activation_index)
        } else if core.is_awaiting {
            (1, core.activation_index)
        } else {
            (2, 0)
        }
    }

    fn deliver_one<T>(
        &mut self,
        tree: &T,
        mapper: &CoordinateMapper<'_, T>,
        idx: usize,
        event: &PointerEvent,
        listener: &mut dyn GestureListener,
    ) -> Result<(), GestureError>
    where
        T: TargetTree<Id = K> + ?Sized,
    {
        let core = &self.slots[idx].core;
        if !core.wants_events() || (core.is_awaiting && event.action == PointerAction::Move) {
            return Ok(());
        }
        let Some(target) = core.target else {
            return Ok(());
        };
        let to_local = match mapper.root_to_local(target) {
            Ok(affine) => affine,
            Err(e) => {
                log::warn!("recognizer {} lost its target {target:?}: {e}", core.id);
                self.cancel(idx, listener);
                return Err(e);
            }
        };
        let input = core.adapt(event, to_local, self.viewport);

        let core = &mut self.slots[idx].core;
        core.position = input.last_position(false);
        core.pointer_count = input.pointer_count();
        let outside = core.flags.contains(RecognizerFlags::CANCEL_WHEN_OUTSIDE)
            && !core.is_within_bounds(core.position, tree.bounds(target));
        if outside {
            let state = core.state;
            match state {
                State::Active => self.cancel(idx, listener),
                State::Began => self.apply(idx, Transition::Fail, listener),
                _ => {}
            }
        } else {
            self.run_strategy(idx, listener, |g, cx| g.on_event(cx, &input));
        }

        if self.slots[idx].core.is_active {
            listener.on_touch_event(&self.update_of(idx));
        }
        Ok(())
    }

    /// After the last pointer lifts, nothing will drive undecided recognizers that
    /// have no timer left, so they are cancelled.
    fn finish_stream(&mut self, listener: &mut dyn GestureListener) {
        let stale: Batch = self
            .attached
            .iter()
            .copied()
            .filter(|&idx| {
                let core = &self.slots[idx].core;
                !core.state.is_finished() && core.tracked.is_empty() && !self.timers.is_pending(idx)
            })
            .collect();
        for &idx in stale.iter().rev() {
            log::debug!(
                "recognizer {} undecided at end of stream",
                self.slots[idx].core.id
            );
            self.cancel(idx, listener);
        }
    }

    fn run_strategy(
        &mut self,
        idx: usize,
        listener: &mut dyn GestureListener,
        f: impl FnOnce(&mut Gesture, &mut dyn GestureContext),
    ) {
        let Some(mut gesture) = self.slots[idx].gesture.take() else {
            return;
        };
        {
            let mut cx = Cx {
                orch: self,
                idx,
                listener: &mut *listener,
            };
            f(&mut gesture, &mut cx);
        }
        for (new, old) in core::mem::take(&mut self.slots[idx].core.deferred) {
            gesture.on_state_change(new, old);
        }
        self.slots[idx].gesture = Some(gesture);
    }

    // Arbitration.

    fn apply(&mut self, idx: usize, transition: Transition, listener: &mut dyn GestureListener) {
        let core = &mut self.slots[idx].core;
        let old = core.state;
        if !transition.applies_to(old) {
            return;
        }
        let new = transition.target();
        core.state = new;
        log::debug!("recognizer {} {old:?} -> {new:?}", core.id);
        self.timers.cancel(idx);

        self.on_state_change(idx, new, old, listener);

        let slot = &mut self.slots[idx];
        match slot.gesture.as_mut() {
            Some(gesture) => gesture.on_state_change(new, old),
            None => slot.core.deferred.push((new, old)),
        }
    }

    fn on_state_change(
        &mut self,
        idx: usize,
        new: State,
        old: State,
        listener: &mut dyn GestureListener,
    ) {
        self.depth += 1;
        if new.is_finished() {
            let waiting: Batch = self.awaiting.iter().copied().collect();
            for other in waiting {
                if !self.slots[other].core.is_awaiting || !self.should_wait(other, idx) {
                    continue;
                }
                if new == State::End {
                    self.cancel(other, listener);
                } else {
                    self.try_activate(other, listener);
                }
            }
            if new != State::End {
                // A waiter that gives up has nothing left to be promoted to.
                self.slots[idx].core.is_awaiting = false;
            }
            self.cleanup_awaiting();
        }

        if new == State::Active {
            self.try_activate(idx, listener);
        } else if matches!(old, State::Active | State::End) {
            if self.slots[idx].core.is_active {
                self.dispatch(idx, new, old, listener);
            }
        } else {
            self.dispatch(idx, new, old, listener);
        }
        self.depth -= 1;
        self.schedule_cleanup();
    }

    /// Cancel `idx`, reporting it even if it settled while held back.
    fn cancel(&mut self, idx: usize, listener: &mut dyn GestureListener) {
        let core = &mut self.slots[idx].core;
        if !core.is_awaiting {
            self.apply(idx, Transition::Cancel, listener);
            return;
        }
        core.is_awaiting = false;
        let state = core.state;
        match state {
            // Listeners last saw it begin.
            State::Active => {
                self.apply(idx, Transition::Cancel, listener);
                self.dispatch(idx, State::Cancelled, State::Began, listener);
            }
            State::End => {
                let core = &mut self.slots[idx].core;
                core.state = State::Cancelled;
                log::debug!("recognizer {} End -> Cancelled while awaiting", core.id);
                self.dispatch(idx, State::Cancelled, State::Began, listener);
            }
            _ => self.apply(idx, Transition::Cancel, listener),
        }
    }

    fn try_activate(&mut self, idx: usize, listener: &mut dyn GestureListener) {
        if self.has_blocker(idx) {
            self.add_awaiting(idx);
        } else {
            self.make_active(idx, listener);
        }
    }

    fn has_blocker(&self, idx: usize) -> bool {
        self.attached.iter().any(|&other| {
            !self.slots[other].core.state.is_finished() && self.should_wait(idx, other)
        })
    }

    fn add_awaiting(&mut self, idx: usize) {
        if self.awaiting.contains(&idx) {
            return;
        }
        self.awaiting.push(idx);
        let core = &mut self.slots[idx].core;
        core.is_awaiting = true;
        core.activation_index = self.next_activation;
        self.next_activation += 1;
        log::trace!("recognizer {} awaits its blockers", core.id);
    }

    fn make_active(&mut self, idx: usize, listener: &mut dyn GestureListener) {
        let core = &mut self.slots[idx].core;
        let current = core.state;
        core.is_awaiting = false;
        core.is_active = true;
        core.activation_index = self.next_activation;
        self.next_activation += 1;

        let losers: Batch = self
            .attached
            .iter()
            .copied()
            .filter(|&other| self.should_be_cancelled_by(other, idx))
            .collect();
        for &other in losers.iter().rev() {
            self.cancel(other, listener);
        }
        let waiting: Batch = self.awaiting.iter().copied().collect();
        for &other in waiting.iter().rev() {
            if self.should_be_cancelled_by(other, idx) {
                self.cancel(other, listener);
            }
        }
        self.cleanup_awaiting();
        log::trace!(
            "recognizer {} confirmed active, {} cancelled",
            self.slots[idx].core.id,
            losers.len()
        );

        self.dispatch(idx, State::Active, State::Began, listener);
        if current != State::Active {
            // Settled while waiting; replay the tail it could not report then.
            self.dispatch(idx, State::End, State::Active, listener);
            if current != State::End {
                self.dispatch(idx, State::Undetermined, State::End, listener);
            }
        }
    }

    /// Whether `a` must hold its activation until `b` has finished.
    fn should_wait(&self, a: usize, b: usize) -> bool {
        if a == b {
            return false;
        }
        let (ca, cb) = (&self.slots[a].core, &self.slots[b].core);
        self.registry.waits_for(ca.id, cb.id)
            || self.registry.blocks(cb.id, ca.id)
            || (cb.flags.contains(RecognizerFlags::REQUIRED_BY_OTHERS_TO_FAIL)
                && ca.shares_pointer_with(cb))
    }

    fn should_be_cancelled_by(&self, loser: usize, winner: usize) -> bool {
        if loser == winner {
            return false;
        }
        let (cl, cw) = (&self.slots[loser].core, &self.slots[winner].core);
        if !cl.shares_pointer_with(cw) || self.registry.simultaneous(cl.id, cw.id) {
            return false;
        }
        if !cw.flags.contains(RecognizerFlags::CANCEL_OTHERS_ON_ACTIVATE) {
            return false;
        }
        let engaged = cl.is_awaiting || cl.state == State::Active;
        !(engaged && cl.flags.contains(RecognizerFlags::DISALLOW_INTERRUPTION))
    }

    fn cleanup_awaiting(&mut self) {
        let slots = &self.slots;
        self.awaiting.retain(|&idx| slots[idx].core.is_awaiting);
    }

    fn schedule_cleanup(&mut self) {
        if self.dispatching || self.depth != 0 {
            self.cleanup_scheduled = true;
        } else {
            self.cleanup();
        }
    }

    fn run_scheduled_cleanup(&mut self) {
        if self.cleanup_scheduled && self.depth == 0 && !self.dispatching {
            self.cleanup();
        }
    }

    /// Detach and reset every finished recognizer that nobody is waiting to promote.
    fn cleanup(&mut self) {
        let slots = &mut self.slots;
        let timers = &mut self.timers;
        self.attached.retain(|&idx| {
            let slot = &mut slots[idx];
            if !slot.core.state.is_finished() || slot.core.is_awaiting {
                return true;
            }
            timers.cancel(idx);
            match slot.core.reset() {
                Ok(()) => {
                    if let Some(gesture) = slot.gesture.as_mut() {
                        gesture.on_reset();
                    }
                    false
                }
                Err(e) => {
                    log::warn!("{e}");
                    true
                }
            }
        });
        self.cleanup_scheduled = false;
    }

    // Notification.

    fn dispatch(&self, idx: usize, state: State, previous: State, listener: &mut dyn GestureListener) {
        let core = &self.slots[idx].core;
        listener.on_state_change(&StateChange {
            id: core.id,
            kind: core.kind,
            state,
            previous,
            position: core.position,
            pointers: core.pointer_count,
            data: core.data,
        });
    }

    fn update_of(&self, idx: usize) -> GestureUpdate {
        let core = &self.slots[idx].core;
        GestureUpdate {
            id: core.id,
            kind: core.kind,
            state: core.state,
            position: core.position,
            pointers: core.pointer_count,
            data: core.data,
        }
    }
}

/// A target with no children claims points inside it even without recognizers,
/// so targets painted underneath do not receive them.
fn is_bare_leaf_hit<T: TargetTree + ?Sized>(tree: &T, id: T::Id, point: Point) -> bool {
    tree.children(id).is_empty() && tree.bounds(id).contains(point)
}

/// The context handed to a running strategy.
struct Cx<'a, K> {
    orch: &'a mut Orchestrator<K>,
    idx: usize,
    listener: &'a mut dyn GestureListener,
}

impl<K: Copy + Eq + Hash + Debug> GestureContext for Cx<'_, K> {
    fn state(&self) -> State {
        self.orch.slots[self.idx].core.state
    }

    fn now(&self) -> u64 {
        self.orch.now
    }

    fn flags(&self) -> RecognizerFlags {
        self.orch.slots[self.idx].core.flags
    }

    fn edge_slop(&self) -> f64 {
        self.orch.config.edge_slop
    }

    fn transition(&mut self, transition: Transition) {
        self.orch.apply(self.idx, transition, &mut *self.listener);
    }

    fn schedule_timer(&mut self, delay_ms: u64) {
        if self.state().is_finished() {
            return;
        }
        let due = self.orch.now.saturating_add(delay_ms);
        self.orch.timers.schedule(self.idx, due);
    }

    fn cancel_timer(&mut self) {
        self.orch.timers.cancel(self.idx);
    }

    fn timer_pending(&self) -> bool {
        self.orch.timers.is_pending(self.idx)
    }

    fn set_data(&mut self, data: GestureData) {
        self.orch.slots[self.idx].core.data = data;
    }
}
