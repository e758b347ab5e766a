// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notifications emitted while arbitrating a stream.
//!
//! ## Overview
//!
//! The orchestrator reports two things through a [`GestureListener`]:
//!
//! - [`StateChange`]: a recognizer's state changed, as seen from outside. Arbitration
//!   filters these; a recognizer that is still waiting on another does not report
//!   `Active` until it is actually promoted.
//! - [`GestureUpdate`]: an active recognizer processed an event and its data may have moved.
//!
//! Listeners are passed per call, so the orchestrator never holds a callback.
//! A `Vec<GestureEvent>` collects everything in order, which is what tests and
//! simple hosts usually want:
//!
//! ```
//! use understory_gesture::listener::{GestureEvent, GestureListener, StateChange};
//! use understory_gesture::types::{GestureData, GestureKind, RecognizerId, State};
//! use kurbo::Point;
//!
//! let mut log: Vec<GestureEvent> = Vec::new();
//! log.on_state_change(&StateChange {
//!     id: RecognizerId(1),
//!     kind: GestureKind::Tap,
//!     state: State::Began,
//!     previous: State::Undetermined,
//!     position: Point::ZERO,
//!     pointers: 1,
//!     data: GestureData::None,
//! });
//! assert_eq!(log.len(), 1);
//! ```

use alloc::vec::Vec;

use kurbo::Point;

use crate::types::{GestureData, GestureKind, RecognizerId, State};

/// A reported state change.
#[derive(Clone, Debug, PartialEq)]
pub struct StateChange {
    /// Recognizer that changed.
    pub id: RecognizerId,
    /// Its gesture kind.
    pub kind: GestureKind,
    /// New state.
    pub state: State,
    /// State before the change, as reported.
    pub previous: State,
    /// Last known position in target-local space.
    pub position: Point,
    /// Tracked pointers at the time of the change.
    pub pointers: usize,
    /// Derived data at the time of the change.
    pub data: GestureData,
}

/// Continuous data from an active recognizer.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureUpdate {
    /// Recognizer that processed the event.
    pub id: RecognizerId,
    /// Its gesture kind.
    pub kind: GestureKind,
    /// Current state.
    pub state: State,
    /// Last known position in target-local space.
    pub position: Point,
    /// Tracked pointers.
    pub pointers: usize,
    /// Derived data.
    pub data: GestureData,
}

/// Either notification, for hosts that record them.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// See [`StateChange`].
    StateChange(StateChange),
    /// See [`GestureUpdate`].
    Update(GestureUpdate),
}

impl GestureEvent {
    /// Recognizer the notification is about.
    pub fn id(&self) -> RecognizerId {
        match self {
            Self::StateChange(c) => c.id,
            Self::Update(u) => u.id,
        }
    }

    /// The change, if this is a state change.
    pub fn as_state_change(&self) -> Option<&StateChange> {
        match self {
            Self::StateChange(c) => Some(c),
            Self::Update(_) => None,
        }
    }
}

/// Receives arbitration output.
pub trait GestureListener {
    /// A recognizer's reported state changed.
    fn on_state_change(&mut self, _change: &StateChange) {}

    /// An active recognizer processed an event.
    fn on_touch_event(&mut self, _update: &GestureUpdate) {}
}

/// Discards everything.
impl GestureListener for () {}

impl GestureListener for Vec<GestureEvent> {
    fn on_state_change(&mut self, change: &StateChange) {
        self.push(GestureEvent::StateChange(change.clone()));
    }

    fn on_touch_event(&mut self, update: &GestureUpdate) {
        self.push(GestureEvent::Update(update.clone()));
    }
}

impl<L: GestureListener + ?Sized> GestureListener for &mut L {
    fn on_state_change(&mut self, change: &StateChange) {
        (**self).on_state_change(change);
    }

    fn on_touch_event(&mut self, update: &GestureUpdate) {
        (**self).on_touch_event(update);
    }
}
