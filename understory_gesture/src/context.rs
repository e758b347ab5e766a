// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The interface gesture strategies use to drive their recognizer.

use crate::recognizer::RecognizerFlags;
use crate::types::{GestureData, State, Transition};

/// Handle a gesture strategy receives while processing an event or a timer.
///
/// Transitions requested here are applied immediately: by the time
/// [`activate`](Self::activate) returns, arbitration for that activation has run,
/// including any cascade of cancellations. A strategy must therefore re-read
/// [`state`](Self::state) after a transition instead of assuming it took effect;
/// another recognizer may have cancelled this one in the meantime.
pub trait GestureContext {
    /// Current state of the recognizer.
    fn state(&self) -> State;

    /// Timestamp of the event or timer being processed, in milliseconds.
    fn now(&self) -> u64;

    /// Behavior flags of the recognizer.
    fn flags(&self) -> RecognizerFlags;

    /// Edge margin within which two-pointer samples are considered sloppy.
    fn edge_slop(&self) -> f64;

    /// Request a guarded transition. Ignored if the current state does not allow it.
    fn transition(&mut self, transition: Transition);

    /// Arm the recognizer's timer to fire `delay_ms` from [`now`](Self::now).
    ///
    /// A recognizer has at most one pending timer; arming replaces it.
    fn schedule_timer(&mut self, delay_ms: u64);

    /// Disarm the pending timer, if any.
    fn cancel_timer(&mut self);

    /// Whether a timer is armed.
    fn timer_pending(&self) -> bool;

    /// Publish derived data for listeners.
    fn set_data(&mut self, data: GestureData);

    /// `Undetermined → Began`.
    fn begin(&mut self) {
        self.transition(Transition::Begin);
    }

    /// `Undetermined | Began → Active`.
    fn activate(&mut self) {
        self.transition(Transition::Activate);
    }

    /// `Active → End`.
    fn end(&mut self) {
        self.transition(Transition::End);
    }

    /// Any non-terminal state to `Cancelled`.
    fn cancel(&mut self) {
        self.transition(Transition::Cancel);
    }

    /// Any non-terminal state to `Failed`.
    fn fail(&mut self) {
        self.transition(Transition::Fail);
    }
}
