// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bitflags::bitflags;
use kurbo::{Point, Vec2};

use super::GestureStrategy;
use crate::context::GestureContext;
use crate::input::{GestureInput, PointerAction};
use crate::types::State;

bitflags! {
    /// Directions a fling may travel in.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct FlingDirection: u8 {
        /// Positive x.
        const RIGHT = 1 << 0;
        /// Negative x.
        const LEFT = 1 << 1;
        /// Negative y.
        const UP = 1 << 2;
        /// Positive y.
        const DOWN = 1 << 3;
    }
}

impl Default for FlingDirection {
    fn default() -> Self {
        Self::RIGHT
    }
}

impl FlingDirection {
    /// Whether `delta` travels farther than `min` along any enabled direction.
    pub fn matches(self, delta: Vec2, min: f64) -> bool {
        (self.contains(Self::RIGHT) && delta.x > min)
            || (self.contains(Self::LEFT) && -delta.x > min)
            || (self.contains(Self::UP) && -delta.y > min)
            || (self.contains(Self::DOWN) && delta.y > min)
    }
}

/// Fling thresholds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlingConfig {
    /// Allowed directions.
    pub direction: FlingDirection,
    /// Exact number of pointers the fling must use.
    pub number_of_pointers: usize,
    /// Time allowed from first contact to success.
    pub max_duration_ms: u64,
    /// Displacement along an allowed direction that succeeds.
    pub min_displacement: f64,
}

impl Default for FlingConfig {
    fn default() -> Self {
        Self {
            direction: FlingDirection::default(),
            number_of_pointers: 1,
            max_duration_ms: 800,
            min_displacement: 160.0,
        }
    }
}

/// Recognizes a quick directional swipe.
///
/// Succeeds by activating and ending at once. Its only data is the state change.
#[derive(Clone, Debug)]
pub struct FlingGesture {
    config: FlingConfig,
    start: Point,
    max_pointers: usize,
}

impl FlingGesture {
    /// Create a fling recognizer.
    pub fn new(config: FlingConfig) -> Self {
        Self {
            config,
            start: Point::ZERO,
            max_pointers: 0,
        }
    }

    /// Configuration.
    pub fn config(&self) -> &FlingConfig {
        &self.config
    }

    fn try_succeed(&self, cx: &mut dyn GestureContext, input: &GestureInput) -> bool {
        let delta = input.last_position(true) - self.start;
        if self.max_pointers == self.config.number_of_pointers
            && self
                .config
                .direction
                .matches(delta, self.config.min_displacement)
        {
            cx.activate();
            cx.end();
            true
        } else {
            false
        }
    }
}

impl GestureStrategy for FlingGesture {
    fn on_event(&mut self, cx: &mut dyn GestureContext, input: &GestureInput) {
        if cx.state() == State::Undetermined {
            self.start = input.last_position(true);
            self.max_pointers = 0;
            cx.begin();
            cx.schedule_timer(self.config.max_duration_ms);
        }
        if cx.state() != State::Began {
            return;
        }
        self.max_pointers = self.max_pointers.max(input.pointer_count());
        match input.action {
            PointerAction::Up => {
                if !self.try_succeed(cx, input) {
                    cx.fail();
                }
            }
            PointerAction::PointerDown => {
                // The averaged position jumps; measure from the new centroid.
                self.start = input.last_position(true);
            }
            _ => {
                self.try_succeed(cx, input);
            }
        }
    }

    fn on_reset(&mut self) {
        self.start = Point::ZERO;
        self.max_pointers = 0;
    }
}
