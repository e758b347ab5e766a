// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Vec2};

use super::GestureStrategy;
use crate::context::GestureContext;
use crate::input::{GestureInput, PointerAction};
use crate::types::{GestureData, State};

/// Tap thresholds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TapConfig {
    /// Taps required to activate.
    pub number_of_taps: u32,
    /// Longest a single contact may be held.
    pub max_duration_ms: u64,
    /// Longest pause between taps.
    pub max_delay_ms: u64,
    /// Largest horizontal drift.
    pub max_delta_x: Option<f64>,
    /// Largest vertical drift.
    pub max_delta_y: Option<f64>,
    /// Largest drift in any direction.
    pub max_dist: Option<f64>,
    /// Pointers that must have been down at once.
    pub min_pointers: usize,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            number_of_taps: 1,
            max_duration_ms: 500,
            max_delay_ms: 200,
            max_delta_x: None,
            max_delta_y: None,
            max_dist: None,
            min_pointers: 1,
        }
    }
}

/// Recognizes one or more quick taps.
///
/// Every contact must lift within `max_duration_ms`, and the next one must land
/// within `max_delay_ms`; either deadline running out fails the tap. Drift is
/// measured from the first contact's (averaged) position and accumulates across
/// pointers landing and lifting.
#[derive(Clone, Debug)]
pub struct TapGesture {
    config: TapConfig,
    start: Point,
    last: Point,
    offset: Vec2,
    taps: u32,
    max_pointers: usize,
}

impl TapGesture {
    /// Create a tap recognizer.
    pub fn new(config: TapConfig) -> Self {
        Self {
            config,
            start: Point::ZERO,
            last: Point::ZERO,
            offset: Vec2::ZERO,
            taps: 0,
            max_pointers: 0,
        }
    }

    /// Configuration.
    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    fn should_fail(&self) -> bool {
        let d = self.last - self.start + self.offset;
        if self.config.max_delta_x.is_some_and(|m| d.x.abs() > m) {
            return true;
        }
        if self.config.max_delta_y.is_some_and(|m| d.y.abs() > m) {
            return true;
        }
        self.config.max_dist.is_some_and(|m| d.hypot2() > m * m)
    }

    fn start_tap(&self, cx: &mut dyn GestureContext) {
        cx.schedule_timer(self.config.max_duration_ms);
    }

    fn end_tap(&mut self, cx: &mut dyn GestureContext) {
        cx.cancel_timer();
        self.taps += 1;
        cx.set_data(GestureData::Tap { taps: self.taps });
        if self.taps == self.config.number_of_taps && self.max_pointers >= self.config.min_pointers {
            cx.activate();
            cx.end();
        } else {
            cx.schedule_timer(self.config.max_delay_ms);
        }
    }
}

impl GestureStrategy for TapGesture {
    fn on_event(&mut self, cx: &mut dyn GestureContext, input: &GestureInput) {
        let state = cx.state();
        if state == State::Undetermined {
            self.offset = Vec2::ZERO;
            self.start = input.last_position(true);
        }
        if matches!(input.action, PointerAction::PointerDown | PointerAction::PointerUp) {
            self.offset += self.last - self.start;
            self.last = input.last_position(true);
            self.start = self.last;
        } else {
            self.last = input.last_position(true);
        }
        self.max_pointers = self.max_pointers.max(input.pointer_count());

        if self.should_fail() {
            cx.fail();
        } else if state == State::Undetermined {
            if input.action == PointerAction::Down {
                cx.begin();
            }
            self.start_tap(cx);
        } else if state == State::Began {
            match input.action {
                PointerAction::Up => self.end_tap(cx),
                PointerAction::Down => self.start_tap(cx),
                _ => {}
            }
        }
    }

    fn on_reset(&mut self) {
        self.taps = 0;
        self.max_pointers = 0;
        self.offset = Vec2::ZERO;
    }
}
