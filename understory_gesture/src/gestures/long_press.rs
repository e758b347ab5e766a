// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

use super::GestureStrategy;
use crate::context::GestureContext;
use crate::input::{GestureInput, PointerAction};
use crate::types::{GestureData, State};

/// Long-press thresholds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LongPressConfig {
    /// Hold time before activation. Zero activates as soon as the pointers are down.
    pub min_duration_ms: u64,
    /// Largest drift of the averaged pointer position.
    pub max_dist: f64,
    /// Pointers that must be held.
    pub number_of_pointers: usize,
}

impl Default for LongPressConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: 500,
            max_dist: 10.0,
            number_of_pointers: 1,
        }
    }
}

/// Recognizes pointers held in place.
#[derive(Clone, Debug)]
pub struct LongPressGesture {
    config: LongPressConfig,
    start: Point,
    start_time: u64,
}

impl LongPressGesture {
    /// Create a long-press recognizer.
    pub fn new(config: LongPressConfig) -> Self {
        Self {
            config,
            start: Point::ZERO,
            start_time: 0,
        }
    }

    /// Configuration.
    pub fn config(&self) -> &LongPressConfig {
        &self.config
    }

    fn publish(&self, cx: &mut dyn GestureContext) {
        cx.set_data(GestureData::LongPress {
            duration_ms: cx.now().saturating_sub(self.start_time),
        });
    }
}

impl GestureStrategy for LongPressGesture {
    fn on_event(&mut self, cx: &mut dyn GestureContext, input: &GestureInput) {
        let required = self.config.number_of_pointers;
        if cx.state() == State::Undetermined {
            self.start_time = input.time;
            self.start = input.last_position(true);
            self.publish(cx);
            cx.begin();
        }
        self.publish(cx);

        match input.action {
            PointerAction::PointerDown => {
                self.start = input.last_position(true);
                if input.pointer_count() > required {
                    cx.fail();
                    return;
                }
            }
            PointerAction::Up => {
                if cx.state() == State::Active {
                    cx.end();
                } else {
                    cx.fail();
                }
                return;
            }
            PointerAction::PointerUp => {
                if input.pointer_count() - 1 < required && cx.state() != State::Active {
                    cx.fail();
                } else {
                    self.start = input.last_position(true);
                }
                return;
            }
            _ => {}
        }

        if input.action.is_down() && cx.state() == State::Began && input.pointer_count() == required
        {
            if self.config.min_duration_ms == 0 {
                cx.activate();
            } else {
                cx.schedule_timer(self.config.min_duration_ms);
            }
            return;
        }

        if input.action == PointerAction::Move {
            let drift = input.last_position(true) - self.start;
            if drift.hypot2() > self.config.max_dist * self.config.max_dist {
                if cx.state() == State::Active {
                    cx.cancel();
                } else {
                    cx.fail();
                }
            }
        }
    }

    fn on_timer(&mut self, cx: &mut dyn GestureContext) {
        self.publish(cx);
        cx.activate();
    }

    fn on_reset(&mut self) {
        self.start_time = 0;
        self.start = Point::ZERO;
    }
}
