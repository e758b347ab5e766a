// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

use super::GestureStrategy;
use crate::context::GestureContext;
use crate::detector::{DetectorPhase, TwoPointerSpanDetector};
use crate::input::{GestureInput, PointerAction};
use crate::types::{GestureData, State};

/// Pinch thresholds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PinchConfig {
    /// Span change, from the starting span, that activates.
    pub span_slop: f64,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self { span_slop: 10.0 }
    }
}

/// Recognizes two pointers moving apart or together.
#[derive(Clone, Debug)]
pub struct PinchGesture {
    config: PinchConfig,
    detector: TwoPointerSpanDetector,
    starting_span: f64,
    scale: f64,
    velocity: f64,
    focal_point: Point,
}

impl PinchGesture {
    /// Create a pinch recognizer.
    pub fn new(config: PinchConfig) -> Self {
        Self {
            config,
            detector: TwoPointerSpanDetector::new(),
            starting_span: 0.0,
            scale: 1.0,
            velocity: 0.0,
            focal_point: Point::ZERO,
        }
    }

    /// Configuration.
    pub fn config(&self) -> &PinchConfig {
        &self.config
    }

    fn publish(&self, cx: &mut dyn GestureContext) {
        cx.set_data(GestureData::Pinch {
            scale: self.scale,
            velocity: self.velocity,
            focal_point: self.focal_point,
        });
    }
}

impl GestureStrategy for PinchGesture {
    fn on_event(&mut self, cx: &mut dyn GestureContext, input: &GestureInput) {
        if cx.state() == State::Undetermined {
            self.scale = 1.0;
            self.velocity = 0.0;
            self.focal_point = input.last_position(true);
            self.detector.reset();
            cx.begin();
        }

        if let Some(sample) = self.detector.update(input, cx.edge_slop()) {
            match sample.phase {
                DetectorPhase::Began => {
                    self.starting_span = sample.span;
                    self.focal_point = sample.focus;
                }
                DetectorPhase::Changed => {
                    let previous = self.scale;
                    self.scale *= sample.scale_factor();
                    if sample.time_delta > 0 {
                        #[allow(
                            clippy::cast_precision_loss,
                            reason = "Sample deltas are a few milliseconds."
                        )]
                        let dt = sample.time_delta as f64;
                        self.velocity = (self.scale - previous) / dt;
                    }
                    self.focal_point = sample.focus;
                }
                DetectorPhase::Ended => {}
            }
            self.publish(cx);
            if sample.phase == DetectorPhase::Changed
                && cx.state() == State::Began
                && (sample.span - self.starting_span).abs() >= self.config.span_slop
            {
                cx.activate();
            }
        }

        match input.action {
            PointerAction::PointerUp
                if cx.state() == State::Active && input.pointer_count() <= 2 =>
            {
                cx.end();
            }
            PointerAction::Up => {
                if cx.state() == State::Active {
                    cx.end();
                } else {
                    cx.fail();
                }
            }
            _ => {}
        }
    }

    fn on_state_change(&mut self, new: State, _old: State) {
        if new.is_finished() {
            self.detector.reset();
        }
    }

    fn on_reset(&mut self) {
        self.detector.reset();
        self.starting_span = 0.0;
        self.scale = 1.0;
        self.velocity = 0.0;
        self.focal_point = Point::ZERO;
    }
}
