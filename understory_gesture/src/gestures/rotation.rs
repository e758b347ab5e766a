// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

use super::GestureStrategy;
use crate::context::GestureContext;
use crate::detector::{DetectorPhase, TwoPointerAngleDetector};
use crate::input::{GestureInput, PointerAction};
use crate::types::{GestureData, State};

/// Rotation thresholds.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RotationConfig {
    /// Accumulated angle, in radians, that activates. Zero activates as soon as a
    /// second pointer joins.
    pub min_rotation: f64,
}

/// Recognizes two pointers turning around each other.
#[derive(Clone, Debug)]
pub struct RotationGesture {
    config: RotationConfig,
    detector: TwoPointerAngleDetector,
    rotation: f64,
    velocity: f64,
    anchor: Point,
}

impl RotationGesture {
    /// Create a rotation recognizer.
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            detector: TwoPointerAngleDetector::new(),
            rotation: 0.0,
            velocity: 0.0,
            anchor: Point::ZERO,
        }
    }

    /// Configuration.
    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    fn publish(&self, cx: &mut dyn GestureContext) {
        cx.set_data(GestureData::Rotation {
            rotation: self.rotation,
            velocity: self.velocity,
            anchor: self.anchor,
        });
    }

    fn past_threshold(&self) -> bool {
        self.config.min_rotation <= 0.0 || self.rotation.abs() >= self.config.min_rotation
    }

    fn finish(cx: &mut dyn GestureContext) {
        if cx.state() == State::Active {
            cx.end();
        } else {
            cx.fail();
        }
    }
}

impl GestureStrategy for RotationGesture {
    fn on_event(&mut self, cx: &mut dyn GestureContext, input: &GestureInput) {
        if cx.state() == State::Undetermined && input.action == PointerAction::Down {
            self.rotation = 0.0;
            self.velocity = 0.0;
            self.detector.reset();
        }

        if let Some(sample) = self.detector.update(input, cx.edge_slop()) {
            self.anchor = sample.anchor;
            match sample.phase {
                DetectorPhase::Began => {
                    self.publish(cx);
                    if cx.state() == State::Undetermined {
                        cx.begin();
                    }
                }
                DetectorPhase::Changed => {
                    self.rotation += sample.rotation;
                    if sample.time_delta > 0 {
                        #[allow(
                            clippy::cast_precision_loss,
                            reason = "Sample deltas are a few milliseconds."
                        )]
                        let dt = sample.time_delta as f64;
                        self.velocity = sample.rotation / dt;
                    }
                    self.publish(cx);
                }
                DetectorPhase::Ended => {
                    self.publish(cx);
                    Self::finish(cx);
                    return;
                }
            }
            if cx.state() == State::Began && self.past_threshold() {
                cx.activate();
            }
        }

        if input.action == PointerAction::Up {
            Self::finish(cx);
        }
    }

    fn on_state_change(&mut self, new: State, _old: State) {
        if new.is_finished() {
            self.detector.reset();
        }
    }

    fn on_reset(&mut self) {
        self.detector.reset();
        self.rotation = 0.0;
        self.velocity = 0.0;
        self.anchor = Point::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerAction::*;
    use crate::testing::{MockContext, input};
    use core::f64::consts::FRAC_PI_6;
    use kurbo::Vec2;

    fn pair_at(degrees: f64) -> [(u32, f64, f64); 2] {
        let v = Vec2::from_angle(degrees.to_radians()) * 50.0;
        [(0, 200.0, 200.0), (1, 200.0 + v.x, 200.0 + v.y)]
    }

    fn rotation(cx: &MockContext) -> f64 {
        match cx.data {
            GestureData::Rotation { rotation, .. } => rotation,
            ref other => panic!("expected rotation data, got {other:?}"),
        }
    }

    #[test]
    fn second_pointer_begins_and_activates() {
        let mut g = RotationGesture::new(RotationConfig::default());
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 200.0, 200.0)], 0));
        assert_eq!(cx.state, State::Undetermined);
        cx.feed(&mut g, &input(PointerDown, 1, &pair_at(0.0), 10));
        assert_eq!(cx.history, [State::Began, State::Active]);
        cx.feed(&mut g, &input(Move, 1, &pair_at(15.0), 20));
        cx.feed(&mut g, &input(Move, 1, &pair_at(30.0), 30));
        assert!(
            (rotation(&cx) - FRAC_PI_6).abs() < 1e-9,
            "rotation {}",
            rotation(&cx)
        );
        cx.feed(&mut g, &input(PointerUp, 1, &pair_at(30.0), 40));
        assert_eq!(cx.state, State::End);
    }

    #[test]
    fn min_rotation_defers_activation() {
        let mut g = RotationGesture::new(RotationConfig { min_rotation: 0.3 });
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 200.0, 200.0)], 0));
        cx.feed(&mut g, &input(PointerDown, 1, &pair_at(0.0), 10));
        assert_eq!(cx.state, State::Began);
        cx.feed(&mut g, &input(Move, 1, &pair_at(10.0), 20));
        assert_eq!(cx.state, State::Began);
        cx.feed(&mut g, &input(Move, 1, &pair_at(20.0), 30));
        assert_eq!(cx.state, State::Active, "20 degrees exceeds 0.3 rad");
    }

    #[test]
    fn single_pointer_up_fails() {
        let mut g = RotationGesture::new(RotationConfig::default());
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 200.0, 200.0)], 0));
        cx.feed(&mut g, &input(Up, 0, &[(0, 200.0, 200.0)], 10));
        assert_eq!(cx.state, State::Failed);
    }
}
