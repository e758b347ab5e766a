// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Vec2};

use super::GestureStrategy;
use crate::context::GestureContext;
use crate::input::{GestureInput, PointerAction};
use crate::types::{GestureData, State};
use crate::velocity::VelocityTracker;

/// An allowed interval for a translation component.
///
/// A value is outside the range when it is below `start` or above `end`. Use
/// `f64::NEG_INFINITY`/`f64::INFINITY` for an open side.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetRange {
    /// Lower bound.
    pub start: f64,
    /// Upper bound.
    pub end: f64,
}

impl OffsetRange {
    /// A range from `start` to `end`.
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// A symmetric range `-magnitude..=magnitude`.
    pub const fn symmetric(magnitude: f64) -> Self {
        Self {
            start: -magnitude,
            end: magnitude,
        }
    }

    /// Whether `v` lies outside the range.
    pub fn exceeded_by(&self, v: f64) -> bool {
        v < self.start || v > self.end
    }
}

/// Pan thresholds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PanConfig {
    /// Pointers needed to begin.
    pub min_pointers: usize,
    /// More pointers than this fails, or cancels an active pan.
    pub max_pointers: usize,
    /// Radial distance that activates.
    ///
    /// `None` picks [`DEFAULT_MIN_DIST`] unless one of the offset ranges or
    /// minimum velocities is set, in which case the radial check is off.
    pub min_dist: Option<f64>,
    /// Horizontal translation outside this range activates.
    pub active_offset_x: Option<OffsetRange>,
    /// Vertical translation outside this range activates.
    pub active_offset_y: Option<OffsetRange>,
    /// Horizontal translation outside this range fails.
    pub fail_offset_x: Option<OffsetRange>,
    /// Vertical translation outside this range fails.
    pub fail_offset_y: Option<OffsetRange>,
    /// Speed, in px/ms, that activates on its own.
    pub min_velocity: Option<f64>,
    /// Horizontal velocity, in px/ms, that activates.
    ///
    /// A negative threshold activates at or below it, otherwise at or above it.
    pub min_velocity_x: Option<f64>,
    /// Vertical velocity, in px/ms, that activates; signed like `min_velocity_x`.
    pub min_velocity_y: Option<f64>,
    /// Activation is held back while moving faster than this, in px/ms.
    pub max_velocity: Option<f64>,
    /// Follow the average of all pointers instead of the most recent one.
    pub average_touches: bool,
    /// Activate after holding this long without moving past
    /// [`DEFAULT_MIN_DIST`]; moving further first fails. `0` disables.
    pub activate_after_long_press_ms: u64,
}

/// Radial activation distance when none is configured.
pub const DEFAULT_MIN_DIST: f64 = 10.0;

impl PanConfig {
    fn has_custom_criteria(&self) -> bool {
        self.active_offset_x.is_some()
            || self.active_offset_y.is_some()
            || self.fail_offset_x.is_some()
            || self.fail_offset_y.is_some()
            || self.min_velocity.is_some()
            || self.min_velocity_x.is_some()
            || self.min_velocity_y.is_some()
    }

    /// The radial distance that activates, if the radial check is on.
    pub fn effective_min_dist(&self) -> Option<f64> {
        match self.min_dist {
            Some(d) => Some(d),
            None if self.has_custom_criteria() => None,
            None => Some(DEFAULT_MIN_DIST),
        }
    }
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            min_pointers: 1,
            max_pointers: 10,
            min_dist: None,
            active_offset_x: None,
            active_offset_y: None,
            fail_offset_x: None,
            fail_offset_y: None,
            min_velocity: None,
            min_velocity_x: None,
            min_velocity_y: None,
            max_velocity: None,
            average_touches: false,
            activate_after_long_press_ms: 0,
        }
    }
}

/// Recognizes dragging.
///
/// Translation is `last - start + offset`, where `offset` absorbs the jump of the
/// followed position whenever a pointer lands or lifts.
#[derive(Clone, Debug)]
pub struct PanGesture {
    config: PanConfig,
    min_dist: Option<f64>,
    start: Point,
    last: Point,
    offset: Vec2,
    last_absolute: Point,
    tracker: VelocityTracker,
}

impl PanGesture {
    /// Create a pan recognizer.
    pub fn new(config: PanConfig) -> Self {
        Self {
            min_dist: config.effective_min_dist(),
            config,
            start: Point::ZERO,
            last: Point::ZERO,
            offset: Vec2::ZERO,
            last_absolute: Point::ZERO,
            tracker: VelocityTracker::new(),
        }
    }

    /// Configuration.
    pub fn config(&self) -> &PanConfig {
        &self.config
    }

    /// Translation since the first contact.
    pub fn translation(&self) -> Vec2 {
        self.last - self.start + self.offset
    }

    fn should_fail(&self) -> bool {
        let t = self.translation();
        if self.config.activate_after_long_press_ms > 0
            && t.hypot2() > DEFAULT_MIN_DIST * DEFAULT_MIN_DIST
        {
            return true;
        }
        self.config.fail_offset_x.is_some_and(|r| r.exceeded_by(t.x))
            || self.config.fail_offset_y.is_some_and(|r| r.exceeded_by(t.y))
    }

    fn should_activate(&self, velocity: Vec2) -> bool {
        let t = self.translation();
        if self.config.active_offset_x.is_some_and(|r| r.exceeded_by(t.x))
            || self.config.active_offset_y.is_some_and(|r| r.exceeded_by(t.y))
        {
            return true;
        }
        if self.min_dist.is_some_and(|d| t.hypot2() >= d * d) {
            return true;
        }
        self.config
            .min_velocity
            .is_some_and(|v| velocity.hypot2() >= v * v)
            || self.config.min_velocity_x.is_some_and(|v| reaches(velocity.x, v))
            || self.config.min_velocity_y.is_some_and(|v| reaches(velocity.y, v))
    }

    fn under_velocity_cap(&self, velocity: Vec2) -> bool {
        self.config
            .max_velocity
            .is_none_or(|v| velocity.hypot2() <= v * v)
    }

    fn rebase(&mut self, input: &GestureInput) {
        self.offset += self.last - self.start;
        self.last = input.last_position(self.config.average_touches);
        self.start = self.last;
        let absolute = input.last_absolute(self.config.average_touches);
        self.tracker.offset(absolute - self.last_absolute);
        self.last_absolute = absolute;
    }
}

fn reaches(v: f64, threshold: f64) -> bool {
    if threshold < 0.0 {
        v <= threshold
    } else {
        v >= threshold
    }
}

impl GestureStrategy for PanGesture {
    fn on_event(&mut self, cx: &mut dyn GestureContext, input: &GestureInput) {
        let average = self.config.average_touches;
        if cx.state() == State::Undetermined && input.action.is_down() {
            self.offset = Vec2::ZERO;
            self.start = input.last_position(average);
            self.last = self.start;
            self.last_absolute = input.last_absolute(average);
            self.tracker.clear();
            self.tracker.add(input.time, self.last_absolute);
        }

        match input.action {
            PointerAction::PointerDown | PointerAction::PointerUp => self.rebase(input),
            PointerAction::Move => {
                self.last = input.last_position(average);
                self.last_absolute = input.last_absolute(average);
                self.tracker.add(input.time, self.last_absolute);
            }
            _ => {}
        }
        let velocity = self.tracker.velocity();
        cx.set_data(GestureData::Pan {
            translation: self.translation(),
            velocity,
        });

        let remaining = match input.action {
            PointerAction::PointerUp => input.pointer_count().saturating_sub(1),
            _ => input.pointer_count(),
        };

        match input.action {
            PointerAction::Up => {
                if cx.state() == State::Active {
                    cx.end();
                } else {
                    cx.fail();
                }
                return;
            }
            PointerAction::PointerDown if remaining > self.config.max_pointers => {
                if cx.state() == State::Active {
                    cx.cancel();
                } else {
                    cx.fail();
                }
                return;
            }
            PointerAction::PointerUp
                if cx.state() == State::Active && remaining < self.config.min_pointers =>
            {
                cx.fail();
                return;
            }
            _ => {}
        }

        if cx.state() == State::Undetermined && remaining >= self.config.min_pointers {
            cx.begin();
            if self.config.activate_after_long_press_ms > 0 {
                cx.schedule_timer(self.config.activate_after_long_press_ms);
            }
        }
        if cx.state() == State::Began {
            if self.should_fail() {
                cx.cancel_timer();
                cx.fail();
            } else if self.should_activate(velocity) && self.under_velocity_cap(velocity) {
                cx.activate();
            }
        }
    }

    fn on_timer(&mut self, cx: &mut dyn GestureContext) {
        if cx.state() == State::Began {
            cx.activate();
        }
    }

    fn on_reset(&mut self) {
        self.start = Point::ZERO;
        self.last = Point::ZERO;
        self.offset = Vec2::ZERO;
        self.last_absolute = Point::ZERO;
        self.tracker.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerAction::*;
    use crate::testing::{MockContext, input};

    fn translation(cx: &MockContext) -> Vec2 {
        match cx.data {
            GestureData::Pan { translation, .. } => translation,
            ref other => panic!("expected pan data, got {other:?}"),
        }
    }

    #[test]
    fn drag_past_min_dist_activates() {
        let mut g = PanGesture::new(PanConfig {
            max_velocity: Some(50.0),
            ..PanConfig::default()
        });
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 10.0, 10.0)], 0));
        assert_eq!(cx.state, State::Began);
        cx.feed(&mut g, &input(Move, 0, &[(0, 16.0, 10.0)], 5));
        assert_eq!(cx.state, State::Began, "6px is under the threshold");
        cx.feed(&mut g, &input(Move, 0, &[(0, 25.0, 10.0)], 10));
        assert_eq!(cx.state, State::Active);
        assert!((translation(&cx).x - 15.0).abs() < 1e-9);
        cx.feed(&mut g, &input(Up, 0, &[(0, 25.0, 10.0)], 20));
        assert_eq!(cx.state, State::End);
    }

    #[test]
    fn velocity_cap_holds_back_activation() {
        let mut g = PanGesture::new(PanConfig {
            max_velocity: Some(1.0),
            ..PanConfig::default()
        });
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 0.0, 0.0)], 0));
        cx.feed(&mut g, &input(Move, 0, &[(0, 50.0, 0.0)], 10));
        assert_eq!(cx.state, State::Began, "5 px/ms is over the cap");
        cx.feed(&mut g, &input(Move, 0, &[(0, 50.0, 0.0)], 200));
        assert_eq!(cx.state, State::Active, "stale fast samples left the window");
    }

    #[test]
    fn fail_offset_fails_and_up_without_activation_fails() {
        let mut g = PanGesture::new(PanConfig {
            min_dist: None,
            active_offset_x: Some(OffsetRange::symmetric(20.0)),
            fail_offset_y: Some(OffsetRange::symmetric(5.0)),
            ..PanConfig::default()
        });
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 0.0, 0.0)], 0));
        cx.feed(&mut g, &input(Move, 0, &[(0, 0.0, 8.0)], 10));
        assert_eq!(cx.state, State::Failed);

        let mut g = PanGesture::new(PanConfig::default());
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 0.0, 0.0)], 0));
        cx.feed(&mut g, &input(Up, 0, &[(0, 2.0, 0.0)], 10));
        assert_eq!(cx.state, State::Failed);
    }

    #[test]
    fn offset_criteria_turn_off_default_min_dist() {
        let mut g = PanGesture::new(PanConfig {
            active_offset_x: Some(OffsetRange::symmetric(20.0)),
            ..PanConfig::default()
        });
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 0.0, 0.0)], 0));
        cx.feed(&mut g, &input(Move, 0, &[(0, 12.0, 0.0)], 200));
        assert_eq!(cx.state, State::Began, "12px is inside the active offset");
        cx.feed(&mut g, &input(Move, 0, &[(0, 21.0, 0.0)], 400));
        assert_eq!(cx.state, State::Active, "past the active offset");

        let explicit = PanConfig {
            min_dist: Some(10.0),
            active_offset_x: Some(OffsetRange::symmetric(20.0)),
            ..PanConfig::default()
        };
        assert_eq!(explicit.effective_min_dist(), Some(10.0), "explicit distance is kept");
        assert_eq!(
            PanConfig::default().effective_min_dist(),
            Some(DEFAULT_MIN_DIST),
            "no criteria falls back to the default distance"
        );
    }

    #[test]
    fn axis_velocity_thresholds_are_signed() {
        let leftward = PanConfig {
            min_velocity_x: Some(-0.5),
            ..PanConfig::default()
        };
        assert_eq!(leftward.effective_min_dist(), None, "velocity counts as a criterion");

        let mut g = PanGesture::new(leftward);
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 100.0, 0.0)], 0));
        cx.feed(&mut g, &input(Move, 0, &[(0, 130.0, 0.0)], 10));
        assert_eq!(cx.state, State::Began, "rightward motion does not reach -0.5");

        let mut g = PanGesture::new(leftward);
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 100.0, 0.0)], 0));
        cx.feed(&mut g, &input(Move, 0, &[(0, 70.0, 0.0)], 10));
        assert_eq!(cx.state, State::Active, "fast leftward motion activates");

        let mut g = PanGesture::new(PanConfig {
            min_velocity_y: Some(0.5),
            ..PanConfig::default()
        });
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 0.0, 0.0)], 0));
        cx.feed(&mut g, &input(Move, 0, &[(0, 30.0, 0.0)], 10));
        assert_eq!(cx.state, State::Began, "horizontal speed is ignored");
        cx.feed(&mut g, &input(Move, 0, &[(0, 30.0, 30.0)], 20));
        assert_eq!(cx.state, State::Active, "downward motion activates");
    }

    #[test]
    fn hold_activates_after_long_press() {
        let config = PanConfig {
            activate_after_long_press_ms: 300,
            ..PanConfig::default()
        };
        let mut g = PanGesture::new(config);
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 0.0, 0.0)], 0));
        assert_eq!(cx.state, State::Began);
        assert_eq!(cx.timer, Some(300), "hold timer armed on begin");
        cx.feed(&mut g, &input(Move, 0, &[(0, 4.0, 3.0)], 100));
        cx.advance(&mut g, 300);
        assert_eq!(cx.state, State::Active, "held still long enough");

        let mut g = PanGesture::new(config);
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 0.0, 0.0)], 0));
        cx.feed(&mut g, &input(Move, 0, &[(0, 11.0, 0.0)], 100));
        assert_eq!(cx.state, State::Failed, "moved before the hold completed");
        assert_eq!(cx.timer, None);
    }

    #[test]
    fn translation_survives_pointer_changes() {
        let mut g = PanGesture::new(PanConfig {
            average_touches: true,
            ..PanConfig::default()
        });
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 0.0, 0.0)], 0));
        cx.feed(&mut g, &input(Move, 0, &[(0, 20.0, 0.0)], 40));
        assert_eq!(cx.state, State::Active);
        cx.feed(
            &mut g,
            &input(PointerDown, 1, &[(0, 20.0, 0.0), (1, 120.0, 0.0)], 50),
        );
        assert!(
            (translation(&cx).x - 20.0).abs() < 1e-9,
            "landing pointer must not jump the translation"
        );
        cx.feed(
            &mut g,
            &input(Move, 0, &[(0, 30.0, 0.0), (1, 130.0, 0.0)], 60),
        );
        assert!((translation(&cx).x - 30.0).abs() < 1e-9);
    }

    #[test]
    fn too_many_pointers_cancels_active_pan() {
        let mut g = PanGesture::new(PanConfig {
            max_pointers: 1,
            ..PanConfig::default()
        });
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 0.0, 0.0)], 0));
        cx.feed(&mut g, &input(Move, 0, &[(0, 20.0, 0.0)], 40));
        cx.feed(
            &mut g,
            &input(PointerDown, 1, &[(0, 20.0, 0.0), (1, 50.0, 0.0)], 50),
        );
        assert_eq!(cx.state, State::Cancelled);
    }

    #[test]
    fn two_finger_pan_begins_on_second_pointer() {
        let mut g = PanGesture::new(PanConfig {
            min_pointers: 2,
            ..PanConfig::default()
        });
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 0.0, 0.0)], 0));
        assert_eq!(cx.state, State::Undetermined);
        cx.feed(
            &mut g,
            &input(PointerDown, 1, &[(0, 0.0, 0.0), (1, 10.0, 0.0)], 10),
        );
        assert_eq!(cx.state, State::Began);
    }
}
