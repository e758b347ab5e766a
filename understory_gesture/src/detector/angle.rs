// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::f64::consts::{FRAC_PI_2, PI};

use kurbo::Point;

use super::{DetectorPhase, PairEvent, PointerPair};
use crate::input::GestureInput;

/// One angle measurement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AngleSample {
    /// Segment phase.
    pub phase: DetectorPhase,
    /// Rotation since the previous sample in radians, clockwise positive on a
    /// y-down screen, within (-π/2, π/2].
    pub rotation: f64,
    /// Midpoint of the pair, target-local.
    pub anchor: Point,
    /// Milliseconds since the previous sample.
    pub time_delta: u64,
}

/// Tracks the angle of the line through two pointers.
#[derive(Clone, Debug)]
pub struct TwoPointerAngleDetector {
    pair: PointerPair,
    /// Angle of the previous sample; NaN right after a (re)start.
    angle: f64,
    anchor: Point,
}

impl Default for TwoPointerAngleDetector {
    fn default() -> Self {
        Self {
            pair: PointerPair::default(),
            angle: f64::NAN,
            anchor: Point::ZERO,
        }
    }
}

impl TwoPointerAngleDetector {
    /// Create an idle detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a pair is being tracked.
    pub fn in_progress(&self) -> bool {
        self.pair.in_progress()
    }

    /// Feed one input. Returns a sample when the pair began, moved, or ended.
    pub fn update(&mut self, input: &GestureInput, edge_slop: f64) -> Option<AngleSample> {
        let phase = match self.pair.update(input, edge_slop) {
            PairEvent::None => return None,
            PairEvent::Began | PairEvent::Restarted => {
                self.angle = f64::NAN;
                DetectorPhase::Began
            }
            PairEvent::Moved => DetectorPhase::Changed,
            PairEvent::Ended => {
                self.angle = f64::NAN;
                return Some(AngleSample {
                    phase: DetectorPhase::Ended,
                    rotation: 0.0,
                    anchor: self.anchor,
                    time_delta: 0,
                });
            }
        };
        let (a, b) = self.pair.positions(input)?;
        let angle = -(b - a).atan2();
        let rotation = if self.angle.is_nan() {
            0.0
        } else {
            wrap(self.angle - angle)
        };
        self.angle = angle;
        self.anchor = a.midpoint(b);
        Some(AngleSample {
            phase,
            rotation,
            anchor: self.anchor,
            time_delta: self.pair.time_delta(),
        })
    }

    /// Forget the pair.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Fold an angle difference into (-π/2, π/2]. The pair defines a line, so a
/// half-turn jump is the pointers swapping sides rather than real rotation.
fn wrap(mut r: f64) -> f64 {
    if r > PI {
        r -= PI;
    } else if r <= -PI {
        r += PI;
    }
    if r > FRAC_PI_2 {
        r -= PI;
    } else if r <= -FRAC_PI_2 {
        r += PI;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerAction::*;
    use crate::testing::input;
    use core::f64::consts::FRAC_PI_6;
    use kurbo::Vec2;

    fn pair_at(degrees: f64) -> [(u32, f64, f64); 2] {
        let v = Vec2::from_angle(degrees.to_radians()) * 50.0;
        [(0, 200.0 - v.x, 200.0 - v.y), (1, 200.0 + v.x, 200.0 + v.y)]
    }

    #[test]
    fn clockwise_rotation_is_positive() {
        let mut d = TwoPointerAngleDetector::new();
        let p = pair_at(0.0);
        let _ = d.update(&input(Down, 0, &p[..1], 0), 0.0);
        let began = d.update(&input(PointerDown, 1, &p, 10), 0.0).unwrap();
        assert_eq!(began.phase, DetectorPhase::Began);
        assert_eq!(began.rotation, 0.0);

        let mut total = 0.0;
        for (i, deg) in [10.0, 20.0, 30.0].into_iter().enumerate() {
            let t = 10 + 16 * (i as u64 + 1);
            let s = d.update(&input(Move, 0, &pair_at(deg), t), 0.0).unwrap();
            assert_eq!(s.time_delta, 16);
            total += s.rotation;
        }
        assert!((total - FRAC_PI_6).abs() < 1e-9, "got {total}");
        assert!((d.anchor.x - 200.0).abs() < 1e-9);
    }

    #[test]
    fn wrap_stays_in_half_open_range() {
        for r in [-3.0 * PI / 2.0, -PI, -FRAC_PI_2, 0.0, FRAC_PI_2, PI, 1.9 * PI] {
            let w = wrap(r);
            assert!(w > -FRAC_PI_2 - 1e-12 && w <= FRAC_PI_2 + 1e-12, "{r} wrapped to {w}");
        }
        assert!((wrap(PI - 0.1) - (-0.1)).abs() < 1e-12, "swapped pointers are a small turn");
    }
}
