// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Windowed velocity estimate for dragging gestures.

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

/// Samples older than this, relative to the newest one, are ignored.
const HORIZON_MS: u64 = 100;
const MAX_SAMPLES: usize = 20;

/// Estimates pointer velocity from recent position samples.
///
/// The estimate is the displacement between the oldest and newest sample inside a
/// short window divided by their time difference, in units per millisecond.
#[derive(Clone, Debug, Default)]
pub struct VelocityTracker {
    samples: SmallVec<[(u64, Point); MAX_SAMPLES]>,
}

impl VelocityTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample. Samples must arrive in non-decreasing time order.
    pub fn add(&mut self, time: u64, position: Point) {
        if self.samples.len() == MAX_SAMPLES {
            self.samples.remove(0);
        }
        self.samples.push((time, position));
        let newest = time;
        let keep_from = self
            .samples
            .iter()
            .position(|(t, _)| newest.saturating_sub(*t) <= HORIZON_MS)
            .unwrap_or(0);
        if keep_from > 0 {
            self.samples.drain(..keep_from);
        }
    }

    /// Shift every stored sample by `delta`, for when the tracked point jumps
    /// without the pointer moving (a pointer joins or leaves an averaged set).
    pub fn offset(&mut self, delta: Vec2) {
        for (_, p) in &mut self.samples {
            *p += delta;
        }
    }

    /// Current estimate; zero with fewer than two samples or no elapsed time.
    #[allow(
        clippy::cast_precision_loss,
        reason = "Sample windows are at most a few hundred milliseconds."
    )]
    pub fn velocity(&self) -> Vec2 {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.first(), self.samples.last())
        else {
            return Vec2::ZERO;
        };
        if t1 <= t0 {
            return Vec2::ZERO;
        }
        (p1 - p0) / (t1 - t0) as f64
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_motion() {
        let mut v = VelocityTracker::new();
        for i in 0..5_u32 {
            v.add(u64::from(i) * 10, Point::new(f64::from(i) * 20.0, 0.0));
        }
        assert!((v.velocity().x - 2.0).abs() < 1e-9, "got {:?}", v.velocity());
        assert_eq!(v.velocity().y, 0.0);
    }

    #[test]
    fn stale_samples_fall_out_of_window() {
        let mut v = VelocityTracker::new();
        v.add(0, Point::new(0.0, 0.0));
        v.add(500, Point::new(1000.0, 0.0));
        assert_eq!(v.velocity(), Vec2::ZERO, "single in-window sample has no velocity");
        v.add(510, Point::new(1010.0, 0.0));
        assert!((v.velocity().x - 1.0).abs() < 1e-9);
    }
}
