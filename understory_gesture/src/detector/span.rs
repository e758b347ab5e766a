// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

use super::{DetectorPhase, PairEvent, PointerPair};
use crate::input::GestureInput;

/// One span measurement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpanSample {
    /// Segment phase.
    pub phase: DetectorPhase,
    /// Distance between the pair now.
    pub span: f64,
    /// Distance at the previous sample.
    pub previous_span: f64,
    /// Midpoint of the pair, target-local.
    pub focus: Point,
    /// Milliseconds since the previous sample.
    pub time_delta: u64,
}

impl SpanSample {
    /// `span / previous_span`, or 1 when the previous span was zero.
    pub fn scale_factor(&self) -> f64 {
        if self.previous_span > 0.0 {
            self.span / self.previous_span
        } else {
            1.0
        }
    }
}

/// Tracks the distance between two pointers.
#[derive(Clone, Debug, Default)]
pub struct TwoPointerSpanDetector {
    pair: PointerPair,
    span: f64,
    focus: Point,
}

impl TwoPointerSpanDetector {
    /// Create an idle detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a pair is being tracked.
    pub fn in_progress(&self) -> bool {
        self.pair.in_progress()
    }

    /// Feed one input. Returns a sample when the pair began, moved, or ended.
    pub fn update(&mut self, input: &GestureInput, edge_slop: f64) -> Option<SpanSample> {
        let phase = match self.pair.update(input, edge_slop) {
            PairEvent::None => return None,
            PairEvent::Began | PairEvent::Restarted => DetectorPhase::Began,
            PairEvent::Moved => DetectorPhase::Changed,
            PairEvent::Ended => {
                return Some(SpanSample {
                    phase: DetectorPhase::Ended,
                    span: self.span,
                    previous_span: self.span,
                    focus: self.focus,
                    time_delta: 0,
                });
            }
        };
        let (a, b) = self.pair.positions(input)?;
        let span = (b - a).hypot();
        let previous_span = match phase {
            DetectorPhase::Began => span,
            _ => self.span,
        };
        self.span = span;
        self.focus = a.midpoint(b);
        if phase == DetectorPhase::Began {
            log::trace!("span segment began at {span}");
        }
        Some(SpanSample {
            phase,
            span,
            previous_span,
            focus: self.focus,
            time_delta: self.pair.time_delta(),
        })
    }

    /// Forget the pair.
    pub fn reset(&mut self) {
        self.pair.reset();
        self.span = 0.0;
        self.focus = Point::ZERO;
    }
}
