// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-pointer detectors used by pinch and rotation.
//!
//! Both detectors follow a designated pair of pointers through a stream. The pair is
//! elected by [`PointerPair`]: the first pointer down and the next one to join. While a
//! pointer of the pair lies within the edge slop of the viewport the sample is
//! *sloppy* and the segment does not start; another pointer in contact replaces it
//! when one is available. When a pointer of a running pair lifts, a remaining
//! pointer becomes the new partner and the segment restarts, or the segment ends.

mod angle;
mod span;

pub use angle::{AngleSample, TwoPointerAngleDetector};
pub use span::{SpanSample, TwoPointerSpanDetector};

use kurbo::{Point, Rect};

use crate::input::{GestureInput, PointerAction};
use crate::types::PointerId;

/// Where a detector sample sits in its segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DetectorPhase {
    /// A pair was elected (first time or after re-election). Deltas are zero.
    Began,
    /// The pair moved.
    Changed,
    /// The pair was lost and no replacement exists.
    Ended,
}

/// What an input did to the pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum PairEvent {
    None,
    Began,
    Moved,
    Restarted,
    Ended,
}

/// Election and timing of the tracked pointer pair.
#[derive(Clone, Debug, Default)]
pub(crate) struct PointerPair {
    first: Option<PointerId>,
    second: Option<PointerId>,
    in_progress: bool,
    prev_time: u64,
    curr_time: u64,
}

impl PointerPair {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Milliseconds between the previous and the current sample.
    pub(crate) fn time_delta(&self) -> u64 {
        self.curr_time.saturating_sub(self.prev_time)
    }

    /// Local positions of the pair in `input`.
    pub(crate) fn positions(&self, input: &GestureInput) -> Option<(Point, Point)> {
        let a = input.find(self.first?)?;
        let b = input.find(self.second?)?;
        Some((a.position, b.position))
    }

    pub(crate) fn update(&mut self, input: &GestureInput, edge_slop: f64) -> PairEvent {
        match input.action {
            PointerAction::Down => {
                self.reset();
                self.first = Some(input.pointer);
                PairEvent::None
            }
            PointerAction::PointerDown if self.in_progress => self.moved(input),
            PointerAction::PointerDown => {
                if self.first.is_none_or(|id| input.find(id).is_none()) {
                    self.first = input
                        .pointers
                        .iter()
                        .map(|p| p.id)
                        .find(|id| *id != input.pointer);
                }
                if self.second.is_none_or(|id| input.find(id).is_none()) {
                    self.second = Some(input.pointer);
                }
                self.try_start(input, edge_slop)
            }
            PointerAction::Move if self.in_progress => self.moved(input),
            PointerAction::Move => self.try_start(input, edge_slop),
            PointerAction::PointerUp => self.lifted(input, edge_slop),
            PointerAction::Up | PointerAction::Cancel => {
                let was = self.in_progress;
                self.reset();
                if was {
                    PairEvent::Ended
                } else {
                    PairEvent::None
                }
            }
        }
    }

    fn moved(&mut self, input: &GestureInput) -> PairEvent {
        if self.positions(input).is_none() {
            return PairEvent::None;
        }
        self.prev_time = self.curr_time;
        self.curr_time = input.time;
        PairEvent::Moved
    }

    fn try_start(&mut self, input: &GestureInput, edge_slop: f64) -> PairEvent {
        if input.pointer_count() < 2 {
            return PairEvent::None;
        }
        if self.first.is_none_or(|id| input.find(id).is_none()) {
            self.first = None;
        }
        if self.second.is_none_or(|id| input.find(id).is_none()) {
            self.second = None;
        }
        if self.first.is_none_or(|id| is_sloppy(input, id, edge_slop)) {
            self.first = elect(input, &[self.second], edge_slop);
        }
        if self.second.is_none_or(|id| is_sloppy(input, id, edge_slop)) {
            self.second = elect(input, &[self.first], edge_slop);
        }
        if self.first.is_some() && self.second.is_some() {
            self.in_progress = true;
            self.prev_time = input.time;
            self.curr_time = input.time;
            log::trace!("pointer pair elected: {:?} {:?}", self.first, self.second);
            PairEvent::Began
        } else {
            PairEvent::None
        }
    }

    fn lifted(&mut self, input: &GestureInput, edge_slop: f64) -> PairEvent {
        let lifted = Some(input.pointer);
        let slot = if self.first == lifted {
            &mut self.first
        } else if self.second == lifted {
            &mut self.second
        } else {
            return if self.in_progress {
                self.moved(input)
            } else {
                PairEvent::None
            };
        };
        *slot = None;
        let partner = self.first.or(self.second);
        let replacement = elect(input, &[lifted, partner], edge_slop);
        if self.first.is_none() {
            self.first = replacement;
        } else {
            self.second = replacement;
        }
        if !self.in_progress {
            return PairEvent::None;
        }
        if replacement.is_some() {
            self.prev_time = input.time;
            self.curr_time = input.time;
            log::trace!("pointer pair re-elected: {:?} {:?}", self.first, self.second);
            PairEvent::Restarted
        } else {
            self.in_progress = false;
            PairEvent::Ended
        }
    }
}

fn is_sloppy(input: &GestureInput, id: PointerId, edge_slop: f64) -> bool {
    if edge_slop <= 0.0 {
        return false;
    }
    input
        .find(id)
        .is_some_and(|p| near_edge(p.absolute, input.viewport, edge_slop))
}

fn near_edge(p: Point, viewport: Rect, slop: f64) -> bool {
    p.x < viewport.x0 + slop
        || p.y < viewport.y0 + slop
        || p.x > viewport.x1 - slop
        || p.y > viewport.y1 - slop
}

/// First pointer in contact that is neither excluded nor sloppy.
fn elect(input: &GestureInput, exclude: &[Option<PointerId>], edge_slop: f64) -> Option<PointerId> {
    let skip = (input.action == PointerAction::PointerUp).then_some(input.pointer);
    input
        .pointers
        .iter()
        .map(|p| p.id)
        .filter(|id| Some(*id) != skip && !exclude.contains(&Some(*id)))
        .find(|id| !is_sloppy(input, *id, edge_slop))
}
