// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw pointer events and the per-recognizer view of them.
//!
//! The orchestrator consumes [`PointerEvent`]s in root coordinates. Each recognizer
//! receives a [`GestureInput`] instead: only the pointers it tracks, with positions
//! mapped into its target's local space, and an action rewritten relative to
//! those pointers (a second finger landing on another target is a plain move for
//! a recognizer that does not track it).
//!
//! [`PointerStream`] builds well-formed raw events from per-pointer calls:
//!
//! ```
//! use kurbo::Point;
//! use understory_gesture::input::{PointerAction, PointerStream};
//! use understory_gesture::types::PointerId;
//!
//! let mut stream = PointerStream::new();
//! let a = stream.down(PointerId(0), Point::new(10.0, 10.0), 0);
//! let b = stream.down(PointerId(1), Point::new(30.0, 10.0), 5);
//! assert_eq!(a.action, PointerAction::Down);
//! assert_eq!(b.action, PointerAction::PointerDown);
//! assert_eq!(b.pointers.len(), 2);
//!
//! let c = stream.up(PointerId(0), 20);
//! let d = stream.up(PointerId(1), 25);
//! assert_eq!(c.action, PointerAction::PointerUp);
//! assert_eq!(d.action, PointerAction::Up);
//! ```

use kurbo::{Point, Rect, Vec2};
use smallvec::SmallVec;

use crate::types::PointerId;

/// What happened to the acting pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerAction {
    /// First pointer of a stream made contact.
    Down,
    /// An additional pointer made contact.
    PointerDown,
    /// One or more pointers moved.
    Move,
    /// A pointer lifted while others remain.
    PointerUp,
    /// The last pointer lifted.
    Up,
    /// The stream was aborted by the platform.
    Cancel,
}

impl PointerAction {
    /// `Down` or `PointerDown`.
    pub const fn is_down(self) -> bool {
        matches!(self, Self::Down | Self::PointerDown)
    }

    /// `Up` or `PointerUp`.
    pub const fn is_up(self) -> bool {
        matches!(self, Self::Up | Self::PointerUp)
    }
}

/// One pointer in contact, in root coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pointer {
    /// Pointer identity.
    pub id: PointerId,
    /// Root-space position.
    pub position: Point,
}

/// A raw event in the root coordinate space.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// What happened.
    pub action: PointerAction,
    /// The pointer the action refers to. For moves this is the first pointer.
    pub pointer: PointerId,
    /// Every pointer in contact, including the lifting pointer on up actions.
    pub pointers: SmallVec<[Pointer; 4]>,
    /// Monotonic timestamp in milliseconds.
    pub time: u64,
}

impl PointerEvent {
    /// Root position of `id`, if it is part of this event.
    pub fn position_of(&self, id: PointerId) -> Option<Point> {
        self.pointers.iter().find(|p| p.id == id).map(|p| p.position)
    }
}

/// Builds consistent raw events from per-pointer operations.
///
/// Picks `Down`/`PointerDown` and `PointerUp`/`Up` based on how many pointers are
/// in contact, and keeps every pointer's last position so moves of one pointer
/// still report the others.
#[derive(Clone, Debug, Default)]
pub struct PointerStream {
    active: SmallVec<[Pointer; 4]>,
}

impl PointerStream {
    /// Create a stream with no pointers in contact.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointers currently in contact.
    pub fn pointers(&self) -> &[Pointer] {
        &self.active
    }

    /// A pointer makes contact.
    pub fn down(&mut self, id: PointerId, position: Point, time: u64) -> PointerEvent {
        self.active.retain(|p| p.id != id);
        let action = if self.active.is_empty() {
            PointerAction::Down
        } else {
            PointerAction::PointerDown
        };
        self.active.push(Pointer { id, position });
        self.event(action, id, time)
    }

    /// A single pointer moves to `position`.
    pub fn move_to(&mut self, id: PointerId, position: Point, time: u64) -> PointerEvent {
        self.move_many(&[(id, position)], time)
    }

    /// Several pointers move in one event.
    pub fn move_many(&mut self, moves: &[(PointerId, Point)], time: u64) -> PointerEvent {
        for &(id, position) in moves {
            if let Some(p) = self.active.iter_mut().find(|p| p.id == id) {
                p.position = position;
            }
        }
        let first = moves
            .first()
            .map(|&(id, _)| id)
            .or_else(|| self.active.first().map(|p| p.id))
            .unwrap_or(PointerId(0));
        self.event(PointerAction::Move, first, time)
    }

    /// Shift every pointer in contact by `delta`.
    pub fn translate_all(&mut self, delta: Vec2, time: u64) -> PointerEvent {
        for p in &mut self.active {
            p.position += delta;
        }
        let first = self.active.first().map(|p| p.id).unwrap_or(PointerId(0));
        self.event(PointerAction::Move, first, time)
    }

    /// A pointer lifts. The returned event still lists it.
    pub fn up(&mut self, id: PointerId, time: u64) -> PointerEvent {
        let action = if self.active.len() <= 1 {
            PointerAction::Up
        } else {
            PointerAction::PointerUp
        };
        let event = self.event(action, id, time);
        self.active.retain(|p| p.id != id);
        event
    }

    /// The platform aborts the stream.
    pub fn cancel(&mut self, time: u64) -> PointerEvent {
        let first = self.active.first().map(|p| p.id).unwrap_or(PointerId(0));
        let event = self.event(PointerAction::Cancel, first, time);
        self.active.clear();
        event
    }

    fn event(&self, action: PointerAction, pointer: PointerId, time: u64) -> PointerEvent {
        PointerEvent {
            action,
            pointer,
            pointers: self.active.clone(),
            time,
        }
    }
}

/// A tracked pointer as seen by one recognizer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GesturePointer {
    /// Pointer identity.
    pub id: PointerId,
    /// Position in the recognizer's target-local space.
    pub position: Point,
    /// Position in root space. Unaffected by the target moving under the pointer.
    pub absolute: Point,
}

/// An event as delivered to one recognizer.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureInput {
    /// Action relative to the recognizer's tracked pointers.
    pub action: PointerAction,
    /// The acting pointer.
    pub pointer: PointerId,
    /// Tracked pointers in contact, including the lifting pointer on up actions.
    pub pointers: SmallVec<[GesturePointer; 4]>,
    /// Monotonic timestamp in milliseconds.
    pub time: u64,
    /// Root bounds, used for edge slop.
    pub viewport: Rect,
}

impl GestureInput {
    /// Number of tracked pointers in this event.
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// The tracked pointer with identity `id`.
    pub fn find(&self, id: PointerId) -> Option<&GesturePointer> {
        self.pointers.iter().find(|p| p.id == id)
    }

    /// Position of the last pointer still in contact, or the average of all such
    /// pointers when `average` is set. The lifting pointer of a `PointerUp` is excluded.
    pub fn last_position(&self, average: bool) -> Point {
        self.reduce(average, |p| p.position)
    }

    /// Same as [`last_position`](Self::last_position) in root space.
    pub fn last_absolute(&self, average: bool) -> Point {
        self.reduce(average, |p| p.absolute)
    }

    fn reduce(&self, average: bool, pick: impl Fn(&GesturePointer) -> Point) -> Point {
        let skip = (self.action == PointerAction::PointerUp).then_some(self.pointer);
        let mut remaining = self.pointers.iter().filter(|p| Some(p.id) != skip);
        if !average {
            return remaining
                .next_back()
                .or_else(|| self.pointers.last())
                .map(&pick)
                .unwrap_or(Point::ZERO);
        }
        let mut sum = Vec2::ZERO;
        let mut n = 0_u32;
        for p in remaining {
            sum += pick(p).to_vec2();
            n += 1;
        }
        if n == 0 {
            return self.pointers.last().map(&pick).unwrap_or(Point::ZERO);
        }
        (sum / f64::from(n)).to_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn gp(id: u32, x: f64, y: f64) -> GesturePointer {
        GesturePointer {
            id: PointerId(id),
            position: Point::new(x, y),
            absolute: Point::new(x + 100.0, y),
        }
    }

    #[test]
    fn last_position_skips_lifting_pointer() {
        let input = GestureInput {
            action: PointerAction::PointerUp,
            pointer: PointerId(1),
            pointers: smallvec![gp(0, 0.0, 0.0), gp(1, 10.0, 0.0)],
            time: 0,
            viewport: Rect::ZERO,
        };
        assert_eq!(input.last_position(false), Point::new(0.0, 0.0));
        assert_eq!(input.last_position(true), Point::new(0.0, 0.0));
        assert_eq!(input.last_absolute(false), Point::new(100.0, 0.0));
    }

    #[test]
    fn average_position() {
        let input = GestureInput {
            action: PointerAction::Move,
            pointer: PointerId(0),
            pointers: smallvec![gp(0, 0.0, 0.0), gp(1, 10.0, 20.0)],
            time: 0,
            viewport: Rect::ZERO,
        };
        assert_eq!(input.last_position(true), Point::new(5.0, 10.0));
        assert_eq!(input.last_position(false), Point::new(10.0, 20.0));
    }

    #[test]
    fn stream_keeps_other_pointer_positions() {
        let mut s = PointerStream::new();
        let _ = s.down(PointerId(0), Point::new(1.0, 1.0), 0);
        let _ = s.down(PointerId(1), Point::new(5.0, 5.0), 1);
        let ev = s.move_to(PointerId(1), Point::new(6.0, 5.0), 2);
        assert_eq!(ev.position_of(PointerId(0)), Some(Point::new(1.0, 1.0)));
        assert_eq!(ev.position_of(PointerId(1)), Some(Point::new(6.0, 5.0)));
        let cancel = s.cancel(3);
        assert_eq!(cancel.action, PointerAction::Cancel);
        assert!(s.pointers().is_empty(), "cancel clears the stream");
    }
}
