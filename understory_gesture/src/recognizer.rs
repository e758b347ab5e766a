// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recognizer configuration and the state-machine core shared by every gesture kind.
//!
//! A [`Recognizer`] bundles an identity, a [`Gesture`] strategy, behavior
//! [`RecognizerFlags`], optional [`HitSlop`], and the relations it declares. Hand it
//! to [`Orchestrator::register`](crate::orchestrator::Orchestrator::register) together
//! with the target it belongs to.
//!
//! ```
//! use understory_gesture::gestures::{PanConfig, TapConfig};
//! use understory_gesture::recognizer::{HitSlop, Recognizer, RecognizerFlags};
//! use understory_gesture::types::{GestureKind, RecognizerId};
//!
//! let tap = Recognizer::new(RecognizerId(1), TapConfig { number_of_taps: 2, ..TapConfig::default() })
//!     .with_hit_slop(HitSlop::uniform(8.0))
//!     .unwrap();
//! assert_eq!(tap.kind(), GestureKind::Tap);
//! assert!(tap.flags().contains(RecognizerFlags::CANCEL_WHEN_OUTSIDE));
//!
//! let pan = Recognizer::new(RecognizerId(2), PanConfig::default())
//!     .simultaneous_with([RecognizerId(1)]);
//! assert!(!pan.flags().contains(RecognizerFlags::CANCEL_WHEN_OUTSIDE));
//! ```

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect};
use smallvec::SmallVec;

use crate::error::GestureError;
use crate::gestures::{Gesture, GestureConfig};
use crate::input::{GestureInput, GesturePointer, PointerAction, PointerEvent};
use crate::types::{GestureData, GestureKind, PointerId, RecognizerId, State};

bitflags::bitflags! {
    /// Behavior switches of a recognizer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct RecognizerFlags: u8 {
        /// The recognizer takes part in hit testing and receives events.
        const ENABLED = 1 << 0;
        /// Leaving the target's bounds cancels an active recognizer and fails a began one.
        const CANCEL_WHEN_OUTSIDE = 1 << 1;
        /// Confirmed activation cancels competing recognizers that share a pointer.
        const CANCEL_OTHERS_ON_ACTIVATE = 1 << 2;
        /// Every other recognizer sharing a pointer waits for this one to fail.
        const REQUIRED_BY_OTHERS_TO_FAIL = 1 << 3;
        /// Once active or awaiting, other activations cannot cancel this recognizer.
        const DISALLOW_INTERRUPTION = 1 << 4;
        /// Passthrough only: activate on the first contact instead of beginning.
        const ACTIVATE_ON_FIRST_TOUCH = 1 << 5;
    }
}

impl RecognizerFlags {
    /// Defaults for a gesture kind.
    pub fn defaults_for(kind: GestureKind) -> Self {
        let base = Self::ENABLED | Self::CANCEL_OTHERS_ON_ACTIVATE;
        match kind {
            GestureKind::Tap | GestureKind::LongPress | GestureKind::Passthrough => {
                base | Self::CANCEL_WHEN_OUTSIDE
            }
            _ => base,
        }
    }
}

/// Extends (or reshapes) a target's bounds for the purpose of one recognizer.
///
/// Pads grow the bounds outward on one side. `width`/`height` fix the extent along an
/// axis, anchored to the padded side: with `left` set the box spans `width` to the
/// right of it, with `right` set it spans `width` to the left. Exactly one pad of an
/// axis must accompany a width or height.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HitSlop {
    /// Extra reach to the left.
    pub left: Option<f64>,
    /// Extra reach upward.
    pub top: Option<f64>,
    /// Extra reach to the right.
    pub right: Option<f64>,
    /// Extra reach downward.
    pub bottom: Option<f64>,
    /// Fixed horizontal extent.
    pub width: Option<f64>,
    /// Fixed vertical extent.
    pub height: Option<f64>,
}

impl HitSlop {
    /// The same pad on all four sides.
    pub fn uniform(pad: f64) -> Self {
        Self {
            left: Some(pad),
            top: Some(pad),
            right: Some(pad),
            bottom: Some(pad),
            width: None,
            height: None,
        }
    }

    /// Check the pad/extent combination.
    pub fn validate(&self) -> Result<(), GestureError> {
        let axis = |a: Option<f64>, b: Option<f64>, extent: Option<f64>, what| match extent {
            Some(_) if a.is_some() && b.is_some() => Err(GestureError::InvalidHitSlop(what)),
            Some(_) if a.is_none() && b.is_none() => Err(GestureError::InvalidHitSlop(what)),
            _ => Ok(()),
        };
        axis(
            self.left,
            self.right,
            self.width,
            "width needs exactly one of left or right",
        )?;
        axis(
            self.top,
            self.bottom,
            self.height,
            "height needs exactly one of top or bottom",
        )
    }

    /// Apply to `bounds`.
    pub fn apply(&self, bounds: Rect) -> Rect {
        let mut r = bounds;
        if let Some(pad) = self.left {
            r.x0 -= pad;
        }
        if let Some(pad) = self.top {
            r.y0 -= pad;
        }
        if let Some(pad) = self.right {
            r.x1 += pad;
        }
        if let Some(pad) = self.bottom {
            r.y1 += pad;
        }
        if let Some(w) = self.width {
            if self.left.is_none() {
                r.x0 = r.x1 - w;
            } else if self.right.is_none() {
                r.x1 = r.x0 + w;
            }
        }
        if let Some(h) = self.height {
            if self.top.is_none() {
                r.y0 = r.y1 - h;
            } else if self.bottom.is_none() {
                r.y1 = r.y0 + h;
            }
        }
        r
    }
}

/// Serializable description of a recognizer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecognizerDescriptor {
    /// Identity tag.
    pub id: RecognizerId,
    /// Gesture kind and its thresholds.
    pub gesture: GestureConfig,
    /// Behavior flags; the kind's defaults when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: Option<RecognizerFlags>,
    /// Optional bounds extension.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hit_slop: Option<HitSlop>,
    /// Recognizers this one waits for.
    #[cfg_attr(feature = "serde", serde(default))]
    pub wait_for: Vec<RecognizerId>,
    /// Recognizers this one may be active with.
    #[cfg_attr(feature = "serde", serde(default))]
    pub simultaneous_with: Vec<RecognizerId>,
    /// Recognizers that must wait for this one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub blocks: Vec<RecognizerId>,
}

/// A configured recognizer, ready to be registered.
#[derive(Clone, Debug)]
pub struct Recognizer {
    pub(crate) id: RecognizerId,
    pub(crate) gesture: Gesture,
    pub(crate) flags: RecognizerFlags,
    pub(crate) hit_slop: Option<HitSlop>,
    pub(crate) wait_for: Vec<RecognizerId>,
    pub(crate) simultaneous_with: Vec<RecognizerId>,
    pub(crate) blocks: Vec<RecognizerId>,
}

impl Recognizer {
    /// Create a recognizer with the default flags of the gesture's kind.
    pub fn new(id: RecognizerId, gesture: impl Into<Gesture>) -> Self {
        let gesture = gesture.into();
        Self {
            id,
            flags: RecognizerFlags::defaults_for(gesture.kind()),
            gesture,
            hit_slop: None,
            wait_for: Vec::new(),
            simultaneous_with: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Build from a descriptor, validating the hit slop.
    pub fn from_descriptor(descriptor: RecognizerDescriptor) -> Result<Self, GestureError> {
        let mut recognizer = Self::new(descriptor.id, descriptor.gesture);
        if let Some(flags) = descriptor.flags {
            recognizer.flags = flags;
        }
        if let Some(slop) = descriptor.hit_slop {
            recognizer = recognizer.with_hit_slop(slop)?;
        }
        recognizer.wait_for = descriptor.wait_for;
        recognizer.simultaneous_with = descriptor.simultaneous_with;
        recognizer.blocks = descriptor.blocks;
        Ok(recognizer)
    }

    /// Identity tag.
    pub fn id(&self) -> RecognizerId {
        self.id
    }

    /// Gesture kind.
    pub fn kind(&self) -> GestureKind {
        self.gesture.kind()
    }

    /// Behavior flags.
    pub fn flags(&self) -> RecognizerFlags {
        self.flags
    }

    /// Replace all flags.
    pub fn with_flags(mut self, flags: RecognizerFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set or clear individual flags.
    pub fn set_flags(mut self, flags: RecognizerFlags, on: bool) -> Self {
        self.flags.set(flags, on);
        self
    }

    /// Attach a validated hit slop.
    pub fn with_hit_slop(mut self, slop: HitSlop) -> Result<Self, GestureError> {
        slop.validate()?;
        self.hit_slop = Some(slop);
        Ok(self)
    }

    /// Declare recognizers this one waits for.
    pub fn wait_for(mut self, ids: impl IntoIterator<Item = RecognizerId>) -> Self {
        self.wait_for.extend(ids);
        self
    }

    /// Declare recognizers this one may be active with.
    pub fn simultaneous_with(mut self, ids: impl IntoIterator<Item = RecognizerId>) -> Self {
        self.simultaneous_with.extend(ids);
        self
    }

    /// Declare recognizers that must wait for this one.
    pub fn blocks(mut self, ids: impl IntoIterator<Item = RecognizerId>) -> Self {
        self.blocks.extend(ids);
        self
    }
}

/// State-machine core of a registered recognizer.
///
/// The orchestrator owns it and applies transitions; the gesture strategy lives
/// next to it in the same slot.
#[derive(Clone, Debug)]
pub(crate) struct RecognizerCore<K> {
    pub(crate) id: RecognizerId,
    pub(crate) kind: GestureKind,
    pub(crate) flags: RecognizerFlags,
    pub(crate) hit_slop: Option<HitSlop>,
    /// Target the recognizer was registered for.
    pub(crate) owner: K,
    /// Set while attached to a stream.
    pub(crate) target: Option<K>,
    pub(crate) state: State,
    pub(crate) position: Point,
    pub(crate) pointer_count: usize,
    pub(crate) tracked: SmallVec<[PointerId; 4]>,
    /// Every pointer tracked since attaching, lifted ones included.
    pub(crate) touched: SmallVec<[PointerId; 4]>,
    pub(crate) data: GestureData,
    pub(crate) is_active: bool,
    pub(crate) is_awaiting: bool,
    pub(crate) activation_index: u64,
    /// Strategy hooks to replay once the strategy is back in its slot.
    pub(crate) deferred: SmallVec<[(State, State); 2]>,
}

impl<K: Copy + PartialEq> RecognizerCore<K> {
    pub(crate) fn new(recognizer: &Recognizer, owner: K) -> Self {
        Self {
            id: recognizer.id,
            kind: recognizer.gesture.kind(),
            flags: recognizer.flags,
            hit_slop: recognizer.hit_slop,
            owner,
            target: None,
            state: State::Undetermined,
            position: Point::ZERO,
            pointer_count: 0,
            tracked: SmallVec::new(),
            touched: SmallVec::new(),
            data: GestureData::None,
            is_active: false,
            is_awaiting: false,
            activation_index: u64::MAX,
            deferred: SmallVec::new(),
        }
    }

    /// Bind to a target for a new stream.
    pub(crate) fn attach(&mut self, target: K) -> Result<(), GestureError> {
        if self.target.is_some() {
            return Err(GestureError::AlreadyAttached(self.id));
        }
        self.target = Some(target);
        self.state = State::Undetermined;
        self.tracked.clear();
        self.touched.clear();
        self.data = GestureData::None;
        Ok(())
    }

    /// Return to a detached, undetermined recognizer.
    pub(crate) fn reset(&mut self) -> Result<(), GestureError> {
        if !self.state.is_finished() && self.target.is_some() {
            return Err(GestureError::NotTerminal(self.id));
        }
        self.target = None;
        self.state = State::Undetermined;
        self.position = Point::ZERO;
        self.pointer_count = 0;
        self.tracked.clear();
        self.touched.clear();
        self.data = GestureData::None;
        self.is_active = false;
        self.is_awaiting = false;
        self.activation_index = u64::MAX;
        self.deferred.clear();
        Ok(())
    }

    pub(crate) fn enabled(&self) -> bool {
        self.flags.contains(RecognizerFlags::ENABLED)
    }

    pub(crate) fn wants_events(&self) -> bool {
        self.enabled() && !self.state.is_finished() && !self.tracked.is_empty()
    }

    pub(crate) fn track(&mut self, pointer: PointerId) {
        if !self.tracked.contains(&pointer) {
            self.tracked.push(pointer);
        }
        if !self.touched.contains(&pointer) {
            self.touched.push(pointer);
        }
    }

    pub(crate) fn untrack(&mut self, pointer: PointerId) {
        self.tracked.retain(|p| *p != pointer);
    }

    /// Whether both recognizers have tracked a common pointer during this stream.
    pub(crate) fn shares_pointer_with(&self, other: &Self) -> bool {
        self.touched.iter().any(|p| other.touched.contains(p))
    }

    pub(crate) fn is_within_bounds(&self, point: Point, bounds: Rect) -> bool {
        let r = match &self.hit_slop {
            Some(slop) => slop.apply(bounds),
            None => bounds,
        };
        point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
    }

    /// Build this recognizer's view of a raw event.
    pub(crate) fn adapt(&self, event: &PointerEvent, to_local: Affine, viewport: Rect) -> GestureInput {
        let pointers: SmallVec<[GesturePointer; 4]> = event
            .pointers
            .iter()
            .filter(|p| self.tracked.contains(&p.id))
            .map(|p| GesturePointer {
                id: p.id,
                position: to_local * p.position,
                absolute: p.position,
            })
            .collect();
        let acting_tracked = self.tracked.contains(&event.pointer);
        let single = self.tracked.len() == 1;
        let action = match event.action {
            PointerAction::Down | PointerAction::PointerDown if !acting_tracked => PointerAction::Move,
            PointerAction::Down | PointerAction::PointerDown if single => PointerAction::Down,
            PointerAction::Down | PointerAction::PointerDown => PointerAction::PointerDown,
            PointerAction::Up | PointerAction::PointerUp if !acting_tracked => PointerAction::Move,
            PointerAction::Up | PointerAction::PointerUp if single => PointerAction::Up,
            PointerAction::Up | PointerAction::PointerUp => PointerAction::PointerUp,
            other => other,
        };
        GestureInput {
            action,
            pointer: event.pointer,
            pointers,
            time: event.time,
            viewport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gestures::TapConfig;
    use crate::input::PointerStream;

    fn core() -> RecognizerCore<u32> {
        RecognizerCore::new(&Recognizer::new(RecognizerId(9), TapConfig::default()), 1)
    }

    #[test]
    fn attach_twice_is_an_error() {
        let mut c = core();
        c.attach(1).unwrap();
        assert_eq!(c.attach(1), Err(GestureError::AlreadyAttached(RecognizerId(9))));
        assert_eq!(c.reset(), Err(GestureError::NotTerminal(RecognizerId(9))));
        c.state = State::Failed;
        c.reset().unwrap();
        c.attach(1).unwrap();
    }

    #[test]
    fn hit_slop_extends_and_reshapes_bounds() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(
            HitSlop::uniform(10.0).apply(bounds),
            Rect::new(-10.0, -10.0, 110.0, 60.0)
        );
        let anchored = HitSlop {
            left: Some(5.0),
            width: Some(20.0),
            ..HitSlop::default()
        };
        anchored.validate().unwrap();
        assert_eq!(anchored.apply(bounds), Rect::new(-5.0, 0.0, 15.0, 50.0));

        let bad = HitSlop {
            width: Some(20.0),
            ..HitSlop::default()
        };
        assert!(matches!(bad.validate(), Err(GestureError::InvalidHitSlop(_))));
    }

    #[test]
    fn adapt_rewrites_actions_for_tracked_pointers() {
        let mut c = core();
        c.attach(1).unwrap();
        c.track(PointerId(0));
        let mut s = PointerStream::new();
        let down = s.down(PointerId(0), Point::new(10.0, 10.0), 0);
        let other = s.down(PointerId(1), Point::new(90.0, 10.0), 5);
        let to_local = Affine::translate((-10.0, 0.0));
        let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);

        let a = c.adapt(&down, to_local, viewport);
        assert_eq!(a.action, PointerAction::Down);
        assert_eq!(a.pointers[0].position, Point::new(0.0, 10.0));
        assert_eq!(a.pointers[0].absolute, Point::new(10.0, 10.0));

        let b = c.adapt(&other, to_local, viewport);
        assert_eq!(b.action, PointerAction::Move, "untracked pointer landing is a move");
        assert_eq!(b.pointer_count(), 1);

        let up = s.up(PointerId(0), 9);
        assert_eq!(up.action, PointerAction::PointerUp);
        assert_eq!(
            c.adapt(&up, to_local, viewport).action,
            PointerAction::Up,
            "last tracked pointer lifting ends the recognizer's stream"
        );
    }
}
