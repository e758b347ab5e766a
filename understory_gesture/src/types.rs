// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core identifiers, recognizer states, and exposed gesture data.

use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use kurbo::{Point, Vec2};

use crate::error::GestureError;

/// Caller-assigned identity tag of a recognizer.
///
/// Tags are unique per [`Orchestrator`](crate::orchestrator::Orchestrator) and are the keys
/// used by the [`InteractionRegistry`](crate::relations::InteractionRegistry).
///
/// Tags parse from their decimal form, which is how relation lists are usually written:
///
/// ```
/// use understory_gesture::types::RecognizerId;
///
/// let id: RecognizerId = " 42 ".parse().unwrap();
/// assert_eq!(id, RecognizerId(42));
/// assert!("tap".parse::<RecognizerId>().is_err());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecognizerId(pub u32);

impl fmt::Display for RecognizerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for RecognizerId {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .map(Self)
            .map_err(|_| GestureError::MalformedTag(s.to_string()))
    }
}

/// Identity of one pointer (finger, pen, mouse button) within a raw event stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointerId(pub u32);

/// Recognition state of a recognizer.
///
/// ```text
/// Undetermined ──► Began ──► Active ──► End
///      │  └───────────┴────────┴──► Cancelled | Failed
///      └──────────────────────► Active
/// ```
///
/// `End`, `Cancelled`, and `Failed` are terminal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum State {
    /// Initial state; nothing has been decided yet.
    #[default]
    Undetermined,
    /// The recognizer has seen a plausible start.
    Began,
    /// The recognizer's activation condition is met.
    Active,
    /// The gesture completed.
    End,
    /// The gesture was cancelled, usually by a competing recognizer.
    Cancelled,
    /// The input did not match the gesture.
    Failed,
}

impl State {
    /// Returns `true` for the terminal states `End`, `Cancelled`, and `Failed`.
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::End | Self::Cancelled | Self::Failed)
    }
}

/// A requested state transition.
///
/// Transitions are guarded: requesting one whose source state does not match is ignored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// `Undetermined → Began`.
    Begin,
    /// `Undetermined | Began → Active`.
    Activate,
    /// `Active → End`.
    End,
    /// `Undetermined | Began | Active → Cancelled`.
    Cancel,
    /// `Undetermined | Began | Active → Failed`.
    Fail,
}

impl Transition {
    /// The state this transition leads to.
    pub const fn target(self) -> State {
        match self {
            Self::Begin => State::Began,
            Self::Activate => State::Active,
            Self::End => State::End,
            Self::Cancel => State::Cancelled,
            Self::Fail => State::Failed,
        }
    }

    /// Whether the transition may be taken from `from`.
    pub const fn applies_to(self, from: State) -> bool {
        match self {
            Self::Begin => matches!(from, State::Undetermined),
            Self::Activate => matches!(from, State::Undetermined | State::Began),
            Self::End => matches!(from, State::Active),
            Self::Cancel | Self::Fail => {
                matches!(from, State::Undetermined | State::Began | State::Active)
            }
        }
    }
}

/// Discriminates the gesture variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GestureKind {
    /// Forwards the stream to a native control.
    Passthrough,
    /// One or more quick contacts.
    Tap,
    /// A contact held in place.
    LongPress,
    /// A dragging contact.
    Pan,
    /// A quick directional swipe.
    Fling,
    /// Two pointers changing their distance.
    Pinch,
    /// Two pointers changing their angle.
    Rotation,
}

impl GestureKind {
    /// Canonical lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::Tap => "tap",
            Self::LongPress => "long_press",
            Self::Pan => "pan",
            Self::Fling => "fling",
            Self::Pinch => "pinch",
            Self::Rotation => "rotation",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GestureKind {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "passthrough" | "native" => Self::Passthrough,
            "tap" => Self::Tap,
            "long_press" | "longPress" => Self::LongPress,
            "pan" => Self::Pan,
            "fling" => Self::Fling,
            "pinch" => Self::Pinch,
            "rotation" => Self::Rotation,
            other => return Err(GestureError::UnknownGestureKind(other.to_string())),
        })
    }
}

/// Derived data a recognizer exposes to listeners.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum GestureData {
    /// No data beyond the state (passthrough, fling).
    #[default]
    None,
    /// Tap count reached so far.
    Tap {
        /// Number of completed taps.
        taps: u32,
    },
    /// Time the contact has been held.
    LongPress {
        /// Milliseconds since the contact started.
        duration_ms: u64,
    },
    /// Drag progress.
    Pan {
        /// Accumulated translation in target-local units.
        translation: Vec2,
        /// Estimated velocity in root units per millisecond.
        velocity: Vec2,
    },
    /// Two-pointer scaling.
    Pinch {
        /// Current span over the span at gesture start.
        scale: f64,
        /// Scale change per millisecond.
        velocity: f64,
        /// Midpoint between the tracked pointers, target-local.
        focal_point: Point,
    },
    /// Two-pointer rotation.
    Rotation {
        /// Accumulated rotation in radians, clockwise positive.
        rotation: f64,
        /// Radians per millisecond over the last sample.
        velocity: f64,
        /// Midpoint between the tracked pointers, target-local.
        anchor: Point,
    },
}
