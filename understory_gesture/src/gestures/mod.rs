// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture strategies: the per-kind recognition algorithms.
//!
//! Each strategy reacts to [`GestureInput`]s and timer expiries by requesting
//! transitions through a [`GestureContext`]. The shared state machine, bounds
//! checks, and arbitration live outside the strategies.
//!
//! | Kind | Begins | Activates | Fails or cancels |
//! |---|---|---|---|
//! | [`TapGesture`] | first contact | N taps completed within duration and delay | moved too far, held or waited too long |
//! | [`LongPressGesture`] | first contact | held for the minimum duration | lifted early, moved too far |
//! | [`PanGesture`] | pointer count reaches the minimum | displacement threshold while under the velocity cap | fail offsets, pointer count out of range, up before activating |
//! | [`FlingGesture`] | first contact | displaced far enough in an allowed direction | max duration elapsed, up before activating |
//! | [`PinchGesture`] | first contact | span changed by the slop | up before activating |
//! | [`RotationGesture`] | second pointer joins | at once, or past a minimum angle | a tracked pointer lifts without replacement |
//! | [`PassthroughGesture`] | first contact | first contact or final up | still undecided at final up |

mod fling;
mod long_press;
mod pan;
mod passthrough;
mod pinch;
mod rotation;
mod tap;

pub use fling::{FlingConfig, FlingDirection, FlingGesture};
pub use long_press::{LongPressConfig, LongPressGesture};
pub use pan::{DEFAULT_MIN_DIST, OffsetRange, PanConfig, PanGesture};
pub use passthrough::{PassthroughConfig, PassthroughGesture};
pub use pinch::{PinchConfig, PinchGesture};
pub use rotation::{RotationConfig, RotationGesture};
pub use tap::{TapConfig, TapGesture};

use crate::context::GestureContext;
use crate::input::GestureInput;
use crate::types::{GestureKind, State};

/// The recognition algorithm of one gesture kind.
pub trait GestureStrategy {
    /// Process one input. Transitions go through `cx`.
    fn on_event(&mut self, cx: &mut dyn GestureContext, input: &GestureInput);

    /// The timer armed through [`GestureContext::schedule_timer`] expired.
    fn on_timer(&mut self, cx: &mut dyn GestureContext) {
        cx.fail();
    }

    /// The recognizer moved from `old` to `new`.
    fn on_state_change(&mut self, _new: State, _old: State) {}

    /// Clear per-stream fields; configuration is kept.
    fn on_reset(&mut self);
}

/// Configuration of any gesture kind.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum GestureConfig {
    /// See [`PassthroughGesture`].
    Passthrough(PassthroughConfig),
    /// See [`TapGesture`].
    Tap(TapConfig),
    /// See [`LongPressGesture`].
    LongPress(LongPressConfig),
    /// See [`PanGesture`].
    Pan(PanConfig),
    /// See [`FlingGesture`].
    Fling(FlingConfig),
    /// See [`PinchGesture`].
    Pinch(PinchConfig),
    /// See [`RotationGesture`].
    Rotation(RotationConfig),
}

impl GestureConfig {
    /// Default configuration for `kind`.
    pub fn default_for(kind: GestureKind) -> Self {
        match kind {
            GestureKind::Passthrough => Self::Passthrough(PassthroughConfig::default()),
            GestureKind::Tap => Self::Tap(TapConfig::default()),
            GestureKind::LongPress => Self::LongPress(LongPressConfig::default()),
            GestureKind::Pan => Self::Pan(PanConfig::default()),
            GestureKind::Fling => Self::Fling(FlingConfig::default()),
            GestureKind::Pinch => Self::Pinch(PinchConfig::default()),
            GestureKind::Rotation => Self::Rotation(RotationConfig::default()),
        }
    }

    /// Kind this configuration belongs to.
    pub fn kind(&self) -> GestureKind {
        match self {
            Self::Passthrough(_) => GestureKind::Passthrough,
            Self::Tap(_) => GestureKind::Tap,
            Self::LongPress(_) => GestureKind::LongPress,
            Self::Pan(_) => GestureKind::Pan,
            Self::Fling(_) => GestureKind::Fling,
            Self::Pinch(_) => GestureKind::Pinch,
            Self::Rotation(_) => GestureKind::Rotation,
        }
    }
}

/// A gesture strategy of any kind.
#[derive(Clone, Debug)]
pub enum Gesture {
    /// Native passthrough.
    Passthrough(PassthroughGesture),
    /// Tap.
    Tap(TapGesture),
    /// Long press.
    LongPress(LongPressGesture),
    /// Pan.
    Pan(PanGesture),
    /// Fling.
    Fling(FlingGesture),
    /// Pinch.
    Pinch(PinchGesture),
    /// Rotation.
    Rotation(RotationGesture),
}

impl Gesture {
    /// Kind of the wrapped strategy.
    pub fn kind(&self) -> GestureKind {
        match self {
            Self::Passthrough(_) => GestureKind::Passthrough,
            Self::Tap(_) => GestureKind::Tap,
            Self::LongPress(_) => GestureKind::LongPress,
            Self::Pan(_) => GestureKind::Pan,
            Self::Fling(_) => GestureKind::Fling,
            Self::Pinch(_) => GestureKind::Pinch,
            Self::Rotation(_) => GestureKind::Rotation,
        }
    }

    fn strategy(&mut self) -> &mut dyn GestureStrategy {
        match self {
            Self::Passthrough(g) => g,
            Self::Tap(g) => g,
            Self::LongPress(g) => g,
            Self::Pan(g) => g,
            Self::Fling(g) => g,
            Self::Pinch(g) => g,
            Self::Rotation(g) => g,
        }
    }
}

impl GestureStrategy for Gesture {
    fn on_event(&mut self, cx: &mut dyn GestureContext, input: &GestureInput) {
        self.strategy().on_event(cx, input);
    }

    fn on_timer(&mut self, cx: &mut dyn GestureContext) {
        self.strategy().on_timer(cx);
    }

    fn on_state_change(&mut self, new: State, old: State) {
        self.strategy().on_state_change(new, old);
    }

    fn on_reset(&mut self) {
        self.strategy().on_reset();
    }
}

impl From<GestureConfig> for Gesture {
    fn from(config: GestureConfig) -> Self {
        match config {
            GestureConfig::Passthrough(c) => c.into(),
            GestureConfig::Tap(c) => c.into(),
            GestureConfig::LongPress(c) => c.into(),
            GestureConfig::Pan(c) => c.into(),
            GestureConfig::Fling(c) => c.into(),
            GestureConfig::Pinch(c) => c.into(),
            GestureConfig::Rotation(c) => c.into(),
        }
    }
}

macro_rules! gesture_from_config {
    ($($config:ident => $variant:ident($gesture:ident)),* $(,)?) => {
        $(
            impl From<$config> for Gesture {
                fn from(config: $config) -> Self {
                    Self::$variant($gesture::new(config))
                }
            }
        )*
    };
}

gesture_from_config! {
    PassthroughConfig => Passthrough(PassthroughGesture),
    TapConfig => Tap(TapGesture),
    LongPressConfig => LongPress(LongPressGesture),
    PanConfig => Pan(PanGesture),
    FlingConfig => Fling(FlingGesture),
    PinchConfig => Pinch(PinchGesture),
    RotationConfig => Rotation(RotationGesture),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_and_gesture_agree_on_kind() {
        for kind in [
            GestureKind::Passthrough,
            GestureKind::Tap,
            GestureKind::LongPress,
            GestureKind::Pan,
            GestureKind::Fling,
            GestureKind::Pinch,
            GestureKind::Rotation,
        ] {
            let config = GestureConfig::default_for(kind);
            assert_eq!(config.kind(), kind);
            assert_eq!(Gesture::from(config).kind(), kind);
        }
    }
}
