// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::GestureStrategy;
use crate::context::GestureContext;
use crate::input::{GestureInput, PointerAction};
use crate::recognizer::RecognizerFlags;
use crate::types::State;

/// Passthrough has no thresholds of its own; its behavior is driven by
/// [`RecognizerFlags::ACTIVATE_ON_FIRST_TOUCH`] and
/// [`RecognizerFlags::DISALLOW_INTERRUPTION`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassthroughConfig {}

/// Stands in for a target's own event handling inside arbitration.
///
/// It claims the stream on the final up, or on first touch when configured to, so
/// other recognizers can wait for it or be cancelled by it like any other.
#[derive(Clone, Debug, Default)]
pub struct PassthroughGesture {
    config: PassthroughConfig,
}

impl PassthroughGesture {
    /// Create a passthrough recognizer.
    pub fn new(config: PassthroughConfig) -> Self {
        Self { config }
    }

    /// Configuration.
    pub fn config(&self) -> &PassthroughConfig {
        &self.config
    }
}

impl GestureStrategy for PassthroughGesture {
    fn on_event(&mut self, cx: &mut dyn GestureContext, input: &GestureInput) {
        if cx.state() == State::Undetermined && input.action.is_down() {
            if cx.flags().contains(RecognizerFlags::ACTIVATE_ON_FIRST_TOUCH) {
                cx.activate();
            } else {
                cx.begin();
            }
        }
        if input.action == PointerAction::Up {
            if cx.state() == State::Undetermined {
                cx.cancel();
            } else {
                cx.activate();
                cx.end();
            }
        }
    }

    fn on_reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerAction::*;
    use crate::testing::{MockContext, input};

    #[test]
    fn claims_stream_on_final_up() {
        let mut g = PassthroughGesture::default();
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Down, 0, &[(0, 5.0, 5.0)], 0));
        assert_eq!(cx.state, State::Began);
        cx.feed(&mut g, &input(Move, 0, &[(0, 50.0, 5.0)], 10));
        assert_eq!(cx.state, State::Began);
        cx.feed(&mut g, &input(Up, 0, &[(0, 50.0, 5.0)], 20));
        assert_eq!(cx.history, [State::Began, State::Active, State::End]);
    }

    #[test]
    fn activate_on_first_touch() {
        let mut g = PassthroughGesture::default();
        let mut cx = MockContext::new();
        cx.flags |= RecognizerFlags::ACTIVATE_ON_FIRST_TOUCH;
        cx.feed(&mut g, &input(Down, 0, &[(0, 5.0, 5.0)], 0));
        assert_eq!(cx.state, State::Active);
        cx.feed(&mut g, &input(Up, 0, &[(0, 5.0, 5.0)], 20));
        assert_eq!(cx.state, State::End);
    }

    #[test]
    fn undetermined_at_up_cancels() {
        let mut g = PassthroughGesture::default();
        let mut cx = MockContext::new();
        cx.feed(&mut g, &input(Up, 0, &[(0, 5.0, 5.0)], 0));
        assert_eq!(cx.state, State::Cancelled);
    }
}
