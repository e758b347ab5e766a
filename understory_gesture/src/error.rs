// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by configuration and dispatch.
//!
//! Recognition outcomes are never errors; a gesture that does not match simply
//! reaches [`State::Failed`](crate::types::State::Failed). The variants here
//! indicate configuration mistakes or a target tree that changed underneath
//! an active stream.

use alloc::string::String;

use crate::types::RecognizerId;

/// Error type for this crate.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GestureError {
    /// The recognizer is still attached to a target from an earlier stream.
    #[error("recognizer {0} is already attached to a target")]
    AlreadyAttached(RecognizerId),
    /// Reset was requested before the recognizer reached a terminal state.
    #[error("recognizer {0} has not finished and cannot be reset")]
    NotTerminal(RecognizerId),
    /// More recognizers were hit by one stream than the orchestrator allows.
    #[error("too many recognizers attached to one stream (limit {limit})")]
    TooManyRecognizers {
        /// Configured ceiling.
        limit: usize,
    },
    /// A recognizer with this tag is already registered.
    #[error("recognizer {0} is already registered")]
    DuplicateRecognizer(RecognizerId),
    /// No recognizer with this tag is registered.
    #[error("recognizer {0} is not registered")]
    UnknownRecognizer(RecognizerId),
    /// A gesture kind name did not match any variant.
    #[error("unknown gesture kind `{0}`")]
    UnknownGestureKind(String),
    /// A relation list contained something that is not a recognizer tag.
    #[error("malformed recognizer tag `{0}`")]
    MalformedTag(String),
    /// A recognizer was related to itself.
    #[error("recognizer {0} cannot be related to itself")]
    InvalidRelation(RecognizerId),
    /// Hit slop values contradict each other.
    #[error("invalid hit slop: {0}")]
    InvalidHitSlop(&'static str),
    /// A target referenced by an attached recognizer is no longer reachable from the root.
    #[error("target is no longer attached under the root")]
    DetachedTarget,
    /// A transform on the path to a target cannot be inverted.
    #[error("target transform is not invertible")]
    SingularTransform,
}
