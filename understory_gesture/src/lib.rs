// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_gesture --heading-base-level=0

//! Understory Gesture: deterministic, `no_std` pointer-gesture recognition and arbitration.
//!
//! ## Overview
//!
//! This crate turns a raw stream of pointer events into recognized gestures (tap,
//! long press, pan, fling, pinch, rotation, and a passthrough for a target's own
//! handling) and decides which of several competing recognizers wins.
//! It does not own a scene: hit testing and coordinate mapping go through the
//! [`TargetTree`](crate::target::TargetTree) you implement over your own tree.
//!
//! ## Recognizers
//!
//! A [`Recognizer`](crate::recognizer::Recognizer) pairs an identity tag with a gesture
//! configuration, behavior flags, an optional hit slop, and the relations it declares.
//! Every recognizer runs the same state machine:
//!
//! ```text
//! Undetermined ─→ Began ─→ Active ─→ End
//!      │            │         │
//!      └────────────┴─────────┴──→ Cancelled | Failed
//! ```
//!
//! `Undetermined → Active` is allowed; terminal states accept no further transitions.
//!
//! ## Arbitration
//!
//! - *Wait for*: a recognizer that reaches activation while one it waits for is still
//!   undecided is held back. It is promoted if that one fails, and cancelled if it ends.
//! - *Simultaneous*: two recognizers declared compatible may both be active.
//! - Otherwise a confirmed activation cancels every competitor that shares a pointer.
//!
//! Relations live in an [`InteractionRegistry`](crate::relations::InteractionRegistry)
//! owned by each [`Orchestrator`](crate::orchestrator::Orchestrator); independent
//! surfaces use independent orchestrators.
//!
//! ## Time
//!
//! Events carry millisecond timestamps and timers fire from them: before each event,
//! or when the host calls [`Orchestrator::advance`](crate::orchestrator::Orchestrator::advance).
//! Nothing reads a clock, so replaying a stream replays its outcome.
//!
//! ## Example
//!
//! A single tap that yields to a double tap:
//!
//! ```
//! use kurbo::{Point, Rect};
//! use understory_gesture::gestures::TapConfig;
//! use understory_gesture::input::PointerStream;
//! use understory_gesture::listener::GestureEvent;
//! use understory_gesture::orchestrator::Orchestrator;
//! use understory_gesture::recognizer::Recognizer;
//! use understory_gesture::target::TargetTree;
//! use understory_gesture::types::{PointerId, RecognizerId, State};
//!
//! // One full-screen target.
//! struct Screen;
//! impl TargetTree for Screen {
//!     type Id = u8;
//!     fn root(&self) -> u8 { 0 }
//!     fn contains(&self, id: u8) -> bool { id == 0 }
//!     fn parent(&self, _: u8) -> Option<u8> { None }
//!     fn children(&self, _: u8) -> &[u8] { &[] }
//!     fn bounds(&self, _: u8) -> Rect { Rect::new(0.0, 0.0, 320.0, 480.0) }
//! }
//!
//! let (single, double) = (RecognizerId(1), RecognizerId(2));
//! let mut orch = Orchestrator::new();
//! orch.register(0, Recognizer::new(single, TapConfig::default()).wait_for([double]))
//!     .unwrap();
//! orch.register(0, Recognizer::new(double, TapConfig { number_of_taps: 2, ..TapConfig::default() }))
//!     .unwrap();
//!
//! let mut log: Vec<GestureEvent> = Vec::new();
//! let mut stream = PointerStream::new();
//! let p = PointerId(0);
//! orch.handle_event(&Screen, &stream.down(p, Point::new(100.0, 100.0), 0), &mut log).unwrap();
//! orch.handle_event(&Screen, &stream.up(p, 50), &mut log).unwrap();
//!
//! // No second tap arrives; once the double tap times out the single tap wins.
//! let deadline = orch.next_deadline().unwrap();
//! orch.advance(deadline, &mut log);
//! let single_states: Vec<State> = log
//!     .iter()
//!     .filter_map(GestureEvent::as_state_change)
//!     .filter(|c| c.id == single)
//!     .map(|c| c.state)
//!     .collect();
//! assert_eq!(single_states, [State::Began, State::Active, State::End]);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwarded to Kurbo.
//! - `libm`: `no_std` float support through Kurbo.
//! - `serde`: derive `Serialize`/`Deserialize` on configuration types.
//! - `box_tree_adapter`: [`TargetTree`](crate::target::TargetTree) for Understory Box Tree.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;
pub mod context;
pub mod detector;
pub mod error;
pub mod gestures;
pub mod input;
pub mod listener;
pub mod mapper;
pub mod orchestrator;
pub mod recognizer;
pub mod relations;
pub mod target;
pub mod types;
pub mod velocity;

mod timer;

#[cfg(test)]
mod testing;
