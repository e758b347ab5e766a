// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture basics.
//!
//! A tap and a pan on one surface. The listener prints every state change and
//! every update of an active recognizer.
//!
//! Run:
//! - `cargo run -p understory_demos --example gesture_basics`

use kurbo::{Point, Rect, Vec2};
use understory_gesture::gestures::{PanConfig, TapConfig};
use understory_gesture::input::PointerStream;
use understory_gesture::listener::{GestureListener, GestureUpdate, StateChange};
use understory_gesture::orchestrator::Orchestrator;
use understory_gesture::recognizer::Recognizer;
use understory_gesture::target::TargetTree;
use understory_gesture::types::{GestureData, PointerId, RecognizerId, State};

/// A root with a single card inside it.
struct Surface {
    children: [u32; 1],
}

const ROOT: u32 = 0;
const CARD: u32 = 1;

impl TargetTree for Surface {
    type Id = u32;

    fn root(&self) -> u32 {
        ROOT
    }

    fn contains(&self, id: u32) -> bool {
        id <= CARD
    }

    fn parent(&self, id: u32) -> Option<u32> {
        (id == CARD).then_some(ROOT)
    }

    fn children(&self, id: u32) -> &[u32] {
        if id == ROOT { &self.children } else { &[] }
    }

    fn bounds(&self, id: u32) -> Rect {
        if id == ROOT {
            Rect::new(0.0, 0.0, 400.0, 800.0)
        } else {
            Rect::new(20.0, 100.0, 380.0, 300.0)
        }
    }
}

#[derive(Default)]
struct Printer {
    ended: Vec<RecognizerId>,
}

impl GestureListener for Printer {
    fn on_state_change(&mut self, change: &StateChange) {
        println!(
            "{} {}: {:?} -> {:?} at {:?}",
            change.kind, change.id, change.previous, change.state, change.position
        );
        if change.state == State::End {
            self.ended.push(change.id);
        }
    }

    fn on_touch_event(&mut self, update: &GestureUpdate) {
        if let GestureData::Pan { translation, .. } = update.data {
            println!("  {} dragged by {translation:?}", update.id);
        }
    }
}

fn main() {
    let surface = Surface { children: [CARD] };
    let tap = RecognizerId(1);
    let pan = RecognizerId(2);

    let mut orch = Orchestrator::new();
    orch.register(CARD, Recognizer::new(tap, TapConfig::default()))
        .unwrap();
    orch.register(CARD, Recognizer::new(pan, PanConfig::default()))
        .unwrap();

    let mut printer = Printer::default();
    let mut stream = PointerStream::new();
    let finger = PointerId(0);

    println!("-- quick tap");
    orch.handle_event(&surface, &stream.down(finger, Point::new(100.0, 150.0), 0), &mut printer)
        .unwrap();
    orch.handle_event(&surface, &stream.up(finger, 60), &mut printer)
        .unwrap();
    assert_eq!(printer.ended, [tap], "a still contact is a tap");

    println!("-- drag");
    printer.ended.clear();
    orch.handle_event(&surface, &stream.down(finger, Point::new(100.0, 150.0), 1000), &mut printer)
        .unwrap();
    for step in 1..=5 {
        let event = stream.translate_all(Vec2::new(8.0, 0.0), 1000 + step * 16);
        orch.handle_event(&surface, &event, &mut printer).unwrap();
    }
    orch.handle_event(&surface, &stream.up(finger, 1100), &mut printer)
        .unwrap();
    assert_eq!(printer.ended, [pan], "moving past the slop is a pan");
}
