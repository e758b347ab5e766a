// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recognizers from JSON.
//!
//! Descriptors deserialize with the `serde` feature; relations are listed per
//! recognizer and resolved when it is registered.
//!
//! Run:
//! - `cargo run -p understory_demos --example gesture_config`

use kurbo::{Point, Rect, Vec2};
use understory_gesture::input::PointerStream;
use understory_gesture::listener::GestureEvent;
use understory_gesture::orchestrator::Orchestrator;
use understory_gesture::recognizer::{Recognizer, RecognizerDescriptor};
use understory_gesture::target::TargetTree;
use understory_gesture::types::{PointerId, RecognizerId, State};

const CONFIG: &str = r#"[
  {
    "id": 1,
    "gesture": { "kind": "fling", "direction": "LEFT | RIGHT", "min_displacement": 120.0 }
  },
  {
    "id": 2,
    "gesture": { "kind": "pan", "active_offset_x": { "start": -20.0, "end": 20.0 } },
    "wait_for": [1]
  },
  {
    "id": 3,
    "gesture": { "kind": "tap" },
    "flags": "ENABLED | CANCEL_WHEN_OUTSIDE | CANCEL_OTHERS_ON_ACTIVATE",
    "hit_slop": { "left": 8.0, "top": 8.0, "right": 8.0, "bottom": 8.0 }
  }
]"#;

struct Card;

impl TargetTree for Card {
    type Id = u8;

    fn root(&self) -> u8 {
        0
    }

    fn contains(&self, id: u8) -> bool {
        id == 0
    }

    fn parent(&self, _id: u8) -> Option<u8> {
        None
    }

    fn children(&self, _id: u8) -> &[u8] {
        &[]
    }

    fn bounds(&self, _id: u8) -> Rect {
        Rect::new(0.0, 0.0, 360.0, 120.0)
    }
}

fn main() {
    let descriptors: Vec<RecognizerDescriptor> = serde_json::from_str(CONFIG).unwrap();
    let mut orch = Orchestrator::new();
    for descriptor in descriptors {
        println!("{} {}", descriptor.gesture.kind(), descriptor.id);
        let recognizer = Recognizer::from_descriptor(descriptor).unwrap();
        orch.register(0, recognizer).unwrap();
    }
    println!("{} relation entries", orch.relations().len());

    // A quick swipe: the fling succeeds and the pan it held back is cancelled.
    let mut log: Vec<GestureEvent> = Vec::new();
    let mut stream = PointerStream::new();
    let finger = PointerId(0);
    orch.handle_event(&Card, &stream.down(finger, Point::new(300.0, 60.0), 0), &mut log)
        .unwrap();
    for step in 1..=8 {
        let event = stream.translate_all(Vec2::new(-20.0, 0.0), step * 10);
        orch.handle_event(&Card, &event, &mut log).unwrap();
    }
    orch.handle_event(&Card, &stream.up(finger, 100), &mut log)
        .unwrap();

    for change in log.iter().filter_map(GestureEvent::as_state_change) {
        println!("{} {}: {:?} -> {:?}", change.kind, change.id, change.previous, change.state);
    }
    let last = |id| {
        log.iter()
            .filter_map(GestureEvent::as_state_change)
            .filter(|c| c.id == id)
            .map(|c| c.state)
            .last()
    };
    assert_eq!(last(RecognizerId(1)), Some(State::End), "fling wins");
    assert_ne!(last(RecognizerId(2)), Some(State::End), "pan yields");
    assert_ne!(last(RecognizerId(3)), Some(State::End), "no tap");
}
