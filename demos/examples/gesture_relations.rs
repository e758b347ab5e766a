// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture relations.
//!
//! A photo that zooms and turns at the same time, and opens on a single tap only
//! once a double tap has been ruled out.
//!
//! Run:
//! - `cargo run -p understory_demos --example gesture_relations`

use std::f64::consts::PI;

use kurbo::{Point, Rect, Vec2};
use understory_gesture::gestures::{PinchConfig, RotationConfig, TapConfig};
use understory_gesture::input::PointerStream;
use understory_gesture::listener::GestureEvent;
use understory_gesture::orchestrator::Orchestrator;
use understory_gesture::recognizer::Recognizer;
use understory_gesture::target::TargetTree;
use understory_gesture::types::{GestureData, PointerId, RecognizerId, State};

struct Photo;

impl TargetTree for Photo {
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
        Rect::new(0.0, 0.0, 400.0, 400.0)
    }
}

const PINCH: RecognizerId = RecognizerId(10);
const ROTATE: RecognizerId = RecognizerId(11);
const OPEN: RecognizerId = RecognizerId(12);
const ZOOM_TO_FIT: RecognizerId = RecognizerId(13);

fn states_of(log: &[GestureEvent], id: RecognizerId) -> Vec<State> {
    log.iter()
        .filter_map(GestureEvent::as_state_change)
        .filter(|c| c.id == id)
        .map(|c| c.state)
        .collect()
}

/// Two pointers on a circle of `radius` around `center`, turned by `angle`.
fn fingers(center: Point, radius: f64, angle: f64) -> [Point; 2] {
    let arm = Vec2::from_angle(angle) * radius;
    [center - arm, center + arm]
}

fn main() {
    let mut orch = Orchestrator::new();
    orch.register(0, Recognizer::new(PINCH, PinchConfig::default()).simultaneous_with([ROTATE]))
        .unwrap();
    orch.register(0, Recognizer::new(ROTATE, RotationConfig::default()))
        .unwrap();
    orch.register(0, Recognizer::new(OPEN, TapConfig::default()).wait_for([ZOOM_TO_FIT]))
        .unwrap();
    orch.register(
        0,
        Recognizer::new(
            ZOOM_TO_FIT,
            TapConfig {
                number_of_taps: 2,
                ..TapConfig::default()
            },
        ),
    )
    .unwrap();

    let mut log: Vec<GestureEvent> = Vec::new();
    let mut stream = PointerStream::new();
    let (a, b) = (PointerId(0), PointerId(1));
    let center = Point::new(200.0, 200.0);

    println!("-- pinch and rotate together");
    let [pa, pb] = fingers(center, 50.0, 0.0);
    orch.handle_event(&Photo, &stream.down(a, pa, 0), &mut log)
        .unwrap();
    orch.handle_event(&Photo, &stream.down(b, pb, 10), &mut log)
        .unwrap();
    for step in 1..=6_u32 {
        let t = f64::from(step) / 6.0;
        let [pa, pb] = fingers(center, 50.0 + 25.0 * t, PI / 6.0 * t);
        let event = stream.move_many(&[(a, pa), (b, pb)], 10 + u64::from(step) * 16);
        orch.handle_event(&Photo, &event, &mut log).unwrap();
    }
    if let Some(GestureData::Pinch { scale, .. }) = orch.data(PINCH) {
        println!("scale {scale:.2}");
    }
    if let Some(GestureData::Rotation { rotation, .. }) = orch.data(ROTATE) {
        println!("rotation {:.1} degrees", rotation.to_degrees());
    }
    assert_eq!(orch.state(PINCH), Some(State::Active), "pinch runs");
    assert_eq!(orch.state(ROTATE), Some(State::Active), "rotation runs alongside");
    orch.handle_event(&Photo, &stream.up(b, 200), &mut log)
        .unwrap();
    orch.handle_event(&Photo, &stream.up(a, 210), &mut log)
        .unwrap();
    // Both ended together and neither tap got to decide anything.
    assert!(!states_of(&log, OPEN).contains(&State::End), "no open during a pinch");

    println!("-- single tap waits for the double tap to give up");
    log.clear();
    orch.handle_event(&Photo, &stream.down(a, center, 1000), &mut log)
        .unwrap();
    orch.handle_event(&Photo, &stream.up(a, 1050), &mut log)
        .unwrap();
    println!("open before timeout: {:?}", states_of(&log, OPEN));
    if let Some(deadline) = orch.next_deadline() {
        orch.advance(deadline, &mut log);
    }
    println!("open after timeout: {:?}", states_of(&log, OPEN));
    assert_eq!(states_of(&log, OPEN).last(), Some(&State::End), "open fires");
}
