// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box tree basics.
//!
//! Build a small tree with a scrolled list, hit-test it, then drive a long press
//! on one of its rows through the gesture adapter.
//!
//! Run:
//! - `cargo run -p understory_demos --example box_tree_basics`

use kurbo::{Affine, Point, Rect, Vec2};
use understory_box_tree::{LocalNode, NodeFlags, QueryFilter, Tree};
use understory_gesture::adapters::box_tree::BoxTreeSurface;
use understory_gesture::gestures::LongPressConfig;
use understory_gesture::input::PointerStream;
use understory_gesture::listener::GestureEvent;
use understory_gesture::orchestrator::Orchestrator;
use understory_gesture::recognizer::Recognizer;
use understory_gesture::types::{PointerId, RecognizerId, State};

fn main() {
    let mut tree = Tree::new();
    let root = tree.insert(
        None,
        LocalNode {
            local_bounds: Rect::new(0.0, 0.0, 400.0, 600.0),
            ..Default::default()
        },
    );
    // A list scrolled down by one row, clipping its content.
    let list = tree.insert(
        Some(root),
        LocalNode {
            local_bounds: Rect::new(0.0, 0.0, 400.0, 200.0),
            local_transform: Affine::translate(Vec2::new(0.0, 100.0)),
            scroll_offset: Vec2::new(0.0, 50.0),
            flags: NodeFlags::all(),
            ..Default::default()
        },
    );
    let rows: Vec<_> = (0..6)
        .map(|i| {
            let top = f64::from(i) * 50.0;
            tree.insert(
                Some(list),
                LocalNode {
                    local_bounds: Rect::new(0.0, top, 400.0, top + 50.0),
                    ..Default::default()
                },
            )
        })
        .collect();
    // An overlay that paints above the list but lets pointers through.
    let overlay = tree.insert(
        Some(root),
        LocalNode {
            local_bounds: Rect::new(0.0, 0.0, 400.0, 600.0),
            z_index: 10,
            flags: NodeFlags::VISIBLE | NodeFlags::PICK_CHILDREN,
            ..Default::default()
        },
    );

    let filter = QueryFilter {
        visible_only: true,
        pickable_only: true,
    };
    // Root y 125 is list content y 75: the second row.
    let hit = tree.hit_test_point(Point::new(200.0, 125.0), filter).unwrap();
    println!("hit {:?} via {:?}", hit.node, hit.path);
    assert_eq!(hit.node, rows[1], "scroll shifts rows up by one");
    assert!(!hit.path.contains(&overlay), "overlay is not pickable");

    let press = RecognizerId(1);
    let mut orch = Orchestrator::new();
    orch.register(rows[1], Recognizer::new(press, LongPressConfig::default()))
        .unwrap();

    let surface = BoxTreeSurface::new(&tree, root);
    let mut log: Vec<GestureEvent> = Vec::new();
    let mut stream = PointerStream::new();
    orch.handle_event(&surface, &stream.down(PointerId(0), Point::new(200.0, 125.0), 0), &mut log)
        .unwrap();
    // Nothing more arrives from the host; its frame clock drives the timer.
    for frame in 1..=40 {
        orch.advance(frame * 16, &mut log);
    }
    println!("long press state: {:?}", orch.state(press));
    assert_eq!(orch.state(press), Some(State::Active), "held past the minimum");
    orch.handle_event(&surface, &stream.up(PointerId(0), 700), &mut log)
        .unwrap();
    for change in log.iter().filter_map(GestureEvent::as_state_change) {
        println!("{}: {:?} -> {:?}", change.id, change.previous, change.state);
    }
}
