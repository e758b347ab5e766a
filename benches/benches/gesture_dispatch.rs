// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Affine, Point, Rect, Vec2};
use understory_box_tree::{LocalNode, NodeId, Tree};
use understory_gesture::adapters::box_tree::BoxTreeSurface;
use understory_gesture::gestures::{PanConfig, TapConfig};
use understory_gesture::input::PointerStream;
use understory_gesture::listener::GestureEvent;
use understory_gesture::orchestrator::Orchestrator;
use understory_gesture::recognizer::Recognizer;
use understory_gesture::types::{PointerId, RecognizerId};

/// A scrolled `n * n` grid of 40px cells, each with a tap and a pan.
fn gen_grid(n: u32) -> (Tree, NodeId, Orchestrator<NodeId>) {
    let mut tree = Tree::new();
    let side = f64::from(n) * 40.0;
    let root = tree.insert(
        None,
        LocalNode {
            local_bounds: Rect::new(0.0, 0.0, side, side),
            ..Default::default()
        },
    );
    let grid = tree.insert(
        Some(root),
        LocalNode {
            local_bounds: Rect::new(0.0, 0.0, side, side),
            local_transform: Affine::translate(Vec2::new(0.0, 20.0)),
            scroll_offset: Vec2::new(0.0, 20.0),
            ..Default::default()
        },
    );
    let mut orch = Orchestrator::new();
    let mut next = 0;
    for y in 0..n {
        for x in 0..n {
            let origin = Point::new(f64::from(x) * 40.0, f64::from(y) * 40.0);
            let cell = tree.insert(
                Some(grid),
                LocalNode {
                    local_bounds: Rect::from_origin_size(origin, (40.0, 40.0)),
                    ..Default::default()
                },
            );
            orch.register(cell, Recognizer::new(RecognizerId(next), TapConfig::default()))
                .unwrap();
            orch.register(cell, Recognizer::new(RecognizerId(next + 1), PanConfig::default()))
                .unwrap();
            next += 2;
        }
    }
    (tree, root, orch)
}

fn bench_tap(c: &mut Criterion) {
    let mut group = c.benchmark_group("tap");
    for &n in &[8_u32, 32, 64] {
        let (tree, root, mut orch) = gen_grid(n);
        let surface = BoxTreeSurface::new(&tree, root);
        let center = Point::new(f64::from(n) * 20.0 + 5.0, f64::from(n) * 20.0 + 5.0);
        let mut stream = PointerStream::new();
        let mut log: Vec<GestureEvent> = Vec::new();
        let mut now = 0;
        group.throughput(Throughput::Elements(u64::from(n * n)));
        group.bench_function(format!("down_up_n{n}"), |b| {
            b.iter(|| {
                // Each stream completes, so the recognizers are reset for the next one.
                log.clear();
                now += 1000;
                let p = PointerId(0);
                orch.handle_event(&surface, &stream.down(p, center, now), &mut log)
                    .unwrap();
                orch.handle_event(&surface, &stream.up(p, now + 40), &mut log)
                    .unwrap();
                black_box(log.len());
            });
        });
    }
    group.finish();
}

fn bench_pan(c: &mut Criterion) {
    let mut group = c.benchmark_group("pan");
    let (tree, root, mut orch) = gen_grid(32);
    let surface = BoxTreeSurface::new(&tree, root);
    let mut now = 0;
    group.throughput(Throughput::Elements(120));
    group.bench_function("drag_120_moves", |b| {
        b.iter_batched(
            PointerStream::new,
            |mut stream| {
                now += 10_000;
                let p = PointerId(0);
                orch.handle_event(&surface, &stream.down(p, Point::new(300.0, 300.0), now), &mut ())
                    .unwrap();
                for t in 1..=120 {
                    let event = stream.translate_all(Vec2::new(1.5, 0.5), now + t * 8);
                    orch.handle_event(&surface, &event, &mut ()).unwrap();
                }
                orch.handle_event(&surface, &stream.up(p, now + 1000), &mut ())
                    .unwrap();
                black_box(orch.data(RecognizerId(0)).copied());
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_tap, bench_pan);
criterion_main!(benches);
