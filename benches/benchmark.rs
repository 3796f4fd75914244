//! Benchmarks for the storyboard store and playback engine.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use storyreel::{AspectRatio, PlaybackEngine, Shot, StoreManager};

fn store_with_shots(count: usize) -> (StoreManager, String, String) {
    let mut manager = StoreManager::new();
    let project_id = manager.root().active_project_id.clone();
    let board_id = manager
        .active_project()
        .unwrap()
        .active_storyboard_id
        .clone();
    for i in 0..count {
        let shot_id = manager.add_shot(&project_id, &board_id).unwrap();
        manager.set_shot_title(&project_id, &board_id, &shot_id, format!("Shot {}", i));
    }
    (manager, project_id, board_id)
}

fn bench_new(c: &mut Criterion) {
    c.bench_function("new", |b| b.iter(|| black_box(StoreManager::new())));
}

fn bench_add_shot(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_shot");
    for size in [10usize, 100, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let (mut manager, project_id, board_id) = store_with_shots(size);
            b.iter(|| {
                black_box(manager.add_shot(&project_id, &board_id));
            })
        });
    }
    group.finish();
}

fn bench_move_shot(c: &mut Criterion) {
    c.bench_function("move_shot_100", |b| {
        let (mut manager, project_id, board_id) = store_with_shots(100);
        b.iter(|| {
            manager.move_shot(&project_id, &board_id, 0, 99);
            manager.move_shot(&project_id, &board_id, 99, 0);
        })
    });
}

fn bench_playback_tick(c: &mut Criterion) {
    c.bench_function("playback_tick_1000_shots", |b| {
        let shots: Vec<Shot> = (0..1000)
            .map(|i| Shot::new(i + 1).with_duration(1.0))
            .collect();
        let mut engine = PlaybackEngine::open(shots, AspectRatio::Wide).unwrap();
        b.iter(|| {
            engine.tick();
            if !engine.is_playing() {
                engine.restart();
                engine.toggle_play();
            }
            black_box(engine.current_index());
        })
    });
}

fn bench_serialize_root(c: &mut Criterion) {
    c.bench_function("serialize_root_500_shots", |b| {
        let (manager, _, _) = store_with_shots(500);
        b.iter(|| black_box(serde_json::to_string(manager.root()).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_new,
    bench_add_shot,
    bench_move_shot,
    bench_playback_tick,
    bench_serialize_root
);
criterion_main!(benches);
