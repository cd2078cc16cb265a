use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lane_geometry::{GreedyLineClusterer, LaneMap, LineGrouping, LineSegment};

fn noisy_segments(count: usize) -> Vec<LineSegment> {
    (0..count)
        .map(|i| {
            let divider = (i % 6) as f32;
            let jitter = ((i * 7) % 13) as f32;
            let x = 200.0 + divider * 300.0 + jitter;
            if i % 5 == 0 {
                // crosswalk clutter
                LineSegment::new(x, 700.0 + jitter, x + 400.0, 710.0)
            } else {
                LineSegment::new(x, 1000.0 - jitter, x + 120.0, 350.0)
            }
        })
        .collect()
}

fn bench_cluster(c: &mut Criterion) {
    let clusterer = GreedyLineClusterer::default();
    let segments = noisy_segments(500);

    c.bench_function("cluster_500_segments", |b| {
        b.iter(|| clusterer.cluster(black_box(&segments)))
    });

    let map = LaneMap::new(clusterer.cluster(&segments), 1920.0).expect("valid frame width");
    c.bench_function("lane_of", |b| {
        b.iter(|| {
            for x in (0..1920).step_by(16) {
                black_box(map.lane_of(x as f32));
            }
        })
    });
}

criterion_group!(benches, bench_cluster);
criterion_main!(benches);
