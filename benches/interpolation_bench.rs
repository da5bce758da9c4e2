use chart_motion::api::PeerSpec;
use chart_motion::core::{AnimValue, ChartFamily, IdentityKey, Shape, ShapeKind, align_point_arrays};
use chart_motion::diff::props;
use chart_motion::{RenderOptions, TransitionConfig, TransitionEngine};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_array_lerp_64_lanes(c: &mut Criterion) {
    let start = AnimValue::array((0..64).map(f64::from));
    let end = AnimValue::array((0..64).map(|i| f64::from(i) * 2.0 + 1.0));

    c.bench_function("array_lerp_64_lanes", |b| {
        b.iter(|| {
            let _ = black_box(&start)
                .lerp(black_box(&end), black_box(0.375))
                .expect("compatible arrays");
        })
    });
}

fn bench_point_alignment_1k_to_1k5(c: &mut Criterion) {
    let from: Vec<f64> = (0..1_000)
        .flat_map(|i| [f64::from(i), f64::from(i % 97)])
        .collect();
    let to: Vec<f64> = (0..1_500)
        .flat_map(|i| [f64::from(i), f64::from(i % 89)])
        .collect();

    c.bench_function("point_alignment_1k_to_1k5", |b| {
        b.iter(|| {
            let _ = align_point_arrays(black_box(&from), black_box(&to), 2, 1);
        })
    });
}

fn bench_bar_render_transition_1k(c: &mut Criterion) {
    fn specs(offset: f64) -> Vec<PeerSpec> {
        (0..1_000)
            .map(|i| {
                let value = 10.0 + ((i % 37) as f64) * 2.0 + offset;
                let shape = Shape::new(ShapeKind::Bar)
                    .with_property(
                        props::RECT,
                        AnimValue::array([f64::from(i) * 4.0, 500.0 - value, 3.0, value]),
                    )
                    .with_property(props::BASELINE, AnimValue::Scalar(500.0));
                PeerSpec::new(IdentityKey::item("series-0", format!("g{i}")), shape)
                    .with_value(value)
            })
            .collect()
    }

    c.bench_function("bar_render_transition_1k", |b| {
        b.iter(|| {
            let mut engine = TransitionEngine::new(TransitionConfig::default());
            for (pass, offset) in [(false, 0.0), (true, 25.0)] {
                let options = RenderOptions::new(ChartFamily::Cartesian).with_animation(pass);
                engine.begin_render(options).expect("begin_render");
                let peers = engine
                    .build_peers(ShapeKind::Bar, specs(offset))
                    .expect("build_peers");
                engine
                    .reconcile_and_schedule(ShapeKind::Bar, peers)
                    .expect("reconcile_and_schedule");
                engine.commit().expect("commit");
            }
            while !engine.tick(black_box(16.0)) {}
        })
    });
}

criterion_group!(
    benches,
    bench_array_lerp_64_lanes,
    bench_point_alignment_1k_to_1k5,
    bench_bar_render_transition_1k
);
criterion_main!(benches);
