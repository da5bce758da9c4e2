use chart_motion::api::{CommitStrategy, PeerSpec};
use chart_motion::core::{AnimValue, ChartFamily, IdentityKey, Shape, ShapeKind};
use chart_motion::diff::props;
use chart_motion::{RenderOptions, TransitionConfig, TransitionEngine};
use std::cell::Cell;
use std::rc::Rc;

const PLOT_BOTTOM: f64 = 100.0;

fn bar_spec(group: &str, x: f64, value: f64) -> PeerSpec {
    let shape = Shape::new(ShapeKind::Bar)
        .with_property(
            props::RECT,
            AnimValue::array([x, PLOT_BOTTOM - value, 8.0, value]),
        )
        .with_property(props::BASELINE, AnimValue::Scalar(PLOT_BOTTOM));
    PeerSpec::new(IdentityKey::item("series-0", group), shape).with_value(value)
}

fn render_bars(
    engine: &mut TransitionEngine,
    animate: bool,
    items: &[(&str, f64)],
) -> CommitStrategy {
    let options = RenderOptions::new(ChartFamily::Cartesian).with_animation(animate);
    engine.begin_render(options).expect("begin_render");
    let specs = items
        .iter()
        .enumerate()
        .map(|(index, (group, value))| bar_spec(group, index as f64 * 12.0, *value))
        .collect();
    let peers = engine
        .build_peers(ShapeKind::Bar, specs)
        .expect("build_peers");
    engine
        .reconcile_and_schedule(ShapeKind::Bar, peers)
        .expect("reconcile_and_schedule");
    engine.commit().expect("commit")
}

fn drive_to_completion(engine: &mut TransitionEngine) {
    let mut frames = 0;
    while !engine.tick(16.0) {
        frames += 1;
        assert!(frames < 10_000, "animation never finished");
    }
}

/// Live-container shapes as `(rect, opacity)`, sorted by geometry so that
/// z-order differences do not affect comparisons.
fn live_bar_rects(engine: &TransitionEngine) -> Vec<(Vec<f64>, f64)> {
    let scene = engine.scene();
    let children = scene
        .children_of(engine.live_container())
        .expect("live children");
    let mut rects: Vec<(Vec<f64>, f64)> = children
        .iter()
        .map(|&id| {
            let shape = scene.shape(id).expect("shape");
            let rect = shape
                .property(props::RECT)
                .and_then(AnimValue::as_array)
                .expect("bar rect")
                .to_vec();
            (rect, shape.opacity())
        })
        .collect();
    rects.sort_by(|a, b| a.partial_cmp(b).expect("comparable"));
    rects
}

#[test]
fn mixed_render_partitions_items_and_settles_on_the_new_state() {
    let mut engine = TransitionEngine::new(TransitionConfig::default());
    render_bars(&mut engine, false, &[("g1", 40.0), ("g2", 10.0)]);

    let strategy = render_bars(&mut engine, true, &[("g2", 25.0), ("g3", 60.0)]);
    assert_eq!(strategy, CommitStrategy::ItemReconciliation);
    assert!(engine.is_animating());

    let stats = engine.last_stats().expect("stats");
    assert_eq!(stats.updates, 1);
    assert_eq!(stats.inserts, 1);
    assert_eq!(stats.deletes, 1);
    assert_eq!(stats.unchanged, 0);
    assert_eq!(stats.degraded, 0);
    assert_eq!(stats.snapped, 0);

    // Two live bars plus the deleted g1 still fading in the overlay.
    assert_eq!(engine.scene().shape_count(), 3);
    assert_eq!(live_bar_rects(&engine).len(), 2);

    drive_to_completion(&mut engine);

    assert!(!engine.is_animating());
    assert_eq!(engine.scene().shape_count(), 2);
    assert_eq!(engine.scene().containers().len(), 1);
    assert_eq!(
        live_bar_rects(&engine),
        vec![
            (vec![0.0, 75.0, 8.0, 25.0], 1.0),
            (vec![12.0, 40.0, 8.0, 60.0], 1.0),
        ]
    );
}

#[test]
fn finished_transition_matches_a_from_scratch_render() {
    let before = [("g1", 30.0), ("g2", 55.0), ("g3", 12.0)];
    let after = [("g2", 70.0), ("g4", 44.0)];

    let mut animated = TransitionEngine::new(TransitionConfig::default());
    render_bars(&mut animated, false, &before);
    render_bars(&mut animated, true, &after);
    drive_to_completion(&mut animated);

    let mut from_scratch = TransitionEngine::new(TransitionConfig::default());
    render_bars(&mut from_scratch, false, &after);

    assert_eq!(live_bar_rects(&animated), live_bar_rects(&from_scratch));
    assert_eq!(
        animated.scene().shape_count(),
        from_scratch.scene().shape_count()
    );
}

#[test]
fn identical_data_commits_an_already_finished_timeline() {
    let data = [("g1", 40.0), ("g2", 10.0)];
    let mut engine = TransitionEngine::new(TransitionConfig::default());
    render_bars(&mut engine, false, &data);
    let baseline = live_bar_rects(&engine);

    let strategy = render_bars(&mut engine, true, &data);
    assert_eq!(strategy, CommitStrategy::ItemReconciliation);
    assert!(!engine.is_animating());

    let stats = engine.last_stats().expect("stats");
    assert_eq!(stats.updates, 2);
    assert_eq!(stats.unchanged, 2);
    assert_eq!(stats.inserts, 0);
    assert_eq!(stats.deletes, 0);

    // The finish event of a no-op transition is immediate.
    let fired = Rc::new(Cell::new(false));
    let observer = Rc::clone(&fired);
    engine.on_finish(move || observer.set(true));
    assert!(fired.get());

    assert_eq!(live_bar_rects(&engine), baseline);
    assert_eq!(engine.scene().containers().len(), 1);
}

#[test]
fn family_switch_falls_back_to_whole_scene_crossfade() {
    let mut engine = TransitionEngine::new(TransitionConfig::default());
    render_bars(&mut engine, false, &[("g1", 40.0), ("g2", 10.0)]);

    let options = RenderOptions::new(ChartFamily::Polar).with_animation(true);
    engine.begin_render(options).expect("begin_render");
    // Same identity keys as the cartesian render, but per-item matching
    // must not happen across families.
    let polar_bar = Shape::new(ShapeKind::PolarBar).with_property(
        props::SECTOR,
        AnimValue::array([50.0, 50.0, 10.0, 40.0, 0.0, 2.5]),
    );
    let peers = engine
        .build_peers(
            ShapeKind::PolarBar,
            vec![PeerSpec::new(IdentityKey::item("series-0", "g1"), polar_bar).with_value(40.0)],
        )
        .expect("build_peers");
    engine
        .reconcile_and_schedule(ShapeKind::PolarBar, peers)
        .expect("reconcile_and_schedule");

    let strategy = engine.commit().expect("commit");
    assert_eq!(strategy, CommitStrategy::CrossfadeFallback);
    assert_eq!(engine.last_stats().expect("stats").updates, 0);

    // Mid-flight both generations are visible: the old bars fade out in the
    // ghost container while the new slice fades in.
    assert!(!engine.tick(100.0));
    let scene = engine.scene();
    let live_opacity = scene
        .container_opacity(engine.live_container())
        .expect("live opacity");
    assert!(live_opacity > 0.0 && live_opacity < 1.0);
    assert_eq!(scene.shape_count(), 3);

    drive_to_completion(&mut engine);
    let scene = engine.scene();
    assert_eq!(scene.containers().len(), 1);
    assert_eq!(scene.shape_count(), 1);
    assert!(
        (scene
            .container_opacity(engine.live_container())
            .expect("live opacity")
            - 1.0)
            .abs()
            < 1e-12
    );
}

#[test]
fn new_render_fast_forwards_the_in_flight_transition() {
    let mut engine = TransitionEngine::new(TransitionConfig::default());
    render_bars(&mut engine, false, &[("g1", 40.0)]);
    render_bars(&mut engine, true, &[("g1", 80.0), ("g2", 20.0)]);

    // Advance partway so real interpolated state exists.
    assert!(!engine.tick(50.0));
    let finish_count = Rc::new(Cell::new(0u32));
    let observer = Rc::clone(&finish_count);
    engine.on_finish(move || observer.set(observer.get() + 1));
    assert_eq!(finish_count.get(), 0);

    // Starting the next render stops the old timeline synchronously; its
    // finish event fires exactly once, before the new render is built.
    engine
        .begin_render(RenderOptions::new(ChartFamily::Cartesian))
        .expect("begin_render");
    assert_eq!(finish_count.get(), 1);
    assert!(!engine.is_animating());

    let peers = engine
        .build_peers(ShapeKind::Bar, vec![bar_spec("g2", 0.0, 65.0)])
        .expect("build_peers");
    engine
        .reconcile_and_schedule(ShapeKind::Bar, peers)
        .expect("reconcile_and_schedule");
    engine.commit().expect("commit");
    drive_to_completion(&mut engine);
    assert_eq!(finish_count.get(), 1);

    let mut from_scratch = TransitionEngine::new(TransitionConfig::default());
    render_bars(&mut from_scratch, false, &[("g2", 65.0)]);
    assert_eq!(live_bar_rects(&engine), live_bar_rects(&from_scratch));
}

#[test]
fn stop_active_is_an_idempotent_fast_forward() {
    let mut engine = TransitionEngine::new(TransitionConfig::default());
    render_bars(&mut engine, false, &[("g1", 40.0)]);
    render_bars(&mut engine, true, &[("g1", 15.0)]);
    assert!(engine.is_animating());

    engine.stop_active();
    assert!(!engine.is_animating());
    let settled = live_bar_rects(&engine);
    assert_eq!(settled, vec![(vec![0.0, 85.0, 8.0, 15.0], 1.0)]);

    engine.stop_active();
    assert_eq!(live_bar_rects(&engine), settled);
    assert_eq!(engine.scene().containers().len(), 1);
}

#[test]
fn first_render_does_not_animate_by_default() {
    let mut engine = TransitionEngine::new(TransitionConfig::default());
    let strategy = render_bars(&mut engine, true, &[("g1", 40.0)]);
    assert_eq!(strategy, CommitStrategy::NoAnimation);
    assert!(!engine.is_animating());
    assert_eq!(live_bar_rects(&engine), vec![(vec![0.0, 60.0, 8.0, 40.0], 1.0)]);
}

#[test]
fn first_render_leaves_a_single_container() {
    let mut engine = TransitionEngine::new(TransitionConfig::default());
    render_bars(&mut engine, false, &[("g1", 40.0)]);

    // The construction-time container must not outlive the first render.
    let containers = engine.scene().containers();
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0], engine.live_container());
}

#[test]
fn kind_absent_from_the_new_render_still_animates_its_deletes() {
    let mut engine = TransitionEngine::new(TransitionConfig::default());

    // First render draws a bar plus a point marker.
    let options = RenderOptions::new(ChartFamily::Cartesian).with_animation(false);
    engine.begin_render(options).expect("begin_render");
    let bars = engine
        .build_peers(ShapeKind::Bar, vec![bar_spec("g1", 0.0, 40.0)])
        .expect("build_peers");
    engine
        .reconcile_and_schedule(ShapeKind::Bar, bars)
        .expect("reconcile_and_schedule");
    let marker = Shape::new(ShapeKind::PointMarker)
        .with_property(props::POS, AnimValue::array([0.0, 60.0]));
    let markers = engine
        .build_peers(
            ShapeKind::PointMarker,
            vec![PeerSpec::new(IdentityKey::item("series-1", "g1"), marker)],
        )
        .expect("build_peers");
    engine
        .reconcile_and_schedule(ShapeKind::PointMarker, markers)
        .expect("reconcile_and_schedule");
    engine.commit().expect("commit");
    assert_eq!(engine.scene().shape_count(), 2);

    // The next render never mentions the marker kind at all; its items are
    // wholesale deletions, not a silent teardown.
    let strategy = render_bars(&mut engine, true, &[("g1", 70.0)]);
    assert_eq!(strategy, CommitStrategy::ItemReconciliation);
    assert_eq!(engine.last_stats().expect("stats").deletes, 1);

    // Mid-flight the marker is still fading out in the overlay.
    assert!(!engine.tick(100.0));
    assert_eq!(engine.scene().shape_count(), 2);

    drive_to_completion(&mut engine);
    assert_eq!(engine.scene().shape_count(), 1);
    assert_eq!(engine.scene().containers().len(), 1);
}

#[test]
fn first_paint_animation_opts_into_a_fade_in() {
    let mut engine = TransitionEngine::new(TransitionConfig::default());
    let options = RenderOptions::new(ChartFamily::Cartesian)
        .with_animation(true)
        .with_first_paint_animation(true);
    engine.begin_render(options).expect("begin_render");
    let peers = engine
        .build_peers(ShapeKind::Bar, vec![bar_spec("g1", 0.0, 40.0)])
        .expect("build_peers");
    engine
        .reconcile_and_schedule(ShapeKind::Bar, peers)
        .expect("reconcile_and_schedule");
    let strategy = engine.commit().expect("commit");

    assert_eq!(strategy, CommitStrategy::CrossfadeFallback);
    assert!(engine.is_animating());
    drive_to_completion(&mut engine);
    assert_eq!(live_bar_rects(&engine), vec![(vec![0.0, 60.0, 8.0, 40.0], 1.0)]);
}

#[test]
fn animation_disabled_render_snaps_even_with_a_previous_state() {
    let mut engine = TransitionEngine::new(TransitionConfig::default());
    render_bars(&mut engine, false, &[("g1", 40.0)]);
    let strategy = render_bars(&mut engine, false, &[("g1", 90.0), ("g2", 5.0)]);

    assert_eq!(strategy, CommitStrategy::NoAnimation);
    assert!(!engine.is_animating());
    assert_eq!(
        live_bar_rects(&engine),
        vec![
            (vec![0.0, 10.0, 8.0, 90.0], 1.0),
            (vec![12.0, 95.0, 8.0, 5.0], 1.0),
        ]
    );
    assert_eq!(engine.scene().containers().len(), 1);
}

#[test]
fn zero_base_duration_completes_on_the_first_tick() {
    let config = TransitionConfig::default().with_base_duration_ms(0.0);
    let mut engine = TransitionEngine::new(config);
    render_bars(&mut engine, false, &[("g1", 40.0)]);
    let strategy = render_bars(&mut engine, true, &[("g1", 75.0)]);

    assert_eq!(strategy, CommitStrategy::ItemReconciliation);
    assert!(engine.tick(0.0));
    assert!(!engine.is_animating());
    assert_eq!(live_bar_rects(&engine), vec![(vec![0.0, 25.0, 8.0, 75.0], 1.0)]);
}

#[test]
fn insert_stagger_delays_new_items_behind_updates() {
    let config = TransitionConfig::default().with_insert_stagger_ms(500.0);
    let mut engine = TransitionEngine::new(config);
    render_bars(&mut engine, false, &[("g1", 40.0)]);
    render_bars(&mut engine, true, &[("g1", 80.0), ("g2", 50.0)]);

    // Update phase runs 300ms; after 400ms only the staggered insert is
    // still pending, with the new bar parked at its collapsed zero state.
    assert!(!engine.tick(400.0));
    let rects = live_bar_rects(&engine);
    assert_eq!(rects[0].0, vec![0.0, 20.0, 8.0, 80.0]);
    assert_eq!(rects[1].0, vec![12.0, 100.0, 8.0, 0.0]);

    drive_to_completion(&mut engine);
    assert_eq!(
        live_bar_rects(&engine),
        vec![
            (vec![0.0, 20.0, 8.0, 80.0], 1.0),
            (vec![12.0, 50.0, 8.0, 50.0], 1.0),
        ]
    );
}

#[test]
fn calls_outside_a_render_pass_are_rejected() {
    let mut engine = TransitionEngine::new(TransitionConfig::default());
    assert_eq!(engine.pending_strategy(), None);
    assert!(engine.build_peers(ShapeKind::Bar, Vec::new()).is_err());
    assert!(
        engine
            .reconcile_and_schedule(ShapeKind::Bar, Vec::new())
            .is_err()
    );
    assert!(engine.commit().is_err());

    engine
        .begin_render(RenderOptions::new(ChartFamily::Cartesian))
        .expect("begin_render");
    assert_eq!(engine.pending_strategy(), Some(CommitStrategy::NoAnimation));
    engine.commit().expect("commit");
    assert_eq!(engine.pending_strategy(), None);
}
