use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::anim::{CombinedTimeline, Phase, PhaseScheduler, PropertyTrack, Timeline, TrackTarget};
use crate::api::{
    CommitStrategy, ReconcileStats, RenderOptions, RenderSnapshot, TransitionConfig,
    choose_strategy, reconcile, session::AnimationSession,
};
use crate::core::{AnimValue, ContainerId, IdentityKey, Peer, Scene, Shape, ShapeKind};
use crate::diff::{HandlerContext, handler_for, spawn_trend_indicator};
use crate::error::{MotionError, MotionResult};

/// Shape set and value for one logical data point of the upcoming render.
///
/// The renderer computes final pixel geometry elsewhere; specs carry it into
/// `build_peers`, which spawns the shapes and returns the new peer list.
#[derive(Debug, Clone)]
pub struct PeerSpec {
    pub key: IdentityKey,
    pub shapes: Vec<Shape>,
    pub value: Option<f64>,
}

impl PeerSpec {
    #[must_use]
    pub fn new(key: IdentityKey, shape: Shape) -> Self {
        Self {
            key,
            shapes: vec![shape],
            value: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Adds a co-located shape (e.g. a candlestick's wick).
    #[must_use]
    pub fn with_aux_shape(mut self, shape: Shape) -> Self {
        self.shapes.push(shape);
        self
    }
}

/// Reconciliation engine for one chart instance.
///
/// Owns the retained scene and drives at most one combined timeline at a
/// time. A render is four calls: `begin_render`, `build_peers` per kind,
/// `reconcile_and_schedule` per kind, `commit`; the host then pumps `tick`
/// from its frame loop until `is_animating` turns false.
pub struct TransitionEngine {
    scene: Scene,
    config: TransitionConfig,
    live: ContainerId,
    live_options: Option<RenderOptions>,
    live_peers: IndexMap<ShapeKind, Vec<Peer>>,
    session: Option<AnimationSession>,
    active: Option<CombinedTimeline>,
    last_stats: Option<ReconcileStats>,
}

impl TransitionEngine {
    #[must_use]
    pub fn new(config: TransitionConfig) -> Self {
        let mut scene = Scene::new();
        let live = scene.add_container();
        Self {
            scene,
            config,
            live,
            live_options: None,
            live_peers: IndexMap::new(),
            session: None,
            active: None,
            last_stats: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &TransitionConfig {
        &self.config
    }

    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub const fn live_container(&self) -> ContainerId {
        self.live
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.active.as_ref().is_some_and(|active| !active.is_finished())
    }

    /// Strategy of the render currently being built, if any.
    #[must_use]
    pub fn pending_strategy(&self) -> Option<CommitStrategy> {
        self.session.as_ref().map(AnimationSession::strategy)
    }

    /// Counters of the most recently committed render.
    #[must_use]
    pub const fn last_stats(&self) -> Option<&ReconcileStats> {
        self.last_stats.as_ref()
    }

    /// Starts a new render: stops any in-flight timeline synchronously,
    /// snapshots the previous state, chooses the commit strategy and rotates
    /// the scene containers.
    pub fn begin_render(&mut self, options: RenderOptions) -> MotionResult<()> {
        self.stop_active();

        let snapshot = self.capture_snapshot()?;
        let strategy = choose_strategy(snapshot.as_ref(), &options);
        debug!(?strategy, family = ?options.family, "begin render");

        let ghost = if self.live_options.is_some() {
            Some(self.live)
        } else {
            // The construction-time container never held a committed render;
            // dropping it here keeps the container set equal to a fresh
            // engine's after the transition settles.
            let _ = self.scene.remove_container(self.live);
            None
        };
        self.live = self.scene.add_container();
        let overlay = self.scene.add_container();
        self.live_peers.clear();
        self.live_options = Some(options);

        self.session = Some(AnimationSession::new(
            strategy,
            options,
            PhaseScheduler::new(self.config.insert_stagger_ms),
            snapshot,
            ghost,
            overlay,
        ));
        Ok(())
    }

    /// Spawns the shapes of one kind's data items into the live container
    /// and returns the new peer list, in item order.
    pub fn build_peers(
        &mut self,
        kind: ShapeKind,
        specs: Vec<PeerSpec>,
    ) -> MotionResult<Vec<Peer>> {
        if self.session.is_none() {
            return Err(MotionError::NoActiveRender("build_peers"));
        }
        let mut peers = Vec::with_capacity(specs.len());
        for spec in specs {
            let mut shape_ids = Vec::with_capacity(spec.shapes.len());
            for shape in spec.shapes {
                shape_ids.push(self.scene.spawn(self.live, shape)?);
            }
            peers.push(Peer::capture(
                spec.key,
                kind,
                &shape_ids,
                &self.scene,
                spec.value,
            )?);
        }
        trace!(?kind, count = peers.len(), "built peers");
        Ok(peers)
    }

    /// Reconciles one kind against the snapshot lane and schedules its
    /// timelines. Under a non-item strategy this only records the peers for
    /// the next snapshot.
    pub fn reconcile_and_schedule(
        &mut self,
        kind: ShapeKind,
        new_peers: Vec<Peer>,
    ) -> MotionResult<()> {
        let session = self
            .session
            .as_mut()
            .ok_or(MotionError::NoActiveRender("reconcile_and_schedule"))?;

        self.live_peers
            .entry(kind)
            .or_default()
            .extend(new_peers.iter().cloned());

        if session.strategy != CommitStrategy::ItemReconciliation {
            return Ok(());
        }

        let old_peers = session
            .snapshot
            .as_mut()
            .map(|snapshot| snapshot.take_lane(kind))
            .unwrap_or_default();
        let outcome = reconcile(old_peers, new_peers);
        session.stats.absorb(&outcome);

        let context = HandlerContext {
            durations: self.config.phase_durations(),
            orientation: session.options.orientation,
        };
        let overlay = session.overlay;
        let scheduler = &mut session.scheduler;
        let stats = &mut session.stats;

        for (old_peer, new_peer) in outcome.updates {
            let key = new_peer.key.clone();
            match handler_for(new_peer, context)
                .and_then(|handler| handler.animate_update(scheduler, &mut self.scene, &old_peer))
            {
                Ok(effect) => {
                    if !effect.registered {
                        stats.unchanged += 1;
                    }
                    if effect.degraded {
                        // Structurally incompatible geometry crosses over by
                        // opacity: the old shape keeps rendering in the
                        // overlay while the replacement fades in.
                        stats.degraded += 1;
                        let mut fade = Timeline::new(context.durations.update_ms)
                            .with_easing(context.durations.easing);
                        for target in &old_peer.targets {
                            if self.scene.reparent(target.shape, overlay).is_err() {
                                continue;
                            }
                            fade.push_track(PropertyTrack::new(
                                TrackTarget::ShapeOpacity(target.shape),
                                AnimValue::Scalar(target.opacity),
                                AnimValue::Scalar(0.0),
                            ));
                            let id = target.shape;
                            fade.on_finish(move |scene| {
                                let _ = scene.remove_shape(id);
                            });
                        }
                        if fade.has_tracks() {
                            scheduler.add(Phase::Update, fade);
                        }
                    } else {
                        // The new shape morphs from the old geometry; the
                        // old shape is replaced immediately.
                        for id in old_peer.shape_ids() {
                            let _ = self.scene.remove_shape(id);
                        }
                    }
                    if self.config.indicators.enabled
                        && let Some(request) = effect.trend
                        && let Err(err) = spawn_trend_indicator(
                            scheduler,
                            &mut self.scene,
                            overlay,
                            request,
                            &self.config.indicators,
                            context.durations,
                        )
                    {
                        warn!(error = %err, ?key, "skipping trend indicator");
                    }
                }
                Err(err) => {
                    stats.snapped += 1;
                    for id in old_peer.shape_ids() {
                        let _ = self.scene.remove_shape(id);
                    }
                    warn!(error = %err, ?key, "update animation failed, item snaps to end state");
                }
            }
        }

        for peer in outcome.inserts {
            // Fresh items render above continuously-updated ones.
            for id in peer.shape_ids() {
                let _ = self.scene.raise_to_top(id);
            }
            let key = peer.key.clone();
            if let Err(err) = handler_for(peer, context)
                .and_then(|handler| handler.animate_insert(scheduler, &mut self.scene))
            {
                stats.snapped += 1;
                warn!(error = %err, ?key, "insert animation failed, item snaps to end state");
            }
        }

        for peer in outcome.deletes {
            let key = peer.key.clone();
            let shape_ids: Vec<_> = peer.shape_ids().collect();
            if let Err(err) = handler_for(peer, context)
                .and_then(|handler| handler.animate_delete(scheduler, &mut self.scene, overlay))
            {
                stats.snapped += 1;
                warn!(error = %err, ?key, "delete animation failed, removing item synchronously");
                for id in shape_ids {
                    let _ = self.scene.remove_shape(id);
                }
            }
        }

        Ok(())
    }

    /// Finalizes the render into the single combined timeline and starts it.
    ///
    /// Regardless of strategy, once that timeline reports finished the scene
    /// is identical to a synchronous, non-animated render of the new data.
    pub fn commit(&mut self) -> MotionResult<CommitStrategy> {
        let session = self
            .session
            .take()
            .ok_or(MotionError::NoActiveRender("commit"))?;
        let AnimationSession {
            strategy,
            options,
            mut scheduler,
            snapshot,
            ghost,
            overlay,
            mut stats,
        } = session;

        let mut combined = match strategy {
            CommitStrategy::NoAnimation => {
                if let Some(ghost) = ghost {
                    let _ = self.scene.remove_container(ghost);
                }
                let _ = self.scene.remove_container(overlay);
                CombinedTimeline::already_finished()
            }
            CommitStrategy::ItemReconciliation => {
                // Whatever the reconciler did not claim belongs to kinds the
                // new render no longer produces; those items still get their
                // delete animation.
                if let Some(mut snapshot) = snapshot {
                    let context = HandlerContext {
                        durations: self.config.phase_durations(),
                        orientation: options.orientation,
                    };
                    for peer in snapshot.drain() {
                        stats.deletes += 1;
                        let key = peer.key.clone();
                        let shape_ids: Vec<_> = peer.shape_ids().collect();
                        if let Err(err) = handler_for(peer, context).and_then(|handler| {
                            handler.animate_delete(&mut scheduler, &mut self.scene, overlay)
                        }) {
                            stats.snapped += 1;
                            warn!(error = %err, ?key, "delete animation failed, removing item synchronously");
                            for id in shape_ids {
                                let _ = self.scene.remove_shape(id);
                            }
                        }
                    }
                }
                if let Some(ghost) = ghost {
                    let _ = self.scene.remove_container(ghost);
                }
                if scheduler.is_empty() {
                    let _ = self.scene.remove_container(overlay);
                    CombinedTimeline::already_finished()
                } else {
                    let mut combined = scheduler.into_combined();
                    combined.on_finish_cleanup(move |scene| {
                        let _ = scene.remove_container(overlay);
                    });
                    combined
                }
            }
            CommitStrategy::CrossfadeFallback => {
                let durations = self.config.phase_durations();
                let mut timeline =
                    Timeline::new(durations.update_ms).with_easing(durations.easing);
                if let Some(ghost) = ghost {
                    timeline.push_track(PropertyTrack::new(
                        TrackTarget::ContainerOpacity(ghost),
                        AnimValue::Scalar(1.0),
                        AnimValue::Scalar(0.0),
                    ));
                    timeline.on_finish(move |scene| {
                        let _ = scene.remove_container(ghost);
                    });
                }
                self.scene.set_container_opacity(self.live, 0.0)?;
                timeline.push_track(PropertyTrack::new(
                    TrackTarget::ContainerOpacity(self.live),
                    AnimValue::Scalar(0.0),
                    AnimValue::Scalar(1.0),
                ));
                scheduler.add(Phase::Update, timeline);
                let mut combined = scheduler.into_combined();
                combined.on_finish_cleanup(move |scene| {
                    let _ = scene.remove_container(overlay);
                });
                combined
            }
        };

        debug!(
            ?strategy,
            updates = stats.updates,
            inserts = stats.inserts,
            deletes = stats.deletes,
            unchanged = stats.unchanged,
            degraded = stats.degraded,
            snapped = stats.snapped,
            members = combined.member_count(),
            "commit render"
        );
        self.last_stats = Some(stats);

        combined.play();
        self.active = Some(combined);
        Ok(strategy)
    }

    /// Advances the active timeline from the host frame loop.
    /// Returns `true` when no animation remains in flight.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        match self.active.as_mut() {
            Some(active) => {
                let finished = active.tick(dt_ms, &mut self.scene);
                if finished {
                    self.active = None;
                }
                finished
            }
            None => true,
        }
    }

    /// Fast-forwards any in-flight timeline to its end state.
    /// Safe to call at any time, including twice.
    pub fn stop_active(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.stop(&mut self.scene);
        }
    }

    /// Notifies once when the current transition completes; fires
    /// immediately when nothing is animating.
    pub fn on_finish(&mut self, observer: impl FnOnce() + 'static) {
        match self.active.as_mut() {
            Some(active) => active.on_finish(observer),
            None => observer(),
        }
    }

    fn capture_snapshot(&self) -> MotionResult<Option<RenderSnapshot>> {
        let Some(options) = self.live_options else {
            return Ok(None);
        };
        let mut lanes: IndexMap<ShapeKind, Vec<Peer>> =
            IndexMap::with_capacity(self.live_peers.len());
        for (&kind, peers) in &self.live_peers {
            let mut captured = Vec::with_capacity(peers.len());
            for peer in peers {
                let shape_ids: Vec<_> = peer.shape_ids().collect();
                if shape_ids.iter().any(|&id| !self.scene.contains(id)) {
                    trace!(key = ?peer.key, "peer shape left the scene, dropping from snapshot");
                    continue;
                }
                captured.push(Peer::capture(
                    peer.key.clone(),
                    kind,
                    &shape_ids,
                    &self.scene,
                    peer.value,
                )?);
            }
            lanes.insert(kind, captured);
        }
        Ok(Some(RenderSnapshot::new(
            lanes,
            options.family,
            options.orientation,
        )))
    }
}

impl Drop for TransitionEngine {
    // Tear-down must not leave pending cleanup against removed shapes.
    fn drop(&mut self) {
        self.stop_active();
    }
}
