use std::fmt;

use tracing::{trace, warn};

use crate::anim::Easing;
use crate::core::{AnimValue, ContainerId, Scene, ShapeId};

/// Addressing for one interpolated property.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackTarget {
    ShapeProperty { shape: ShapeId, property: String },
    ShapeOpacity(ShapeId),
    ContainerOpacity(ContainerId),
}

/// One start → end interpolation over a single property.
#[derive(Debug, Clone)]
pub struct PropertyTrack {
    pub target: TrackTarget,
    pub start: AnimValue,
    pub end: AnimValue,
    degraded: bool,
}

impl PropertyTrack {
    #[must_use]
    pub fn new(target: TrackTarget, start: AnimValue, end: AnimValue) -> Self {
        Self {
            target,
            start,
            end,
            degraded: false,
        }
    }
}

type FinishHook = Box<dyn FnOnce(&mut Scene)>;

/// A cancelable, time-driven unit of animated change over the properties of
/// one shape (or a container's opacity).
///
/// Timelines never advance on their own; the owning scheduler ticks them.
/// Stopping is fast-forwarding: every track lands on its end value and the
/// finish hooks run exactly once.
pub struct Timeline {
    tracks: Vec<PropertyTrack>,
    duration_ms: f64,
    delay_ms: f64,
    easing: Easing,
    elapsed_ms: f64,
    finished: bool,
    finish_hooks: Vec<FinishHook>,
}

impl Timeline {
    #[must_use]
    pub fn new(duration_ms: f64) -> Self {
        Self {
            tracks: Vec::new(),
            duration_ms,
            delay_ms: 0.0,
            easing: Easing::default(),
            elapsed_ms: 0.0,
            finished: false,
            finish_hooks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn set_delay_ms(&mut self, delay_ms: f64) {
        self.delay_ms = delay_ms.max(0.0);
    }

    pub fn push_track(&mut self, track: PropertyTrack) {
        self.tracks.push(track);
    }

    /// Registers a cleanup closure that runs exactly once when the timeline
    /// finishes naturally or is fast-forwarded.
    pub fn on_finish(&mut self, hook: impl FnOnce(&mut Scene) + 'static) {
        self.finish_hooks.push(Box::new(hook));
    }

    #[must_use]
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    #[must_use]
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub const fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Advances by `dt_ms` and applies interpolated values. Returns `true`
    /// once the timeline has finished (including on calls after that).
    pub fn tick(&mut self, dt_ms: f64, scene: &mut Scene) -> bool {
        if self.finished {
            return true;
        }
        if dt_ms > 0.0 {
            self.elapsed_ms += dt_ms;
        }

        let active_ms = self.elapsed_ms - self.delay_ms;
        if active_ms < 0.0 {
            return false;
        }

        let progress = if self.duration_ms <= 0.0 {
            1.0
        } else {
            (active_ms / self.duration_ms).clamp(0.0, 1.0)
        };

        if progress >= 1.0 {
            self.apply(1.0, scene);
            self.finish(scene);
        } else {
            self.apply(self.easing.apply(progress), scene);
        }
        self.finished
    }

    /// Jumps every track to its end state and runs pending hooks.
    /// Idempotent and safe to call at any time, including twice.
    pub fn fast_forward(&mut self, scene: &mut Scene) {
        if self.finished {
            return;
        }
        self.apply(1.0, scene);
        self.finish(scene);
    }

    fn finish(&mut self, scene: &mut Scene) {
        self.finished = true;
        for hook in self.finish_hooks.drain(..) {
            hook(scene);
        }
    }

    fn apply(&mut self, eased: f64, scene: &mut Scene) {
        for track in &mut self.tracks {
            // At completion the scene must carry the exact end value, not a
            // floating-point reconstruction of it.
            if eased >= 1.0 {
                Self::write(&track.target, track.end.clone(), scene);
                continue;
            }
            let value = match track.start.lerp(&track.end, eased) {
                Some(value) => value,
                None => {
                    // One malformed item must not abort the whole chart's
                    // animation: snap this track to its end state.
                    if !track.degraded {
                        track.degraded = true;
                        warn!(target: "chart_motion::anim", track_target = ?track.target,
                            "incompatible track endpoints, snapping to end state");
                    }
                    track.end.clone()
                }
            };
            Self::write(&track.target, value, scene);
        }
    }

    fn write(target: &TrackTarget, value: AnimValue, scene: &mut Scene) {
        match target {
            TrackTarget::ShapeProperty { shape, property } => {
                if let Ok(entry) = scene.shape_mut(*shape) {
                    entry.set_property(property.clone(), value);
                } else {
                    trace!(target: "chart_motion::anim", ?shape, "track target no longer in scene");
                }
            }
            TrackTarget::ShapeOpacity(shape) => {
                if let (Ok(entry), Some(opacity)) = (scene.shape_mut(*shape), value.as_scalar()) {
                    entry.set_opacity(opacity);
                }
            }
            TrackTarget::ContainerOpacity(container) => {
                if let Some(opacity) = value.as_scalar() {
                    let _ = scene.set_container_opacity(*container, opacity);
                }
            }
        }
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("tracks", &self.tracks.len())
            .field("duration_ms", &self.duration_ms)
            .field("delay_ms", &self.delay_ms)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("finished", &self.finished)
            .field("finish_hooks", &self.finish_hooks.len())
            .finish()
    }
}
