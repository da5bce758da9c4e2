//! Per-kind diff handlers: the strategies that turn one peer's insert,
//! update or delete into concrete timeline tracks.
//!
//! Dispatch happens once, on the shape's kind tag, when a handler is built;
//! the scheduler never inspects shape structure.

pub mod bar;
pub mod candlestick;
pub mod indicator;
pub mod line;
pub mod marker;
pub mod slice;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::anim::{Easing, Phase, PhaseScheduler, PropertyTrack, Timeline, TrackTarget};
use crate::core::{AnimValue, ContainerId, Orientation, Peer, Scene, ShapeKind, ShapeTarget};
use crate::error::{MotionError, MotionResult};

pub use bar::{BarHandler, PolarBarHandler};
pub use candlestick::CandlestickHandler;
pub use indicator::{TrendDirection, TrendIndicatorStyle, spawn_trend_indicator};
pub use line::LineAreaHandler;
pub use marker::{PointMarkerHandler, RangeMarkerHandler};
pub use slice::{FunnelSliceHandler, PieSliceHandler};

/// Canonical animatable property names shared by handlers and hosts.
pub mod props {
    /// `[x, y, width, height]` pixel rectangle.
    pub const RECT: &str = "rect";
    /// `[cx, cy, r_inner, r_outer, start_angle, end_angle]` annular sector.
    pub const SECTOR: &str = "sector";
    /// `[x, y_top, y_bottom]` candlestick wick segment.
    pub const WICK: &str = "wick";
    /// Flat `[x, y]` pairs of a line/area polyline.
    pub const POINTS: &str = "points";
    /// `[x, y]` marker position.
    pub const POS: &str = "pos";
    /// `[pos, low, high]` range extent along the growth axis.
    pub const SPAN: &str = "span";
    /// `[cx, cy, rx, ry, start_angle, sweep]` pie slice parameters.
    pub const SLICE: &str = "slice";
    /// `[y_top, y_bottom, half_width_top, half_width_bottom, cx]` funnel band.
    pub const BAND: &str = "band";
    /// Fill color.
    pub const FILL: &str = "fill";
    /// Scalar pixel coordinate of the value-axis baseline.
    pub const BASELINE: &str = "baseline";
}

/// Per-phase animation durations derived from one configured base duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub insert_ms: f64,
    pub update_ms: f64,
    pub delete_ms: f64,
    pub easing: Easing,
}

impl PhaseDurations {
    #[must_use]
    pub fn from_base(base_ms: f64, easing: Easing) -> Self {
        let base_ms = base_ms.max(0.0);
        Self {
            insert_ms: base_ms * Phase::Insert.duration_factor(),
            update_ms: base_ms * Phase::Update.duration_factor(),
            delete_ms: base_ms * Phase::Delete.duration_factor(),
            easing,
        }
    }
}

/// Construction-time context shared by every handler of one render.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext {
    pub durations: PhaseDurations,
    pub orientation: Orientation,
}

/// Result of one `animate_update` call, consumed by reconcile statistics and
/// the trend-indicator generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateEffect {
    pub registered: bool,
    pub degraded: bool,
    pub trend: Option<TrendRequest>,
}

impl UpdateEffect {
    #[must_use]
    pub const fn unchanged() -> Self {
        Self {
            registered: false,
            degraded: false,
            trend: None,
        }
    }
}

/// Request to synthesize an up/down glyph at the new geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendRequest {
    pub direction: TrendDirection,
    pub anchor: [f64; 2],
}

/// Strategy producing insert/update/delete animations for one peer.
///
/// A handler wraps exactly one peer, is consumed by exactly one of the three
/// animate calls, and is discarded after. Kinds customize the zero state,
/// the indicator anchor, and array alignment; the phased timeline plumbing
/// is shared.
pub trait DiffHandler {
    fn peer(&self) -> &Peer;

    fn context(&self) -> &HandlerContext;

    /// Deterministic "zero" property state for one target: insert animations
    /// start here, delete animations end here.
    fn zero_state(&self, target: &ShapeTarget) -> IndexMap<String, AnimValue>;

    /// Opacity at the zero state. Solid geometry stays opaque while it
    /// collapses; markers fade instead.
    fn zero_opacity(&self) -> f64 {
        1.0
    }

    /// Anchor point for trend-indicator placement, from the final geometry.
    fn anchor(&self) -> Option<[f64; 2]> {
        None
    }

    /// Per-kind reshaping of one start/end pair before a track is built
    /// (line/area point alignment). Default is passthrough.
    fn align_track(&self, property: &str, start: AnimValue, end: AnimValue) -> (AnimValue, AnimValue) {
        let _ = property;
        (start, end)
    }

    /// Initializes the peer's shapes to the kind's zero state and registers
    /// a timeline to the real geometry on the Insert phase.
    fn animate_insert(
        &self,
        scheduler: &mut PhaseScheduler,
        scene: &mut Scene,
    ) -> MotionResult<()> {
        let context = self.context();
        let mut timeline =
            Timeline::new(context.durations.insert_ms).with_easing(context.durations.easing);

        for target in &self.peer().targets {
            let zero = self.zero_state(target);
            let shape = scene.shape_mut(target.shape)?;
            for (name, value) in &zero {
                shape.set_property(name.clone(), value.clone());
            }
            let zero_opacity = self.zero_opacity();
            shape.set_opacity(zero_opacity);

            for (name, end) in &target.properties {
                let Some(start) = zero.get(name) else {
                    continue;
                };
                if start == end {
                    continue;
                }
                timeline.push_track(PropertyTrack::new(
                    TrackTarget::ShapeProperty {
                        shape: target.shape,
                        property: name.clone(),
                    },
                    start.clone(),
                    end.clone(),
                ));
            }
            if zero_opacity != target.opacity {
                timeline.push_track(PropertyTrack::new(
                    TrackTarget::ShapeOpacity(target.shape),
                    AnimValue::Scalar(zero_opacity),
                    AnimValue::Scalar(target.opacity),
                ));
            }
        }

        if timeline.has_tracks() {
            scheduler.add(Phase::Insert, timeline);
        }
        Ok(())
    }

    /// Morphs the new shape from the old peer's captured state to the new
    /// target state. Registers nothing when the two states are identical;
    /// degrades to an opacity-only crossfade when they are structurally
    /// incompatible.
    fn animate_update(
        &self,
        scheduler: &mut PhaseScheduler,
        scene: &mut Scene,
        old: &Peer,
    ) -> MotionResult<UpdateEffect> {
        let new = self.peer();
        if new.same_visual(old) {
            return Ok(UpdateEffect::unchanged());
        }

        let context = self.context();
        let mut timeline =
            Timeline::new(context.durations.update_ms).with_easing(context.durations.easing);

        let degraded = old.targets.len() != new.targets.len()
            || old
                .targets
                .iter()
                .zip(new.targets.iter())
                .any(|(old_target, new_target)| {
                    new_target.properties.iter().any(|(name, end)| {
                        old_target.properties.get(name).is_some_and(|start| {
                            let (start, end) =
                                self.align_track(name, start.clone(), end.clone());
                            start != end && start.lerp(&end, 0.0).is_none()
                        })
                    })
                });

        if degraded {
            // Geometry interpolation is optional; opacity is always available.
            for target in &new.targets {
                scene.shape_mut(target.shape)?.set_opacity(0.0);
                timeline.push_track(PropertyTrack::new(
                    TrackTarget::ShapeOpacity(target.shape),
                    AnimValue::Scalar(0.0),
                    AnimValue::Scalar(target.opacity),
                ));
            }
        } else {
            for (old_target, new_target) in old.targets.iter().zip(new.targets.iter()) {
                for (name, end) in &new_target.properties {
                    let Some(start) = old_target.properties.get(name) else {
                        continue;
                    };
                    if start == end {
                        continue;
                    }
                    let (start, aligned_end) = self.align_track(name, start.clone(), end.clone());
                    if start == aligned_end {
                        continue;
                    }
                    scene
                        .shape_mut(new_target.shape)?
                        .set_property(name.clone(), start.clone());
                    if aligned_end != *end {
                        // Dummy-padded end arrays are a transition artifact;
                        // the finished scene must carry the exact new value.
                        let shape = new_target.shape;
                        let property = name.clone();
                        let exact = end.clone();
                        timeline.on_finish(move |scene| {
                            if let Ok(entry) = scene.shape_mut(shape) {
                                entry.set_property(property, exact);
                            }
                        });
                    }
                    timeline.push_track(PropertyTrack::new(
                        TrackTarget::ShapeProperty {
                            shape: new_target.shape,
                            property: name.clone(),
                        },
                        start,
                        aligned_end,
                    ));
                }
                if old_target.opacity != new_target.opacity {
                    scene
                        .shape_mut(new_target.shape)?
                        .set_opacity(old_target.opacity);
                    timeline.push_track(PropertyTrack::new(
                        TrackTarget::ShapeOpacity(new_target.shape),
                        AnimValue::Scalar(old_target.opacity),
                        AnimValue::Scalar(new_target.opacity),
                    ));
                }
            }
        }

        if !timeline.has_tracks() {
            return Ok(UpdateEffect::unchanged());
        }

        let trend = match (old.value, new.value) {
            (Some(before), Some(after)) if after > before => Some(TrendDirection::Rising),
            (Some(before), Some(after)) if after < before => Some(TrendDirection::Falling),
            _ => None,
        };
        let trend = trend.zip(self.anchor()).map(|(direction, anchor)| TrendRequest {
            direction,
            anchor,
        });

        scheduler.add(Phase::Update, timeline);
        Ok(UpdateEffect {
            registered: true,
            degraded,
            trend,
        })
    }

    /// Re-parents the peer's shapes into the overlay, shrinks them to the
    /// zero state while fading out, and removes them permanently on finish.
    ///
    /// The zero state is computed from the peer's captured (old-render)
    /// property tables, never from new-render geometry.
    fn animate_delete(
        &self,
        scheduler: &mut PhaseScheduler,
        scene: &mut Scene,
        overlay: ContainerId,
    ) -> MotionResult<()> {
        let context = self.context();
        let mut timeline =
            Timeline::new(context.durations.delete_ms).with_easing(context.durations.easing);

        for target in &self.peer().targets {
            scene.reparent(target.shape, overlay)?;
            let zero = self.zero_state(target);
            for (name, start) in &target.properties {
                let Some(end) = zero.get(name) else {
                    continue;
                };
                if start == end {
                    continue;
                }
                timeline.push_track(PropertyTrack::new(
                    TrackTarget::ShapeProperty {
                        shape: target.shape,
                        property: name.clone(),
                    },
                    start.clone(),
                    end.clone(),
                ));
            }
            timeline.push_track(PropertyTrack::new(
                TrackTarget::ShapeOpacity(target.shape),
                AnimValue::Scalar(target.opacity),
                AnimValue::Scalar(0.0),
            ));
            let id = target.shape;
            timeline.on_finish(move |scene| {
                let _ = scene.remove_shape(id);
            });
        }

        scheduler.add(Phase::Delete, timeline);
        Ok(())
    }
}

/// Builds the handler variant for a peer's kind.
pub fn handler_for(peer: Peer, context: HandlerContext) -> MotionResult<Box<dyn DiffHandler>> {
    if peer.targets.is_empty() {
        return Err(MotionError::InvalidData(format!(
            "peer {:?} has no shape targets",
            peer.key
        )));
    }
    Ok(match peer.kind {
        ShapeKind::Bar => Box::new(BarHandler::new(peer, context)),
        ShapeKind::PolarBar => Box::new(PolarBarHandler::new(peer, context)),
        ShapeKind::Candlestick => Box::new(CandlestickHandler::new(peer, context)),
        ShapeKind::Line | ShapeKind::Area => Box::new(LineAreaHandler::new(peer, context)),
        ShapeKind::PointMarker => Box::new(PointMarkerHandler::new(peer, context)),
        ShapeKind::RangeMarker => Box::new(RangeMarkerHandler::new(peer, context)),
        ShapeKind::PieSlice => Box::new(PieSliceHandler::new(peer, context)),
        ShapeKind::FunnelSlice => Box::new(FunnelSliceHandler::new(peer, context)),
        ShapeKind::TrendIndicator => {
            return Err(MotionError::InvalidData(
                "trend indicators are transient and never reconciled".to_owned(),
            ));
        }
    })
}
