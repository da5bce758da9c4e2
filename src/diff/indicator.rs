use serde::{Deserialize, Serialize};

use crate::anim::{Phase, PhaseScheduler, PropertyTrack, Timeline, TrackTarget};
use crate::core::{AnimValue, Color, ContainerId, Scene, Shape, ShapeId, ShapeKind};
use crate::diff::{PhaseDurations, TrendRequest, props};
use crate::error::MotionResult;

/// Direction of a matched item's value change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Rising,
    Falling,
}

/// Styling and enablement for transient up/down glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendIndicatorStyle {
    pub enabled: bool,
    /// Pixel offset from the data point's anchor to the glyph center.
    pub offset_px: [f64; 2],
    pub size_px: f64,
    pub rise_fill: Color,
    pub fall_fill: Color,
}

impl Default for TrendIndicatorStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            offset_px: [0.0, -12.0],
            size_px: 8.0,
            rise_fill: Color::rgb(0.13, 0.69, 0.30),
            fall_fill: Color::rgb(0.86, 0.21, 0.27),
        }
    }
}

/// Spawns a transient trend glyph in the overlay, fading in on the Update
/// phase and removed from the scene when its timeline finishes.
///
/// Indicators have no identity of their own and are never reconciled.
pub fn spawn_trend_indicator(
    scheduler: &mut PhaseScheduler,
    scene: &mut Scene,
    overlay: ContainerId,
    request: TrendRequest,
    style: &TrendIndicatorStyle,
    durations: PhaseDurations,
) -> MotionResult<ShapeId> {
    let [anchor_x, anchor_y] = request.anchor;
    let center_x = anchor_x + style.offset_px[0];
    let center_y = anchor_y + style.offset_px[1];
    let half = style.size_px / 2.0;

    // Triangle pointing up for rising values, down for falling.
    let (apex_y, base_y, fill) = match request.direction {
        TrendDirection::Rising => (center_y - half, center_y + half, style.rise_fill),
        TrendDirection::Falling => (center_y + half, center_y - half, style.fall_fill),
    };
    let glyph = [
        center_x,
        apex_y,
        center_x - half,
        base_y,
        center_x + half,
        base_y,
    ];

    let shape = Shape::new(ShapeKind::TrendIndicator)
        .with_property(props::POINTS, AnimValue::array(glyph))
        .with_property(props::FILL, AnimValue::Color(fill))
        .with_opacity(0.0);
    let id = scene.spawn(overlay, shape)?;

    let mut timeline = Timeline::new(durations.update_ms).with_easing(durations.easing);
    timeline.push_track(PropertyTrack::new(
        TrackTarget::ShapeOpacity(id),
        AnimValue::Scalar(0.0),
        AnimValue::Scalar(1.0),
    ));
    timeline.on_finish(move |scene| {
        let _ = scene.remove_shape(id);
    });
    scheduler.add(Phase::Update, timeline);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::{TrendDirection, TrendIndicatorStyle, spawn_trend_indicator};
    use crate::anim::{Easing, Phase, PhaseScheduler};
    use crate::core::{AnimValue, Scene, ShapeKind};
    use crate::diff::{PhaseDurations, TrendRequest, props};

    #[test]
    fn rising_glyph_points_up_and_is_removed_on_finish() {
        let mut scene = Scene::new();
        let overlay = scene.add_container();
        let mut scheduler = PhaseScheduler::new(0.0);
        let style = TrendIndicatorStyle {
            enabled: true,
            ..TrendIndicatorStyle::default()
        };
        let durations = PhaseDurations::from_base(100.0, Easing::Linear);

        let id = spawn_trend_indicator(
            &mut scheduler,
            &mut scene,
            overlay,
            TrendRequest {
                direction: TrendDirection::Rising,
                anchor: [50.0, 100.0],
            },
            &style,
            durations,
        )
        .expect("spawn");

        assert_eq!(scene.shape(id).expect("shape").kind(), ShapeKind::TrendIndicator);
        assert_eq!(scene.shape(id).expect("shape").opacity(), 0.0);
        let glyph = scene
            .shape(id)
            .expect("shape")
            .property(props::POINTS)
            .and_then(AnimValue::as_array)
            .expect("glyph")
            .to_vec();
        // Apex above the base for the rising variant.
        assert!(glyph[1] < glyph[3]);
        assert_eq!(scheduler.phase_len(Phase::Update), 1);

        let mut combined = scheduler.into_combined();
        combined.play();
        assert!(combined.tick(durations.update_ms + 1.0, &mut scene));
        // Removed, not merely hidden.
        assert!(!scene.contains(id));
    }

    #[test]
    fn falling_glyph_points_down() {
        let mut scene = Scene::new();
        let overlay = scene.add_container();
        let mut scheduler = PhaseScheduler::new(0.0);
        let id = spawn_trend_indicator(
            &mut scheduler,
            &mut scene,
            overlay,
            TrendRequest {
                direction: TrendDirection::Falling,
                anchor: [0.0, 0.0],
            },
            &TrendIndicatorStyle::default(),
            PhaseDurations::from_base(100.0, Easing::Linear),
        )
        .expect("spawn");
        let glyph = scene
            .shape(id)
            .expect("shape")
            .property(props::POINTS)
            .and_then(AnimValue::as_array)
            .expect("glyph")
            .to_vec();
        assert!(glyph[1] > glyph[3]);
    }
}
