use serde::{Deserialize, Serialize};

use crate::anim::Easing;
use crate::core::{ChartFamily, Orientation};
use crate::diff::{PhaseDurations, TrendIndicatorStyle};
use crate::error::{MotionError, MotionResult};

/// Engine-wide transition tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Base duration the per-phase durations derive from.
    pub base_duration_ms: f64,
    /// Delay before Insert-phase members start, so new elements emerge from
    /// the settling scene instead of popping in alongside it.
    pub insert_stagger_ms: f64,
    pub easing: Easing,
    pub indicators: TrendIndicatorStyle,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            base_duration_ms: 400.0,
            insert_stagger_ms: 0.0,
            easing: Easing::default(),
            indicators: TrendIndicatorStyle::default(),
        }
    }
}

impl TransitionConfig {
    #[must_use]
    pub fn with_base_duration_ms(mut self, base_duration_ms: f64) -> Self {
        self.base_duration_ms = base_duration_ms.max(0.0);
        self
    }

    #[must_use]
    pub fn with_insert_stagger_ms(mut self, insert_stagger_ms: f64) -> Self {
        self.insert_stagger_ms = insert_stagger_ms.max(0.0);
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn with_indicators(mut self, indicators: TrendIndicatorStyle) -> Self {
        self.indicators = indicators;
        self
    }

    #[must_use]
    pub fn phase_durations(&self) -> PhaseDurations {
        PhaseDurations::from_base(self.base_duration_ms, self.easing)
    }

    /// Serializes the config to pretty JSON for host settings persistence.
    pub fn to_json_pretty(self) -> MotionResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| MotionError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> MotionResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| MotionError::InvalidData(format!("failed to parse config: {e}")))
    }
}

/// Per-render request the surrounding renderer hands to `begin_render`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub family: ChartFamily,
    pub orientation: Orientation,
    /// When false the new scene is swapped in synchronously.
    pub animate: bool,
    /// Requests a display animation on the very first paint
    /// (whole-scene fade-in; there is nothing to reconcile against).
    pub first_paint_animation: bool,
}

impl RenderOptions {
    #[must_use]
    pub fn new(family: ChartFamily) -> Self {
        Self {
            family,
            orientation: Orientation::default(),
            animate: true,
            first_paint_animation: false,
        }
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_animation(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    #[must_use]
    pub fn with_first_paint_animation(mut self, first_paint_animation: bool) -> Self {
        self.first_paint_animation = first_paint_animation;
        self
    }
}
