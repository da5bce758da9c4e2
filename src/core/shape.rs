use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::AnimValue;

/// Kind tag for every renderable the engine can reconcile.
///
/// Diff-handler dispatch happens once, on this tag, at peer construction
/// time; nothing downstream inspects concrete shape structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Bar,
    PolarBar,
    Candlestick,
    Line,
    Area,
    PointMarker,
    RangeMarker,
    PieSlice,
    FunnelSlice,
    /// Transient up/down glyph; never reconciled across renders.
    TrendIndicator,
}

/// Broad chart family used for the commit controller's compatibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartFamily {
    Cartesian,
    Polar,
    Radial,
}

/// Growth axis of cartesian bars and ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl ShapeKind {
    #[must_use]
    pub const fn family(self) -> ChartFamily {
        match self {
            Self::Bar
            | Self::Candlestick
            | Self::Line
            | Self::Area
            | Self::PointMarker
            | Self::RangeMarker
            | Self::TrendIndicator => ChartFamily::Cartesian,
            Self::PolarBar => ChartFamily::Polar,
            Self::PieSlice | Self::FunnelSlice => ChartFamily::Radial,
        }
    }
}

/// One retained drawable: a kind tag plus an order-stable table of
/// animatable properties and a group-independent opacity.
///
/// The engine only ever reads and writes properties through this table;
/// actual path/tessellation math lives in the host renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    properties: IndexMap<String, AnimValue>,
    opacity: f64,
}

impl Shape {
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            properties: IndexMap::new(),
            opacity: 1.0,
        }
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: AnimValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&AnimValue> {
        self.properties.get(name)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: AnimValue) {
        self.properties.insert(name.into(), value);
    }

    /// `IndexMap` keeps insertion order so captured snapshots and applied
    /// end states enumerate identically.
    #[must_use]
    pub fn properties(&self) -> &IndexMap<String, AnimValue> {
        &self.properties
    }

    #[must_use]
    pub const fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }
}
