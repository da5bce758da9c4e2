use indexmap::IndexMap;

use crate::core::{AnimValue, Peer, ShapeTarget};
use crate::diff::{DiffHandler, HandlerContext, props};

/// Point marker: no geometry collapse, pure opacity fade at its final
/// position.
#[derive(Debug)]
pub struct PointMarkerHandler {
    peer: Peer,
    context: HandlerContext,
}

impl PointMarkerHandler {
    #[must_use]
    pub fn new(peer: Peer, context: HandlerContext) -> Self {
        Self { peer, context }
    }
}

impl DiffHandler for PointMarkerHandler {
    fn peer(&self) -> &Peer {
        &self.peer
    }

    fn context(&self) -> &HandlerContext {
        &self.context
    }

    fn zero_state(&self, _target: &ShapeTarget) -> IndexMap<String, AnimValue> {
        IndexMap::new()
    }

    fn zero_opacity(&self) -> f64 {
        0.0
    }

    fn anchor(&self) -> Option<[f64; 2]> {
        let pos = self.peer.primary().properties.get(props::POS)?.as_array()?;
        if pos.len() != 2 {
            return None;
        }
        Some([pos[0], pos[1]])
    }
}

/// Range marker: both edges collapse onto the range midpoint.
#[derive(Debug)]
pub struct RangeMarkerHandler {
    peer: Peer,
    context: HandlerContext,
}

impl RangeMarkerHandler {
    #[must_use]
    pub fn new(peer: Peer, context: HandlerContext) -> Self {
        Self { peer, context }
    }

    fn span_of(target: &ShapeTarget) -> Option<[f64; 3]> {
        let span = target.properties.get(props::SPAN)?.as_array()?;
        if span.len() != 3 {
            return None;
        }
        Some([span[0], span[1], span[2]])
    }
}

impl DiffHandler for RangeMarkerHandler {
    fn peer(&self) -> &Peer {
        &self.peer
    }

    fn context(&self) -> &HandlerContext {
        &self.context
    }

    fn zero_state(&self, target: &ShapeTarget) -> IndexMap<String, AnimValue> {
        let mut zero = IndexMap::new();
        let Some([pos, low, high]) = Self::span_of(target) else {
            return zero;
        };
        let mid = (low + high) / 2.0;
        zero.insert(props::SPAN.to_owned(), AnimValue::array([pos, mid, mid]));
        zero
    }

    fn anchor(&self) -> Option<[f64; 2]> {
        let [pos, low, high] = Self::span_of(self.peer.primary())?;
        Some([pos, (low + high) / 2.0])
    }
}
