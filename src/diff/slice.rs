use indexmap::IndexMap;

use crate::core::{AnimValue, Peer, ShapeTarget};
use crate::diff::{DiffHandler, HandlerContext, props};

fn slice_of(target: &ShapeTarget) -> Option<[f64; 6]> {
    let slice = target.properties.get(props::SLICE)?.as_array()?;
    if slice.len() != 6 {
        return None;
    }
    Some([slice[0], slice[1], slice[2], slice[3], slice[4], slice[5]])
}

/// Pie slice: zero sweep angle at its eventual start angle.
#[derive(Debug)]
pub struct PieSliceHandler {
    peer: Peer,
    context: HandlerContext,
}

impl PieSliceHandler {
    #[must_use]
    pub fn new(peer: Peer, context: HandlerContext) -> Self {
        Self { peer, context }
    }
}

impl DiffHandler for PieSliceHandler {
    fn peer(&self) -> &Peer {
        &self.peer
    }

    fn context(&self) -> &HandlerContext {
        &self.context
    }

    fn zero_state(&self, target: &ShapeTarget) -> IndexMap<String, AnimValue> {
        let mut zero = IndexMap::new();
        let Some([cx, cy, rx, ry, start_angle, _]) = slice_of(target) else {
            return zero;
        };
        zero.insert(
            props::SLICE.to_owned(),
            AnimValue::array([cx, cy, rx, ry, start_angle, 0.0]),
        );
        zero
    }

    fn anchor(&self) -> Option<[f64; 2]> {
        let [cx, cy, rx, ry, start_angle, sweep] = slice_of(self.peer.primary())?;
        let mid = start_angle + sweep / 2.0;
        Some([cx + rx * mid.cos(), cy + ry * mid.sin()])
    }
}

fn band_of(target: &ShapeTarget) -> Option<[f64; 5]> {
    let band = target.properties.get(props::BAND)?.as_array()?;
    if band.len() != 5 {
        return None;
    }
    Some([band[0], band[1], band[2], band[3], band[4]])
}

/// Funnel slice: zero vertical extent at its eventual top edge.
#[derive(Debug)]
pub struct FunnelSliceHandler {
    peer: Peer,
    context: HandlerContext,
}

impl FunnelSliceHandler {
    #[must_use]
    pub fn new(peer: Peer, context: HandlerContext) -> Self {
        Self { peer, context }
    }
}

impl DiffHandler for FunnelSliceHandler {
    fn peer(&self) -> &Peer {
        &self.peer
    }

    fn context(&self) -> &HandlerContext {
        &self.context
    }

    fn zero_state(&self, target: &ShapeTarget) -> IndexMap<String, AnimValue> {
        let mut zero = IndexMap::new();
        let Some([top, _, half_top, _, cx]) = band_of(target) else {
            return zero;
        };
        zero.insert(
            props::BAND.to_owned(),
            AnimValue::array([top, top, half_top, half_top, cx]),
        );
        zero
    }

    fn anchor(&self) -> Option<[f64; 2]> {
        let [top, _, _, _, cx] = band_of(self.peer.primary())?;
        Some([cx, top])
    }
}
