use indexmap::IndexMap;

use crate::core::{AnimValue, Orientation, Peer, ShapeTarget};
use crate::diff::{DiffHandler, HandlerContext, props};

fn rect_of(target: &ShapeTarget) -> Option<[f64; 4]> {
    let rect = target.properties.get(props::RECT)?.as_array()?;
    if rect.len() != 4 {
        return None;
    }
    Some([rect[0], rect[1], rect[2], rect[3]])
}

/// Cartesian bar: collapses to zero length against its value-axis baseline.
#[derive(Debug)]
pub struct BarHandler {
    peer: Peer,
    context: HandlerContext,
}

impl BarHandler {
    #[must_use]
    pub fn new(peer: Peer, context: HandlerContext) -> Self {
        Self { peer, context }
    }
}

impl DiffHandler for BarHandler {
    fn peer(&self) -> &Peer {
        &self.peer
    }

    fn context(&self) -> &HandlerContext {
        &self.context
    }

    fn zero_state(&self, target: &ShapeTarget) -> IndexMap<String, AnimValue> {
        let mut zero = IndexMap::new();
        let Some([x, y, width, height]) = rect_of(target) else {
            return zero;
        };
        let baseline = target
            .properties
            .get(props::BASELINE)
            .and_then(AnimValue::as_scalar);

        let collapsed = match self.context.orientation {
            Orientation::Vertical => {
                let baseline = baseline.unwrap_or(y + height);
                [x, baseline, width, 0.0]
            }
            Orientation::Horizontal => {
                let baseline = baseline.unwrap_or(x);
                [baseline, y, 0.0, height]
            }
        };
        zero.insert(props::RECT.to_owned(), AnimValue::array(collapsed));
        zero
    }

    fn anchor(&self) -> Option<[f64; 2]> {
        let [x, y, width, height] = rect_of(self.peer.primary())?;
        Some(match self.context.orientation {
            Orientation::Vertical => [x + width / 2.0, y],
            Orientation::Horizontal => [x + width, y + height / 2.0],
        })
    }
}

fn sector_of(target: &ShapeTarget) -> Option<[f64; 6]> {
    let sector = target.properties.get(props::SECTOR)?.as_array()?;
    if sector.len() != 6 {
        return None;
    }
    Some([
        sector[0], sector[1], sector[2], sector[3], sector[4], sector[5],
    ])
}

/// Polar bar: collapses to zero radial extent at its final angular span.
#[derive(Debug)]
pub struct PolarBarHandler {
    peer: Peer,
    context: HandlerContext,
}

impl PolarBarHandler {
    #[must_use]
    pub fn new(peer: Peer, context: HandlerContext) -> Self {
        Self { peer, context }
    }
}

impl DiffHandler for PolarBarHandler {
    fn peer(&self) -> &Peer {
        &self.peer
    }

    fn context(&self) -> &HandlerContext {
        &self.context
    }

    fn zero_state(&self, target: &ShapeTarget) -> IndexMap<String, AnimValue> {
        let mut zero = IndexMap::new();
        let Some([cx, cy, r_inner, _, start_angle, end_angle]) = sector_of(target) else {
            return zero;
        };
        zero.insert(
            props::SECTOR.to_owned(),
            AnimValue::array([cx, cy, r_inner, r_inner, start_angle, end_angle]),
        );
        zero
    }

    fn anchor(&self) -> Option<[f64; 2]> {
        let [cx, cy, _, r_outer, start_angle, end_angle] = sector_of(self.peer.primary())?;
        let mid = (start_angle + end_angle) / 2.0;
        Some([cx + r_outer * mid.cos(), cy + r_outer * mid.sin()])
    }
}
