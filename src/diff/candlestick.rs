use indexmap::IndexMap;

use crate::core::{AnimValue, Peer, ShapeTarget};
use crate::diff::{DiffHandler, HandlerContext, props};

/// Candlestick: body and wick collapse onto the body's vertical center line.
///
/// The peer carries two targets, body first, wick second.
#[derive(Debug)]
pub struct CandlestickHandler {
    peer: Peer,
    context: HandlerContext,
}

impl CandlestickHandler {
    #[must_use]
    pub fn new(peer: Peer, context: HandlerContext) -> Self {
        Self { peer, context }
    }

    fn body_center(target: &ShapeTarget) -> Option<f64> {
        let rect = target.properties.get(props::RECT)?.as_array()?;
        if rect.len() != 4 {
            return None;
        }
        Some(rect[1] + rect[3] / 2.0)
    }
}

impl DiffHandler for CandlestickHandler {
    fn peer(&self) -> &Peer {
        &self.peer
    }

    fn context(&self) -> &HandlerContext {
        &self.context
    }

    fn zero_state(&self, target: &ShapeTarget) -> IndexMap<String, AnimValue> {
        let mut zero = IndexMap::new();
        if let Some(rect) = target.properties.get(props::RECT).and_then(AnimValue::as_array)
            && rect.len() == 4
        {
            let center = rect[1] + rect[3] / 2.0;
            zero.insert(
                props::RECT.to_owned(),
                AnimValue::array([rect[0], center, rect[2], 0.0]),
            );
        }
        if let Some(wick) = target.properties.get(props::WICK).and_then(AnimValue::as_array)
            && wick.len() == 3
        {
            // Wick collapses onto the body center; fall back to its own
            // midpoint when this target has no body rect.
            let center = Self::body_center(self.peer.primary())
                .unwrap_or((wick[1] + wick[2]) / 2.0);
            zero.insert(
                props::WICK.to_owned(),
                AnimValue::array([wick[0], center, center]),
            );
        }
        zero
    }

    fn anchor(&self) -> Option<[f64; 2]> {
        let rect = self
            .peer
            .primary()
            .properties
            .get(props::RECT)?
            .as_array()?;
        if rect.len() != 4 {
            return None;
        }
        Some([rect[0] + rect[2] / 2.0, rect[1]])
    }
}
