use indexmap::IndexMap;

use crate::core::{AnimValue, Peer, ShapeTarget, align_point_arrays};
use crate::diff::{DiffHandler, HandlerContext, props};

const POINT_STRIDE: usize = 2;
const VALUE_LANE: usize = 1;

/// Line/area polyline.
///
/// Inserts flatten to the mean of the series' own final values rather than
/// the axis baseline, so series far from the baseline don't snap across the
/// plot. Updates align old and new point arrays with dummy-padded entries
/// when the series gained or lost points.
#[derive(Debug)]
pub struct LineAreaHandler {
    peer: Peer,
    context: HandlerContext,
}

impl LineAreaHandler {
    #[must_use]
    pub fn new(peer: Peer, context: HandlerContext) -> Self {
        Self { peer, context }
    }
}

impl DiffHandler for LineAreaHandler {
    fn peer(&self) -> &Peer {
        &self.peer
    }

    fn context(&self) -> &HandlerContext {
        &self.context
    }

    fn zero_state(&self, target: &ShapeTarget) -> IndexMap<String, AnimValue> {
        let mut zero = IndexMap::new();
        let Some(points) = target.properties.get(props::POINTS).and_then(AnimValue::as_array)
        else {
            return zero;
        };
        if points.len() % POINT_STRIDE != 0 || points.is_empty() {
            return zero;
        }

        let finite_values: Vec<f64> = points
            .chunks_exact(POINT_STRIDE)
            .map(|point| point[VALUE_LANE])
            .filter(|value| value.is_finite())
            .collect();
        if finite_values.is_empty() {
            return zero;
        }
        let mean = finite_values.iter().sum::<f64>() / finite_values.len() as f64;

        let flattened: Vec<f64> = points
            .chunks_exact(POINT_STRIDE)
            .flat_map(|point| [point[0], mean])
            .collect();
        zero.insert(props::POINTS.to_owned(), AnimValue::array(flattened));
        zero
    }

    fn anchor(&self) -> Option<[f64; 2]> {
        let points = self
            .peer
            .primary()
            .properties
            .get(props::POINTS)?
            .as_array()?;
        let last = points.chunks_exact(POINT_STRIDE).last()?;
        Some([last[0], last[1]])
    }

    fn align_track(
        &self,
        property: &str,
        start: AnimValue,
        end: AnimValue,
    ) -> (AnimValue, AnimValue) {
        if property != props::POINTS {
            return (start, end);
        }
        match (&start, &end) {
            (AnimValue::Array(from), AnimValue::Array(to)) if from.len() != to.len() => {
                let (from, to) = align_point_arrays(from, to, POINT_STRIDE, VALUE_LANE);
                (AnimValue::Array(from), AnimValue::Array(to))
            }
            _ => (start, end),
        }
    }
}
