use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{AnimValue, Scene, ShapeId, ShapeKind};
use crate::error::{MotionError, MotionResult};

/// Render-independent identity of one logical data point.
///
/// Keys must stay stable across renders regardless of reordering, insertion
/// or deletion elsewhere in the data set. Within one peer list keys are
/// expected to be unique; duplicates make pairing non-deterministic but are
/// never an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityKey {
    /// Cartesian/polar series item, keyed by series and group.
    Item { series_id: String, group_id: String },
    /// Pie or funnel slice, keyed by its own stable id.
    Slice(String),
}

impl IdentityKey {
    #[must_use]
    pub fn item(series_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self::Item {
            series_id: series_id.into(),
            group_id: group_id.into(),
        }
    }

    #[must_use]
    pub fn slice(id: impl Into<String>) -> Self {
        Self::Slice(id.into())
    }
}

/// Final (or captured) state of one shape belonging to a peer.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeTarget {
    pub shape: ShapeId,
    pub properties: IndexMap<String, AnimValue>,
    pub opacity: f64,
}

/// One render's pairing of a logical data point with its shape(s).
///
/// Peers are created fresh on every render and carry no animation state.
/// `targets` holds the end-state property tables copied from the scene at
/// build time; a snapshot peer's targets are therefore the *old* captured
/// state. Candlesticks carry body plus wick; every other kind has a single
/// target.
#[derive(Debug, Clone, PartialEq)]
pub struct Peer {
    pub key: IdentityKey,
    pub kind: ShapeKind,
    pub targets: SmallVec<[ShapeTarget; 2]>,
    /// Underlying numeric value, compared across renders for trend glyphs.
    pub value: Option<f64>,
}

impl Peer {
    /// Builds a peer by copying the current property tables of `shapes`
    /// out of the scene. At least one shape is required; a peer with no
    /// targets has nothing to animate.
    pub fn capture(
        key: IdentityKey,
        kind: ShapeKind,
        shapes: &[ShapeId],
        scene: &Scene,
        value: Option<f64>,
    ) -> MotionResult<Self> {
        if shapes.is_empty() {
            return Err(MotionError::InvalidData(format!(
                "peer {key:?} captures no shapes"
            )));
        }
        let mut targets = SmallVec::new();
        for &id in shapes {
            let shape = scene.shape(id)?;
            targets.push(ShapeTarget {
                shape: id,
                properties: shape.properties().clone(),
                opacity: shape.opacity(),
            });
        }
        Ok(Self {
            key,
            kind,
            targets,
            value,
        })
    }

    /// First (body) target.
    ///
    /// # Panics
    /// Panics when `targets` is empty; [`Peer::capture`] never produces
    /// such a peer.
    #[must_use]
    pub fn primary(&self) -> &ShapeTarget {
        &self.targets[0]
    }

    pub fn shape_ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.targets.iter().map(|target| target.shape)
    }

    /// True when two peers describe the exact same visual state
    /// (property-for-property and opacity), used for update idempotence.
    #[must_use]
    pub fn same_visual(&self, other: &Self) -> bool {
        self.targets.len() == other.targets.len()
            && self
                .targets
                .iter()
                .zip(other.targets.iter())
                .all(|(a, b)| a.properties == b.properties && a.opacity == b.opacity)
    }
}
