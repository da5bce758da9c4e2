use indexmap::IndexMap;

use crate::core::{ChartFamily, IdentityKey, Orientation, Peer, ShapeKind};

/// Read-only capture of the previous render, taken immediately before the
/// live state is replaced.
///
/// Peers hold property tables copied out of the scene at capture time, so
/// "old" geometry stays queryable after the live scene has moved on. The
/// snapshot is never written through; lanes are only drained as each kind is
/// reconciled.
#[derive(Debug)]
pub struct RenderSnapshot {
    lanes: IndexMap<ShapeKind, Vec<Peer>>,
    family: ChartFamily,
    orientation: Orientation,
}

impl RenderSnapshot {
    #[must_use]
    pub(crate) fn new(
        lanes: IndexMap<ShapeKind, Vec<Peer>>,
        family: ChartFamily,
        orientation: Orientation,
    ) -> Self {
        Self {
            lanes,
            family,
            orientation,
        }
    }

    #[must_use]
    pub const fn family(&self) -> ChartFamily {
        self.family
    }

    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn lane(&self, kind: ShapeKind) -> &[Peer] {
        self.lanes.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Drains the old peers of one kind for reconciliation.
    pub(crate) fn take_lane(&mut self, kind: ShapeKind) -> Vec<Peer> {
        self.lanes.shift_remove(&kind).unwrap_or_default()
    }

    /// Drains every peer of every lane still unclaimed at commit time.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Peer> + '_ {
        self.lanes.drain(..).flat_map(|(_, peers)| peers)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.values().all(Vec::is_empty)
    }

    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.lanes.values().map(Vec::len).sum()
    }

    /// Previous-render numeric value lookup (trend indicators).
    #[must_use]
    pub fn value_of(&self, key: &IdentityKey) -> Option<f64> {
        self.lanes
            .values()
            .flatten()
            .find(|peer| peer.key == *key)
            .and_then(|peer| peer.value)
    }
}
