use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{IdentityKey, Peer};

/// The three disjoint sets one reconciliation pass produces.
///
/// Every key of the old and new peer lists appears in exactly one set:
/// `|updates| + |inserts| + |deletes| == |keys(old) ∪ keys(new)|`.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub updates: Vec<(Peer, Peer)>,
    pub inserts: Vec<Peer>,
    pub deletes: Vec<Peer>,
}

/// Per-render reconciliation counters, logged at commit and exposed to hosts
/// for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    pub updates: usize,
    pub inserts: usize,
    pub deletes: usize,
    /// Update pairs whose visual state was identical; nothing was scheduled.
    pub unchanged: usize,
    /// Items that fell back to an opacity-only crossfade.
    pub degraded: usize,
    /// Items whose animation failed and snapped straight to the end state.
    pub snapped: usize,
}

impl ReconcileStats {
    pub fn absorb(&mut self, outcome: &ReconcileOutcome) {
        self.updates += outcome.updates.len();
        self.inserts += outcome.inserts.len();
        self.deletes += outcome.deletes.len();
    }
}

/// Matches old and new peers of one lane by identity key.
///
/// Duplicate keys within one list are a caller error: the pairing for the
/// colliding entries is last-write-wins and therefore non-deterministic,
/// but never a crash.
#[must_use]
pub fn reconcile(old_peers: Vec<Peer>, new_peers: Vec<Peer>) -> ReconcileOutcome {
    let mut old_by_key: IndexMap<IdentityKey, Peer> = IndexMap::with_capacity(old_peers.len());
    for peer in old_peers {
        if let Some(displaced) = old_by_key.insert(peer.key.clone(), peer) {
            warn!(
                key = ?displaced.key,
                "duplicate identity key in previous render, pairing is non-deterministic"
            );
        }
    }

    let mut outcome = ReconcileOutcome::default();
    for new_peer in new_peers {
        match old_by_key.shift_remove(&new_peer.key) {
            Some(old_peer) => outcome.updates.push((old_peer, new_peer)),
            None => outcome.inserts.push(new_peer),
        }
    }
    outcome.deletes = old_by_key.into_values().collect();
    outcome
}
