use serde::{Deserialize, Serialize};

use crate::anim::PhaseScheduler;
use crate::api::{ReconcileStats, RenderOptions, RenderSnapshot};
use crate::core::ContainerId;

/// How one render's change is committed to the scene.
///
/// Exactly one strategy applies per render; the choice is made once, in
/// `begin_render`, before any matching happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitStrategy {
    /// Swap the new scene in synchronously; the combined timeline is
    /// already finished when `commit` returns.
    NoAnimation,
    /// Per-item identity matching with phased delete/update/insert
    /// timelines.
    ItemReconciliation,
    /// Whole-subtree crossfade of the old and new containers, used when the
    /// two renders cannot be bridged item by item.
    CrossfadeFallback,
}

/// Chooses the commit strategy for one render.
///
/// Item reconciliation requires a previous render of the same family and
/// orientation. A first paint gets a crossfade only when a display animation
/// was explicitly requested.
#[must_use]
pub fn choose_strategy(
    previous: Option<&RenderSnapshot>,
    options: &RenderOptions,
) -> CommitStrategy {
    if !options.animate {
        return CommitStrategy::NoAnimation;
    }
    match previous {
        None => {
            if options.first_paint_animation {
                CommitStrategy::CrossfadeFallback
            } else {
                CommitStrategy::NoAnimation
            }
        }
        Some(snapshot) => {
            if snapshot.family() != options.family
                || snapshot.orientation() != options.orientation
            {
                CommitStrategy::CrossfadeFallback
            } else {
                CommitStrategy::ItemReconciliation
            }
        }
    }
}

/// Mutable state of the render currently being reconciled.
///
/// Created by `begin_render`, consumed by `commit`. Owning the scheduler,
/// the snapshot and the staging containers here (instead of flags on the
/// engine) means an interrupted render leaves nothing ambient to
/// desynchronize.
#[derive(Debug)]
pub struct AnimationSession {
    pub(crate) strategy: CommitStrategy,
    pub(crate) options: RenderOptions,
    pub(crate) scheduler: PhaseScheduler,
    pub(crate) snapshot: Option<RenderSnapshot>,
    /// Previous render's container, staged for removal or crossfade.
    pub(crate) ghost: Option<ContainerId>,
    /// Topmost container staging deleted shapes and trend indicators.
    pub(crate) overlay: ContainerId,
    pub(crate) stats: ReconcileStats,
}

impl AnimationSession {
    #[must_use]
    pub(crate) fn new(
        strategy: CommitStrategy,
        options: RenderOptions,
        scheduler: PhaseScheduler,
        snapshot: Option<RenderSnapshot>,
        ghost: Option<ContainerId>,
        overlay: ContainerId,
    ) -> Self {
        Self {
            strategy,
            options,
            scheduler,
            snapshot,
            ghost,
            overlay,
            stats: ReconcileStats::default(),
        }
    }

    #[must_use]
    pub const fn strategy(&self) -> CommitStrategy {
        self.strategy
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::{CommitStrategy, choose_strategy};
    use crate::api::{RenderOptions, RenderSnapshot};
    use crate::core::{ChartFamily, Orientation};

    fn snapshot(family: ChartFamily, orientation: Orientation) -> RenderSnapshot {
        RenderSnapshot::new(IndexMap::new(), family, orientation)
    }

    #[test]
    fn animation_disabled_always_swaps_synchronously() {
        let options = RenderOptions::new(ChartFamily::Cartesian).with_animation(false);
        let previous = snapshot(ChartFamily::Cartesian, Orientation::Vertical);
        assert_eq!(
            choose_strategy(Some(&previous), &options),
            CommitStrategy::NoAnimation
        );
        assert_eq!(choose_strategy(None, &options), CommitStrategy::NoAnimation);
    }

    #[test]
    fn first_paint_honors_display_animation_request() {
        let plain = RenderOptions::new(ChartFamily::Cartesian);
        assert_eq!(choose_strategy(None, &plain), CommitStrategy::NoAnimation);

        let display = plain.with_first_paint_animation(true);
        assert_eq!(
            choose_strategy(None, &display),
            CommitStrategy::CrossfadeFallback
        );
    }

    #[test]
    fn family_change_forces_crossfade() {
        let previous = snapshot(ChartFamily::Cartesian, Orientation::Vertical);
        let options = RenderOptions::new(ChartFamily::Polar);
        assert_eq!(
            choose_strategy(Some(&previous), &options),
            CommitStrategy::CrossfadeFallback
        );
    }

    #[test]
    fn orientation_flip_forces_crossfade() {
        let previous = snapshot(ChartFamily::Cartesian, Orientation::Vertical);
        let options =
            RenderOptions::new(ChartFamily::Cartesian).with_orientation(Orientation::Horizontal);
        assert_eq!(
            choose_strategy(Some(&previous), &options),
            CommitStrategy::CrossfadeFallback
        );
    }

    #[test]
    fn compatible_renders_reconcile_item_by_item() {
        let previous = snapshot(ChartFamily::Cartesian, Orientation::Vertical);
        let options = RenderOptions::new(ChartFamily::Cartesian);
        assert_eq!(
            choose_strategy(Some(&previous), &options),
            CommitStrategy::ItemReconciliation
        );
    }
}
