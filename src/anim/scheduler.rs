use std::fmt;

use serde::{Deserialize, Serialize};

use crate::anim::Timeline;
use crate::core::Scene;

/// Scheduling layer for one member timeline.
///
/// Delete and Update both continue the previous render's state and start
/// together; Insert members may be staggered so new elements emerge from the
/// settling scene instead of popping in alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Delete = 0,
    Update = 1,
    Insert = 2,
}

impl Phase {
    pub const ALL: [Self; 3] = [Self::Delete, Self::Update, Self::Insert];

    /// Fraction of the configured base duration this phase runs for.
    /// Inserts and deletes are shorter than updates so heavy churn does not
    /// feel sluggish.
    #[must_use]
    pub const fn duration_factor(self) -> f64 {
        match self {
            Self::Update => 0.75,
            Self::Insert | Self::Delete => 0.50,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Groups member timelines into the three ordered phases and produces one
/// combined timeline for the caller to drive.
#[derive(Debug, Default)]
pub struct PhaseScheduler {
    phases: [Vec<Timeline>; 3],
    insert_stagger_ms: f64,
}

impl PhaseScheduler {
    #[must_use]
    pub fn new(insert_stagger_ms: f64) -> Self {
        Self {
            phases: [Vec::new(), Vec::new(), Vec::new()],
            insert_stagger_ms: insert_stagger_ms.max(0.0),
        }
    }

    pub fn add(&mut self, phase: Phase, timeline: Timeline) {
        self.phases[phase.index()].push(timeline);
    }

    #[must_use]
    pub fn phase_len(&self, phase: Phase) -> usize {
        self.phases[phase.index()].len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the scheduler into the single combined timeline.
    #[must_use]
    pub fn into_combined(self) -> CombinedTimeline {
        let stagger = self.insert_stagger_ms;
        let [deletes, updates, inserts] = self.phases;
        let mut members = Vec::with_capacity(deletes.len() + updates.len() + inserts.len());
        members.extend(deletes.into_iter().map(|timeline| (Phase::Delete, timeline)));
        members.extend(updates.into_iter().map(|timeline| (Phase::Update, timeline)));
        members.extend(inserts.into_iter().map(|mut timeline| {
            if stagger > 0.0 {
                timeline.set_delay_ms(stagger);
            }
            (Phase::Insert, timeline)
        }));
        CombinedTimeline {
            members,
            playing: false,
            finished: false,
            cleanup: Vec::new(),
            observers: Vec::new(),
        }
    }
}

type Observer = Box<dyn FnOnce()>;
type CleanupHook = Box<dyn FnOnce(&mut Scene)>;

/// The single caller-facing timeline for one render's transition.
///
/// `stop` is fast-forward, never abandonment: every member lands on its end
/// state, all cleanup hooks run, and the finish event still fires exactly
/// once, so stopping early is behaviorally a zero-cost fast-forward.
pub struct CombinedTimeline {
    members: Vec<(Phase, Timeline)>,
    playing: bool,
    finished: bool,
    cleanup: Vec<CleanupHook>,
    observers: Vec<Observer>,
}

impl CombinedTimeline {
    /// A combined timeline that is already complete (zero-duration contract
    /// for non-animated renders).
    #[must_use]
    pub fn already_finished() -> Self {
        Self {
            members: Vec::new(),
            playing: false,
            finished: true,
            cleanup: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn play(&mut self) {
        if !self.finished {
            self.playing = true;
        }
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn phase_member_count(&self, phase: Phase) -> usize {
        self.members
            .iter()
            .filter(|(member_phase, _)| *member_phase == phase)
            .count()
    }

    /// Registers scene-mutating cleanup (overlay teardown, ghost-container
    /// removal) that runs exactly once when the combined timeline finishes
    /// naturally or is stopped.
    pub fn on_finish_cleanup(&mut self, hook: impl FnOnce(&mut Scene) + 'static) {
        debug_assert!(!self.finished, "cleanup registered on a finished timeline");
        if !self.finished {
            self.cleanup.push(Box::new(hook));
        }
    }

    /// Notifies once, after the last member of any phase finishes.
    /// Registering on an already finished timeline fires immediately.
    pub fn on_finish(&mut self, observer: impl FnOnce() + 'static) {
        if self.finished {
            observer();
        } else {
            self.observers.push(Box::new(observer));
        }
    }

    /// Advances every member; returns `true` once all members are done.
    pub fn tick(&mut self, dt_ms: f64, scene: &mut Scene) -> bool {
        if self.finished {
            return true;
        }
        if !self.playing {
            return false;
        }

        let mut all_finished = true;
        for (_, timeline) in &mut self.members {
            if !timeline.tick(dt_ms, scene) {
                all_finished = false;
            }
        }
        if all_finished {
            self.finish(scene);
        }
        self.finished
    }

    /// Fast-forwards every member to its end state and fires the finish
    /// event. Safe to call at any time, including twice.
    pub fn stop(&mut self, scene: &mut Scene) {
        if self.finished {
            return;
        }
        for (_, timeline) in &mut self.members {
            timeline.fast_forward(scene);
        }
        self.finish(scene);
    }

    fn finish(&mut self, scene: &mut Scene) {
        self.finished = true;
        self.playing = false;
        for hook in self.cleanup.drain(..) {
            hook(scene);
        }
        for observer in self.observers.drain(..) {
            observer();
        }
    }
}

impl fmt::Debug for CombinedTimeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedTimeline")
            .field("members", &self.members.len())
            .field("playing", &self.playing)
            .field("finished", &self.finished)
            .field("cleanup", &self.cleanup.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}
