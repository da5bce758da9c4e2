pub mod config;
pub mod engine;
pub mod reconcile;
pub mod session;
pub mod snapshot;

pub use config::{RenderOptions, TransitionConfig};
pub use engine::{PeerSpec, TransitionEngine};
pub use reconcile::{ReconcileOutcome, ReconcileStats, reconcile};
pub use session::{AnimationSession, CommitStrategy, choose_strategy};
pub use snapshot::RenderSnapshot;
