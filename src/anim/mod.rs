pub mod easing;
pub mod scheduler;
pub mod timeline;

pub use easing::Easing;
pub use scheduler::{CombinedTimeline, Phase, PhaseScheduler};
pub use timeline::{PropertyTrack, Timeline, TrackTarget};
