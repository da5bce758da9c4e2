//! chart-motion: reconciliation and animation engine for data-driven charts.
//!
//! Given two successive renders of the same chart, this crate decides which
//! visual elements represent the same logical data point (and morph
//! continuously), which are new (insert) and which vanished (delete), then
//! drives a phased, cancelable timeline to completion. When the timeline
//! finishes (or is stopped early) the scene matches a from-scratch render
//! of the new data exactly.

pub mod anim;
pub mod api;
pub mod core;
pub mod diff;
pub mod error;
pub mod telemetry;

pub use api::{RenderOptions, TransitionConfig, TransitionEngine};
pub use error::{MotionError, MotionResult};
