//! Opt-in tracing setup for hosts embedding `chart-motion`.
//!
//! The library only ever emits `tracing` events (reconciliation counters,
//! degraded tracks, skipped items); installing a subscriber stays the host's
//! decision. `init_default_tracing` is a convenience for binaries that have
//! no subscriber of their own.

/// Default directive when `RUST_LOG` is unset: engine events at debug,
/// everything else at info.
#[cfg(feature = "telemetry")]
const DEFAULT_DIRECTIVES: &str = "info,chart_motion=debug";

/// Installs a compact `tracing` subscriber filtered by `RUST_LOG`.
///
/// Returns `false` without touching global state when the `telemetry`
/// feature is off or another subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_DIRECTIVES));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
