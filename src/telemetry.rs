//! Log subscriber setup for binaries and demos
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the embedding application. This helper wires the usual `fmt` layer
//! with an `RUST_LOG`-style filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "surrogate_advisor=info";

/// Install a global `fmt` subscriber filtered by `RUST_LOG`, falling back
/// to `default_filter` (or [`DEFAULT_FILTER`]).
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(default_filter: Option<&str>) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.unwrap_or(DEFAULT_FILTER)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .is_ok()
}
