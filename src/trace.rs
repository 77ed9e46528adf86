//! Resolver events and the subscribers that receive them.
//!
//! Event sites sit behind `#[cfg(feature = "tracing")]`, so a build without
//! the feature carries no instrumentation at all:
//!
//! ```rust,ignore
//! #[cfg(feature = "tracing")]
//! use crate::trace::debug;
//!
//! #[cfg(feature = "tracing")]
//! debug!(pred = %key, "cut");
//! ```
//!
//! Calls, exits, redos and failures are `trace`; cuts, errors and database
//! updates are `debug`; failed directives are `warn`.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

/// Send resolver events to stderr, filtered by `RUST_LOG` (default `info`).
///
/// Later calls leave the first subscriber in place.
#[cfg(feature = "tracing")]
pub fn init_subscriber() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let events = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false);
    // Err only means a subscriber is already installed.
    let _ = tracing_subscriber::registry().with(events).with(filter).try_init();
}

#[cfg(not(feature = "tracing"))]
pub fn init_subscriber() {}

/// Record resolver spans as folded stacks in `path`, for `inferno` or
/// `flamegraph.pl`.
///
/// The file is flushed when the returned guard is dropped.
#[cfg(feature = "tracing")]
pub fn init_flamegraph(path: &str) -> std::io::Result<impl Drop> {
    use tracing_flame::FlameLayer;
    use tracing_subscriber::{prelude::*, registry::Registry};

    let (layer, flush_guard) =
        FlameLayer::with_file(path).map_err(|e| std::io::Error::other(e.to_string()))?;
    Registry::default()
        .with(layer)
        .try_init()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(flush_guard)
}

/// Without the `tracing` feature there is nothing to record.
#[cfg(not(feature = "tracing"))]
pub fn init_flamegraph(_path: &str) -> std::io::Result<impl Drop> {
    Ok(NoFlamegraph)
}

#[cfg(not(feature = "tracing"))]
struct NoFlamegraph;

#[cfg(not(feature = "tracing"))]
impl Drop for NoFlamegraph {
    fn drop(&mut self) {}
}

#[cfg(test)]
#[path = "tests/trace.rs"]
mod tests;
