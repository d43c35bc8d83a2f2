//! Logging bootstrap
//!
//! Installs the tracing subscriber for hosts that don't bring their own.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with an env-filter (RUST_LOG overrides the default).
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nimbusnotes=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
