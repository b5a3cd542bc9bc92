//! Logging setup.
//!
//! Every flagpost crate emits `tracing` events; this module installs a
//! subscriber for applications that do not bring their own.
//!
//! # Environment Variables
//!
//! - `FLAGPOST_LOG=debug` - filter directives, e.g. `flagpost_features=trace`
//! - `RUST_LOG` - used when `FLAGPOST_LOG` is not set

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "FLAGPOST_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Build the filter from `FLAGPOST_LOG`, then `RUST_LOG`, then `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Create a subscriber that respects flagpost's filter variables.
pub fn subscriber() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true))
}

/// Install the subscriber globally.
///
/// Returns `false` when another global subscriber is already set.
pub fn init() -> bool {
    let installed = tracing::subscriber::set_global_default(subscriber()).is_ok();
    if installed {
        tracing::debug!("flagpost logging initialized");
    }
    installed
}
