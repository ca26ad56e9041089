//! Tracing initialisation for PullCI binaries.
//!
//! Call [`init_tracing`] once at program start. The default verbosity is
//! `info`, raised to `debug` by `verbose`; either can be overridden
//! per-target through the `RUST_LOG` environment variable. The global
//! subscriber can only be installed once per process, so repeated calls
//! are silently ignored.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// * `json` — when `true`, emit newline-delimited JSON log lines
///   (useful for log aggregation pipelines).
/// * `verbose` — when `true`, default to `debug` instead of `info`.
pub fn init_tracing(json: bool, verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}
