//! Logging setup for the CLI.
//!
//! Engine code only emits `tracing` events; a subscriber is installed here
//! once per process.

use crate::config::Config;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, EnvFilter};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Filter built from `RUST_LOG` when set, else from the configured level.
fn filter_for(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.get_log_level()))
}

/// Installs the global subscriber. Later calls are no-ops, and an already
/// installed subscriber is kept.
pub fn init_logging(config: &Config) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let builder = fmt()
            .with_env_filter(filter_for(config))
            .with_target(true)
            .with_writer(std::io::stderr);

        let installed = if config.get_output_format() == "json" {
            builder.json().try_init()
        } else {
            builder.try_init()
        };

        if installed.is_err() {
            tracing::debug!("global tracing subscriber already set; keeping it");
        }
    });
}
