//! Tracing initialisation
//!
//! Installs a global subscriber once. Later calls are no-ops and report
//! `false`, so tests and embedding hosts can call these freely.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when the given directive does not parse
pub const FALLBACK_DIRECTIVE: &str = "warn";

fn filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(FALLBACK_DIRECTIVE))
}

/// Human-readable output on stderr
///
/// Returns `true` if this call installed the subscriber.
pub fn init_tracing(directive: &str) -> bool {
    tracing_subscriber::registry()
        .with(filter(directive))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}

/// JSON lines on stderr
///
/// Returns `true` if this call installed the subscriber.
pub fn init_json_tracing(directive: &str) -> bool {
    tracing_subscriber::registry()
        .with(filter(directive))
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
