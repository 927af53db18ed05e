//! Logging setup.

use std::sync::OnceLock;

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt as _,
    util::SubscriberInitExt as _,
};

const DEFAULT_FILTER: &str = "info,tower_http=info";

static INIT: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Safe to call more than once; integration tests call it from every server
/// they spawn.
pub fn init_tracing() {
    INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_span_events(FmtSpan::CLOSE))
            .try_init();
    });
}
