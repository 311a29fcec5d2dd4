use std::sync::Once;

use tracing_subscriber::EnvFilter;

static LOGGER: Once = Once::new();

/// Environment variable that overrides the log filter, e.g. `TALLYHAND_LOG=tallyhand=trace`.
pub const LOG_ENV: &str = "TALLYHAND_LOG";

/// Install the global tracing subscriber, writing to stderr.
/// Only the first call has any effect.
pub fn init(verbose: bool) {
    LOGGER.call_once(|| {
        let default_filter = if verbose { "tallyhand=debug" } else { "warn" };
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        // Another subscriber may already be installed (e.g. by an embedding app).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
