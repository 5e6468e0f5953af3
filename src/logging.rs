use crate::flags::Flags;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "LASH_LOG";

fn default_level(flags: &Flags) -> &'static str {
    if flags.is_set("debug") {
        "debug"
    } else if flags.is_set("quiet") {
        "error"
    } else {
        "warn"
    }
}

/// Diagnostics go to stderr; stdout is reserved for command output and job
/// reports. `LASH_LOG` overrides the level chosen by flags.
pub fn init(flags: &Flags) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(flags)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
