//! Process-wide log output.
//!
//! The ARM crate logs through the `log` facade. `init` installs a
//! `tracing-subscriber` formatter that also captures those records.

use tracing_subscriber::EnvFilter;

/// Crates that are chatty at `debug` and below.
const QUIET_TARGETS: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"];

/// Filter for `default_level`, unless `RUST_LOG` is set.
pub fn build_filter(default_level: &str) -> Result<EnvFilter, String> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let mut filter = EnvFilter::try_new(default_level)
        .map_err(|e| format!("Invalid log level '{}': {}", default_level, e))?;
    for target in QUIET_TARGETS {
        let directive = target
            .parse()
            .map_err(|e| format!("Invalid log directive '{}': {}", target, e))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(default_level: &str) -> Result<(), String> {
    let filter = build_filter(default_level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    #[cfg(feature = "logs-json")]
    let result = builder.json().try_init();
    #[cfg(not(feature = "logs-json"))]
    let result = builder.try_init();

    result.map_err(|e| format!("Failed to initialise logging: {}", e))?;
    tracing::debug!("Logging initialised (default level {})", default_level);
    Ok(())
}
