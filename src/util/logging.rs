// Jewel - util/logging.rs
//
// Structured console logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// Output: stderr. The per-run session log file is written separately by
// `app::session_log`, which mirrors each of its entries into tracing.

use tracing_subscriber::EnvFilter;

/// Pick the console filter.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
pub fn build_filter(rust_log_set: bool, debug_flag: bool, config_level: Option<&str>) -> EnvFilter {
    if rust_log_set {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    }
}

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the validated level from config.toml (if present).
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let filter = build_filter(std::env::var("RUST_LOG").is_ok(), debug_flag, config_level);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            app = super::constants::APP_NAME,
            version = super::constants::APP_VERSION,
            "Logging initialised"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_beats_config_level() {
        let filter = build_filter(false, true, Some("warn"));
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_config_level_used_without_flag() {
        let filter = build_filter(false, false, Some("warn"));
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn test_default_level_is_info() {
        let filter = build_filter(false, false, None);
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(false, None);
        init(true, Some("trace"));
    }
}
