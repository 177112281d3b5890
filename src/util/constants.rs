// Jewel - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name (window title, macOS application name).
pub const APP_NAME: &str = "Jewel";

/// Application identifier used for config/data/log directories.
pub const APP_ID: &str = "Jewel";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the compiler that built this binary, captured by build.rs.
pub const RUNTIME_VERSION: &str = env!("JEWEL_RUSTC_VERSION");

// =============================================================================
// Window
// =============================================================================

/// Minimum window width in logical points.
pub const WINDOW_MIN_WIDTH: f32 = 800.0;

/// Minimum window height in logical points.
pub const WINDOW_MIN_HEIGHT: f32 = 600.0;

/// Initial window width (the editor's preferred size).
pub const WINDOW_DEFAULT_WIDTH: f32 = 1280.0;

/// Initial window height (the editor's preferred size).
pub const WINDOW_DEFAULT_HEIGHT: f32 = 720.0;

// =============================================================================
// Session logging
// =============================================================================

/// chrono format of a session identifier (`YYYYMMDD'T'HHMMSS`).
pub const SESSION_ID_FORMAT: &str = "%Y%m%dT%H%M%S";

/// chrono format of the timestamp prefixed to every log line.
pub const LOG_LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// chrono format of the suffix given to a rotated log file.
pub const ROTATED_LOG_SUFFIX_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Extension of session log files.
pub const LOG_FILE_EXTENSION: &str = "log";

/// Maximum number of `-N` suffixes tried when a session directory with the
/// same timestamp already exists.
pub const MAX_SESSION_ID_ATTEMPTS: u32 = 1_000;

/// Size above which the active log file is rotated (10 MB).
pub const DEFAULT_MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Smallest accepted rotation threshold (64 KB).
pub const MIN_MAX_LOG_FILE_SIZE: u64 = 64 * 1024;

/// Largest accepted rotation threshold (1 GB).
pub const ABSOLUTE_MAX_LOG_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// A session log is not opened, and a full file is not rotated, when the log
/// volume has less free space than this (10 MB).
pub const MIN_FREE_DISK_SPACE: u64 = 10 * 1024 * 1024;

/// Process exit code after an interrupt or termination signal (128 + SIGINT).
pub const SIGNAL_EXIT_CODE: i32 = 130;

/// Session directories older than this many days are removed at startup.
pub const DEFAULT_LOG_RETENTION_DAYS: i64 = 15;

/// Minimum accepted retention period.
pub const MIN_LOG_RETENTION_DAYS: i64 = 1;

/// Maximum accepted retention period.
pub const MAX_LOG_RETENTION_DAYS: i64 = 3_650;

/// First entry written to a new session log.
pub const STARTUP_MESSAGE: &str = "Application started";

/// The single termination entry written when a session closes.
pub const SHUTDOWN_MESSAGE: &str = "Application shutting down";

/// Default tracing level when neither RUST_LOG, --debug nor config set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Appearance
// =============================================================================

/// Appearance used when none is configured or the configured one fails.
pub const DEFAULT_THEME: &str = "light";

/// Default UI scale factor.
pub const DEFAULT_UI_SCALE: f32 = 1.0;

/// Smallest accepted UI scale factor.
pub const MIN_UI_SCALE: f32 = 0.5;

/// Largest accepted UI scale factor.
pub const MAX_UI_SCALE: f32 = 4.0;

/// Scale factors offered in the View menu on Windows, which supports
/// fractional display scaling.
pub const WINDOWS_UI_SCALE_STEPS: &[f32] =
    &[1.0, 1.25, 1.5, 1.75, 2.0, 2.25, 2.5, 2.75, 3.0, 3.5, 4.0];

/// Scale factors offered in the View menu on every other platform.
pub const INTEGER_UI_SCALE_STEPS: &[f32] = &[1.0, 2.0, 3.0, 4.0];

/// Environment variable that overrides the persisted UI scale factor.
pub const UI_SCALE_ENV_VAR: &str = "JEWEL_UI_SCALE";

// =============================================================================
// Editor
// =============================================================================

/// Columns per tab stop in the editor.
pub const EDITOR_TAB_SIZE: usize = 4;

/// Monospace font size for the editor body in points.
pub const EDITOR_FONT_SIZE: f32 = 14.0;

// =============================================================================
// File names
// =============================================================================

/// Configuration file name (lives in the platform config directory).
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Persisted user preferences file name (lives in the platform data directory).
pub const PREFS_FILE_NAME: &str = "preferences.json";

/// Directory under the platform log root holding session directories.
pub const LOGS_DIR_NAME: &str = "logs";
