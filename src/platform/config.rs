// Jewel - platform/config.rs
//
// Platform-specific directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance. Session logs keep the historical per-platform
// layout:
//   Windows:     %APPDATA%\Jewel\logs
//   macOS:       ~/Library/Logs/Jewel
//   Linux/Unix:  ~/.jewel/logs

use super::detect::{PlatformKind, PlatformSnapshot};
use super::properties::PropertyOverrides;
use crate::util::constants;
use directories::{BaseDirs, ProjectDirs};
use std::path::{Path, PathBuf};

/// Resolved platform paths for Jewel configuration, data and logs.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/jewel/ or %APPDATA%\Jewel\config\)
    pub config_dir: PathBuf,

    /// Data directory holding preferences.
    pub data_dir: PathBuf,

    /// Root under which one directory per session is created.
    pub log_root: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve(snapshot: &PlatformSnapshot) -> Self {
        let base = BaseDirs::new();
        let log_root = base
            .as_ref()
            .map(|b| log_root_for(snapshot.kind, b.home_dir(), b.config_dir()))
            .unwrap_or_else(|| PathBuf::from(".").join(constants::LOGS_DIR_NAME));

        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                logs = %log_root.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
                log_root,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
                log_root,
            }
        }
    }

    /// Path of config.toml inside the config directory.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }

    /// Path of the persisted preferences file.
    pub fn prefs_file(&self) -> PathBuf {
        self.data_dir.join(constants::PREFS_FILE_NAME)
    }
}

/// Session log root for a platform, given the user's home and roaming config
/// directories.
pub fn log_root_for(kind: PlatformKind, home: &Path, roaming_config: &Path) -> PathBuf {
    match kind {
        PlatformKind::Windows => roaming_config
            .join(constants::APP_ID)
            .join(constants::LOGS_DIR_NAME),
        PlatformKind::MacOs => home.join("Library").join("Logs").join(constants::APP_ID),
        _ => home.join(".jewel").join(constants::LOGS_DIR_NAME),
    }
}

// =============================================================================
// Bootstrap options
// =============================================================================

/// Which optional bootstrap steps run. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// Apply the platform toolkit property set.
    pub apply_platform_tuning: bool,
    /// Install the configured appearance instead of the toolkit default.
    pub install_custom_appearance: bool,
    /// Open a per-run session log file.
    pub enable_session_logging: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            apply_platform_tuning: true,
            install_custom_appearance: true,
            enable_session_logging: true,
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[startup]` section.
    pub startup: StartupSection,
    /// `[appearance]` section.
    pub appearance: AppearanceSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
    /// `[toolkit]` section.
    pub toolkit: ToolkitSection,
}

/// `[startup]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StartupSection {
    pub apply_platform_tuning: Option<bool>,
    pub install_custom_appearance: Option<bool>,
    pub enable_session_logging: Option<bool>,
}

/// `[appearance]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AppearanceSection {
    /// "light", "dark" or "system". Validated by the appearance manager.
    pub theme: Option<String>,
    /// UI scale factor.
    pub ui_scale: Option<f32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Console level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Override for the session log root.
    pub directory: Option<String>,
    /// Rotate the session log once it exceeds this many bytes.
    pub max_file_size_bytes: Option<u64>,
    /// Delete session directories older than this many days.
    pub retention_days: Option<i64>,
}

/// `[toolkit]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ToolkitSection {
    /// Extra or replacement toolkit properties.
    pub set: std::collections::BTreeMap<String, String>,
    /// Toolkit properties that must not be applied.
    pub disable: Vec<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Startup --
    pub bootstrap: BootstrapOptions,

    // -- Appearance --
    /// Raw theme selection; `None` means use the persisted preference.
    pub theme: Option<String>,
    pub ui_scale: Option<f32>,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub log_directory: Option<PathBuf>,
    pub max_log_file_size: u64,
    pub log_retention_days: i64,

    // -- Toolkit --
    pub toolkit_overrides: PropertyOverrides,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bootstrap: BootstrapOptions::default(),
            theme: None,
            ui_scale: None,
            log_level: None,
            log_directory: None,
            max_log_file_size: constants::DEFAULT_MAX_LOG_FILE_SIZE,
            log_retention_days: constants::DEFAULT_LOG_RETENTION_DAYS,
            toolkit_overrides: PropertyOverrides::default(),
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unparseable, returns defaults with a warning; the
/// application still starts but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let (config, mut parse_warnings) = parse_config(&content, config_path);
    warnings.append(&mut parse_warnings);
    (config, warnings)
}

/// Parse and validate config.toml content. `origin` is only used in messages.
pub fn parse_config(content: &str, origin: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    let raw: RawConfig = match toml::from_str(content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                origin.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %origin.display(), "Loaded config.toml");

    let mut config = AppConfig::default();

    // -- Startup --
    if let Some(v) = raw.startup.apply_platform_tuning {
        config.bootstrap.apply_platform_tuning = v;
    }
    if let Some(v) = raw.startup.install_custom_appearance {
        config.bootstrap.install_custom_appearance = v;
    }
    if let Some(v) = raw.startup.enable_session_logging {
        config.bootstrap.enable_session_logging = v;
    }

    // -- Appearance: theme is validated later, where the fallback lives --
    config.theme = raw.appearance.theme.filter(|t| !t.trim().is_empty());

    // -- Appearance: ui_scale --
    if let Some(scale) = raw.appearance.ui_scale {
        if (constants::MIN_UI_SCALE..=constants::MAX_UI_SCALE).contains(&scale) {
            config.ui_scale = Some(scale);
        } else {
            warnings.push(format!(
                "[appearance] ui_scale = {scale} is out of range ({}-{}). Ignoring.",
                constants::MIN_UI_SCALE,
                constants::MAX_UI_SCALE,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: directory --
    if let Some(ref dir) = raw.logging.directory {
        if !dir.is_empty() {
            config.log_directory = Some(PathBuf::from(dir));
        }
    }

    // -- Logging: max_file_size_bytes --
    if let Some(size) = raw.logging.max_file_size_bytes {
        let range = constants::MIN_MAX_LOG_FILE_SIZE..=constants::ABSOLUTE_MAX_LOG_FILE_SIZE;
        if range.contains(&size) {
            config.max_log_file_size = size;
        } else {
            warnings.push(format!(
                "[logging] max_file_size_bytes = {size} is out of range ({}-{}). \
                 Using default ({}).",
                constants::MIN_MAX_LOG_FILE_SIZE,
                constants::ABSOLUTE_MAX_LOG_FILE_SIZE,
                constants::DEFAULT_MAX_LOG_FILE_SIZE,
            ));
        }
    }

    // -- Logging: retention_days --
    if let Some(days) = raw.logging.retention_days {
        if (constants::MIN_LOG_RETENTION_DAYS..=constants::MAX_LOG_RETENTION_DAYS).contains(&days) {
            config.log_retention_days = days;
        } else {
            warnings.push(format!(
                "[logging] retention_days = {days} is out of range ({}-{}). Using default ({}).",
                constants::MIN_LOG_RETENTION_DAYS,
                constants::MAX_LOG_RETENTION_DAYS,
                constants::DEFAULT_LOG_RETENTION_DAYS,
            ));
        }
    }

    // -- Toolkit overrides --
    for (key, value) in raw.toolkit.set {
        if key.trim().is_empty() {
            warnings.push("[toolkit] set contains an empty key. Ignoring it.".to_string());
            continue;
        }
        config.toolkit_overrides.set.insert(key, value);
    }
    config.toolkit_overrides.disable = raw
        .toolkit
        .disable
        .into_iter()
        .filter(|k| !k.trim().is_empty())
        .collect();

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn origin() -> PathBuf {
        PathBuf::from("config.toml")
    }

    #[test]
    fn test_missing_file_returns_defaults_without_warnings() {
        let dir = TempDir::new().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert!(warnings.is_empty());
        assert!(config.bootstrap.apply_platform_tuning);
        assert_eq!(config.max_log_file_size, constants::DEFAULT_MAX_LOG_FILE_SIZE);
    }

    #[test]
    fn test_malformed_toml_falls_back_with_warning() {
        let (config, warnings) = parse_config("[startup\napply = ", &origin());
        assert_eq!(warnings.len(), 1);
        assert!(config.theme.is_none());
    }

    #[test]
    fn test_full_config_is_applied() {
        let content = r#"
            [startup]
            apply_platform_tuning = false
            enable_session_logging = false

            [appearance]
            theme = "dark"
            ui_scale = 1.5

            [logging]
            level = "DEBUG"
            directory = "/tmp/jewel-logs"
            max_file_size_bytes = 1048576
            retention_days = 30

            [toolkit]
            disable = ["JEWEL_TEXT_ANTIALIAS"]
            [toolkit.set]
            JEWEL_HW_ACCEL = "off"
        "#;
        let (config, warnings) = parse_config(content, &origin());

        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert!(!config.bootstrap.apply_platform_tuning);
        assert!(config.bootstrap.install_custom_appearance);
        assert!(!config.bootstrap.enable_session_logging);
        assert_eq!(config.theme.as_deref(), Some("dark"));
        assert_eq!(config.ui_scale, Some(1.5));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_directory, Some(PathBuf::from("/tmp/jewel-logs")));
        assert_eq!(config.max_log_file_size, 1_048_576);
        assert_eq!(config.log_retention_days, 30);
        assert_eq!(
            config.toolkit_overrides.set.get("JEWEL_HW_ACCEL").map(String::as_str),
            Some("off")
        );
        assert!(config.toolkit_overrides.disable.contains("JEWEL_TEXT_ANTIALIAS"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_keep_defaults() {
        let content = r#"
            [appearance]
            ui_scale = 12.0
            [logging]
            level = "verbose"
            max_file_size_bytes = 10
            retention_days = 0
        "#;
        let (config, warnings) = parse_config(content, &origin());

        assert_eq!(warnings.len(), 4, "warnings: {warnings:?}");
        assert!(config.ui_scale.is_none());
        assert!(config.log_level.is_none());
        assert_eq!(config.max_log_file_size, constants::DEFAULT_MAX_LOG_FILE_SIZE);
        assert_eq!(config.log_retention_days, constants::DEFAULT_LOG_RETENTION_DAYS);
    }

    #[test]
    fn test_log_root_layout_per_platform() {
        let home = Path::new("/home/u");
        let roaming = Path::new("/roaming");
        assert_eq!(
            log_root_for(PlatformKind::Windows, home, roaming),
            PathBuf::from("/roaming/Jewel/logs")
        );
        assert_eq!(
            log_root_for(PlatformKind::MacOs, home, roaming),
            PathBuf::from("/home/u/Library/Logs/Jewel")
        );
        assert_eq!(
            log_root_for(PlatformKind::Linux, home, roaming),
            PathBuf::from("/home/u/.jewel/logs")
        );
        assert_eq!(
            log_root_for(PlatformKind::Unknown, home, roaming),
            PathBuf::from("/home/u/.jewel/logs")
        );
    }
}
