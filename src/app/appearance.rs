// Jewel - app/appearance.rs
//
// Appearance (look-and-feel) selection and persistence.
//
// The manager decides WHICH appearance and UI scale are active and remembers
// the user's choice between runs. Turning an `Appearance` into egui visuals
// is the ui layer's job (`ui::theme`).

use super::prefs::{self, Preferences};
use crate::platform::detect::{PlatformKind, PlatformSnapshot};
use crate::util::constants;
use crate::util::error::AppearanceError;
use std::fmt;
use std::path::PathBuf;

/// Visual theme applied to every toolkit-rendered widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Appearance {
    /// Platform default and fallback.
    #[default]
    Light,
    Dark,
    /// Follow the operating system's light/dark setting.
    System,
}

impl Appearance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Parse a selection, case-insensitively.
    pub fn parse(selection: &str) -> Result<Self, AppearanceError> {
        match selection.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" | "auto" => Ok(Self::System),
            _ => Err(AppearanceError::Unsupported {
                selection: selection.to_string(),
            }),
        }
    }

    /// Dark becomes light; anything else becomes dark.
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light | Self::System => Self::Dark,
        }
    }
}

impl fmt::Display for Appearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI scale factors offered for a platform.
pub fn scale_steps(kind: PlatformKind) -> &'static [f32] {
    match kind {
        PlatformKind::Windows => constants::WINDOWS_UI_SCALE_STEPS,
        _ => constants::INTEGER_UI_SCALE_STEPS,
    }
}

/// Pick the startup UI scale factor.
///
/// Priority: environment override > config.toml > saved preference > 1.0.
/// Out-of-range or unparseable values are skipped.
pub fn resolve_ui_scale(env: Option<&str>, config: Option<f32>, saved: Option<f32>) -> f32 {
    let valid = |s: &f32| (constants::MIN_UI_SCALE..=constants::MAX_UI_SCALE).contains(s);
    env.and_then(|v| v.trim().parse::<f32>().ok())
        .filter(valid)
        .or(config.filter(valid))
        .or(saved.filter(valid))
        .unwrap_or(constants::DEFAULT_UI_SCALE)
}

/// Owns the active appearance and UI scale and persists changes.
#[derive(Debug)]
pub struct AppearanceManager {
    prefs_path: Option<PathBuf>,
    prefs: Preferences,
    current: Appearance,
    ui_scale: f32,
}

impl AppearanceManager {
    /// Create a manager backed by the preferences file at `prefs_path`.
    /// `None` keeps everything in memory.
    pub fn new(prefs_path: Option<PathBuf>) -> Self {
        let prefs = prefs_path
            .as_deref()
            .and_then(prefs::load)
            .unwrap_or_default();
        Self {
            prefs_path,
            prefs,
            current: Appearance::default(),
            ui_scale: constants::DEFAULT_UI_SCALE,
        }
    }

    /// Selection to install at startup: an explicit request (CLI/config)
    /// wins over the saved preference, which wins over the default.
    pub fn startup_selection(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_string)
            .or_else(|| self.prefs.theme.clone())
            .unwrap_or_else(|| constants::DEFAULT_THEME.to_string())
    }

    /// Install the appearance named by `selection` and remember it.
    ///
    /// On failure the current appearance is left unchanged; the caller
    /// decides on the fallback.
    pub fn setup(&mut self, selection: &str) -> Result<Appearance, AppearanceError> {
        let appearance = Appearance::parse(selection)?;
        self.current = appearance;
        self.prefs.theme = Some(appearance.as_str().to_string());
        self.persist();
        tracing::info!(appearance = %appearance, "Appearance installed");
        Ok(appearance)
    }

    /// Install the appearance named by `selection` for this run only. The
    /// saved preference is left as it was.
    pub fn setup_transient(&mut self, selection: &str) -> Result<Appearance, AppearanceError> {
        let appearance = Appearance::parse(selection)?;
        self.current = appearance;
        tracing::info!(appearance = %appearance, "Appearance installed for this run");
        Ok(appearance)
    }

    /// Install the platform default appearance without touching preferences.
    pub fn install_default(&mut self) -> Appearance {
        self.current = Appearance::default();
        tracing::info!(appearance = %self.current, "Default appearance installed");
        self.current
    }

    /// Switch between light and dark and remember the choice.
    pub fn toggle(&mut self) -> Appearance {
        self.current = self.current.toggled();
        self.prefs.theme = Some(self.current.as_str().to_string());
        self.persist();
        tracing::info!(appearance = %self.current, "Appearance toggled");
        self.current
    }

    pub fn current(&self) -> Appearance {
        self.current
    }

    /// Resolve the startup UI scale from the environment, config and
    /// saved preference.
    pub fn init_ui_scale(&mut self, config_scale: Option<f32>) -> f32 {
        let env = std::env::var(constants::UI_SCALE_ENV_VAR).ok();
        self.ui_scale = resolve_ui_scale(env.as_deref(), config_scale, self.prefs.ui_scale);
        tracing::debug!(scale = self.ui_scale, "UI scale resolved");
        self.ui_scale
    }

    pub fn ui_scale(&self) -> f32 {
        self.ui_scale
    }

    /// Set (or with `None`, reset) the UI scale factor and remember it.
    /// Out-of-range values are rejected and leave the scale unchanged.
    pub fn set_ui_scale(&mut self, scale: Option<f32>) -> f32 {
        match scale {
            Some(s) if !(constants::MIN_UI_SCALE..=constants::MAX_UI_SCALE).contains(&s) => {
                tracing::warn!(scale = s, "Ignoring out-of-range UI scale");
                return self.ui_scale;
            }
            Some(s) => self.ui_scale = s,
            None => self.ui_scale = constants::DEFAULT_UI_SCALE,
        }
        self.prefs.ui_scale = scale;
        self.persist();
        self.ui_scale
    }

    /// Log the appearance state together with the platform snapshot.
    pub fn log_system_info(&self, snapshot: &PlatformSnapshot) {
        snapshot.log_system_info();
        tracing::info!(
            appearance = %self.current,
            ui_scale = self.ui_scale,
            "Appearance state"
        );
    }

    fn persist(&self) {
        let Some(path) = self.prefs_path.as_deref() else {
            return;
        };
        if let Err(e) = prefs::save(&self.prefs, path) {
            tracing::warn!(error = %e, "Could not save preferences");
        }
    }
}
