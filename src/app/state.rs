// Jewel - app/state.rs
//
// Application state handed to the window once bootstrap completes.
// Owned by the eframe::App implementation; holds the platform snapshot,
// appearance manager and (when available) the session log.

use super::appearance::{Appearance, AppearanceManager};
use super::session_log::SessionLogger;
use crate::platform::detect::PlatformSnapshot;

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Host platform, detected once at startup.
    pub platform: PlatformSnapshot,

    /// Active appearance and UI scale.
    pub appearance: AppearanceManager,

    /// Session log; `None` when logging is disabled or failed to open.
    pub session_log: Option<SessionLogger>,

    /// Status message for the status bar.
    pub status_message: String,

    /// Non-fatal warnings accumulated during bootstrap.
    pub warnings: Vec<String>,

    /// Whether the About dialog is open.
    pub show_about: bool,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,
}

impl AppState {
    pub fn new(
        platform: PlatformSnapshot,
        appearance: AppearanceManager,
        session_log: Option<SessionLogger>,
        debug_mode: bool,
    ) -> Self {
        Self {
            platform,
            appearance,
            session_log,
            status_message: "Ready.".to_string(),
            warnings: Vec::new(),
            show_about: false,
            debug_mode,
        }
    }

    /// Switch light/dark, remember it, and record it in the session log.
    pub fn toggle_theme(&mut self) -> Appearance {
        let appearance = self.appearance.toggle();
        self.status_message = format!("Theme: {appearance}");
        self.log_info(&format!("Appearance changed to {appearance}"));
        appearance
    }

    /// Change the UI scale factor. `None` restores the default.
    pub fn set_ui_scale(&mut self, scale: Option<f32>) -> f32 {
        let applied = self.appearance.set_ui_scale(scale);
        self.status_message = format!("UI scale: {applied}x");
        self.log_info(&format!("UI scale changed to {applied}"));
        applied
    }

    /// Write to the session log if one is open.
    pub fn log_info(&self, message: &str) {
        if let Some(log) = &self.session_log {
            log.info(message);
        }
    }

    /// Session log file path for display, if logging is active.
    pub fn log_file_display(&self) -> Option<String> {
        self.session_log
            .as_ref()
            .map(|l| l.log_file_path().display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::session_log::LogSettings;
    use tempfile::TempDir;

    fn snapshot() -> PlatformSnapshot {
        PlatformSnapshot::from_parts("linux", "6.8", "x86_64", "1.80.0")
    }

    #[test]
    fn test_toggle_theme_updates_status_and_log() {
        let dir = TempDir::new().unwrap();
        let log =
            SessionLogger::open(dir.path(), "20240101T120000", LogSettings::default()).unwrap();
        let mut state =
            AppState::new(snapshot(), AppearanceManager::new(None), Some(log.clone()), false);

        assert_eq!(state.toggle_theme(), Appearance::Dark);
        assert_eq!(state.status_message, "Theme: dark");

        log.close();
        let content = std::fs::read_to_string(log.log_file_path()).unwrap();
        assert!(content.contains("Appearance changed to dark"));
    }

    #[test]
    fn test_state_without_log_still_works() {
        let mut state = AppState::new(snapshot(), AppearanceManager::new(None), None, false);
        assert_eq!(state.set_ui_scale(Some(2.0)), 2.0);
        assert!(state.log_file_display().is_none());
    }
}
