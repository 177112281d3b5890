// Jewel - ui/theme.rs
//
// Appearance → egui theme mapping, status bar colours, and layout constants.
// No dependencies on business logic.

use crate::app::appearance::Appearance;
use egui::{Color32, ThemePreference};

/// egui theme preference for an appearance.
pub fn theme_preference(appearance: Appearance) -> ThemePreference {
    match appearance {
        Appearance::Light => ThemePreference::Light,
        Appearance::Dark => ThemePreference::Dark,
        Appearance::System => ThemePreference::System,
    }
}

/// Install `appearance` on the context. Takes effect from the next frame.
pub fn apply(ctx: &egui::Context, appearance: Appearance) {
    ctx.set_theme(theme_preference(appearance));
    tracing::debug!(appearance = %appearance, "Theme applied to context");
}

/// Status bar background and text colours for the active visuals.
pub fn status_colours(dark_mode: bool) -> (Color32, Color32) {
    if dark_mode {
        (STATUS_BG_DARK, STATUS_TEXT_DARK)
    } else {
        (STATUS_BG_LIGHT, STATUS_TEXT_LIGHT)
    }
}

pub const STATUS_BG_DARK: Color32 = Color32::from_rgb(31, 41, 55); // Gray 800
pub const STATUS_TEXT_DARK: Color32 = Color32::from_rgb(209, 213, 219); // Gray 300
pub const STATUS_BG_LIGHT: Color32 = Color32::from_rgb(229, 231, 235); // Gray 200
pub const STATUS_TEXT_LIGHT: Color32 = Color32::from_rgb(55, 65, 81); // Gray 700

/// Layout constants.
pub const STATUS_BAR_HEIGHT: f32 = 24.0;
pub const EDITOR_MARGIN: f32 = 4.0;
pub const ABOUT_MIN_WIDTH: f32 = 360.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_preference_mapping() {
        assert_eq!(theme_preference(Appearance::Light), ThemePreference::Light);
        assert_eq!(theme_preference(Appearance::Dark), ThemePreference::Dark);
        assert_eq!(theme_preference(Appearance::System), ThemePreference::System);
    }

    #[test]
    fn test_status_colours_follow_mode() {
        assert_eq!(status_colours(true).0, STATUS_BG_DARK);
        assert_eq!(status_colours(false).1, STATUS_TEXT_LIGHT);
    }
}
