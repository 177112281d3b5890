// Jewel - ui/menu.rs
//
// Menu bar and keyboard shortcuts. Rendering only: the chosen action is
// returned to the caller, which owns the context-level side effects.

use crate::app::appearance::{scale_steps, Appearance};
use crate::app::state::AppState;
use egui::{Key, KeyboardShortcut, Modifiers};

/// Something the user asked for from the menu or a shortcut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuAction {
    ToggleTheme,
    /// `None` resets to the default scale.
    SetUiScale(Option<f32>),
    ShowAbout,
    Exit,
}

/// Ctrl+Shift+T (Cmd+Shift+T on macOS).
pub const TOGGLE_THEME_SHORTCUT: KeyboardShortcut =
    KeyboardShortcut::new(Modifiers::COMMAND.plus(Modifiers::SHIFT), Key::T);

/// Consume any global shortcut pressed this frame.
pub fn handle_shortcuts(ctx: &egui::Context) -> Option<MenuAction> {
    ctx.input_mut(|i| i.consume_shortcut(&TOGGLE_THEME_SHORTCUT))
        .then_some(MenuAction::ToggleTheme)
}

/// Label for the theme toggle entry: names the appearance it switches to.
pub fn toggle_label(current: Appearance) -> String {
    match current.toggled() {
        Appearance::Dark => "Switch to Dark Theme".to_string(),
        _ => "Switch to Light Theme".to_string(),
    }
}

/// Draw the menu bar.
pub fn render(ui: &mut egui::Ui, state: &AppState) -> Option<MenuAction> {
    let mut action = None;

    egui::menu::bar(ui, |ui| {
        ui.menu_button("File", |ui| {
            if ui.button("Exit").clicked() {
                action = Some(MenuAction::Exit);
                ui.close_menu();
            }
        });

        ui.menu_button("View", |ui| {
            let toggle = egui::Button::new(toggle_label(state.appearance.current()))
                .shortcut_text(ui.ctx().format_shortcut(&TOGGLE_THEME_SHORTCUT));
            if ui.add(toggle).clicked() {
                action = Some(MenuAction::ToggleTheme);
                ui.close_menu();
            }

            ui.separator();
            ui.menu_button("UI Scale", |ui| {
                let current = state.appearance.ui_scale();
                for &step in scale_steps(state.platform.kind) {
                    let label = format!("{:.0}%", step * 100.0);
                    if ui.radio(current == step, label).clicked() {
                        action = Some(MenuAction::SetUiScale(Some(step)));
                        ui.close_menu();
                    }
                }
                ui.separator();
                if ui.button("Reset").clicked() {
                    action = Some(MenuAction::SetUiScale(None));
                    ui.close_menu();
                }
            });
        });

        ui.menu_button("Help", |ui| {
            if ui.button("About Jewel").clicked() {
                action = Some(MenuAction::ShowAbout);
                ui.close_menu();
            }
        });
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_label_names_target_theme() {
        assert_eq!(toggle_label(Appearance::Light), "Switch to Dark Theme");
        assert_eq!(toggle_label(Appearance::System), "Switch to Dark Theme");
        assert_eq!(toggle_label(Appearance::Dark), "Switch to Light Theme");
    }

    #[test]
    fn test_shortcut_uses_command_and_shift() {
        assert_eq!(TOGGLE_THEME_SHORTCUT.logical_key, Key::T);
        assert!(TOGGLE_THEME_SHORTCUT.modifiers.command);
        assert!(TOGGLE_THEME_SHORTCUT.modifiers.shift);
    }
}
