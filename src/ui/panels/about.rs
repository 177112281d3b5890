// Jewel - ui/panels/about.rs
//
// About dialog: version, runtime and platform details, and the session log
// location. Rendered as a centred, non-resizable, non-collapsible window.

use crate::app::state::AppState;
use crate::ui::theme;
use crate::util::constants;

/// Render the About dialog (if `state.show_about` is true).
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_about {
        return;
    }

    let mut open = true;
    egui::Window::new(format!("About {}", constants::APP_NAME))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .min_width(theme::ABOUT_MIN_WIDTH)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(8.0);

            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(constants::APP_NAME).size(28.0).strong());
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(format!("v{}", constants::APP_VERSION))
                        .size(14.0)
                        .weak(),
                );
            });

            ui.add_space(12.0);
            ui.separator();
            ui.add_space(8.0);

            egui::Grid::new("about_grid")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Platform");
                    ui.label(format!(
                        "{} {} ({})",
                        state.platform.kind.display_name(),
                        state.platform.os_version,
                        state.platform.os_arch
                    ));
                    ui.end_row();

                    ui.label("Runtime");
                    ui.label(format!("rustc {}", state.platform.runtime_version));
                    ui.end_row();

                    ui.label("Theme");
                    ui.label(state.appearance.current().as_str());
                    ui.end_row();

                    ui.label("Session log");
                    match state.log_file_display() {
                        Some(path) => ui.label(path),
                        None => ui.label(egui::RichText::new("disabled").weak()),
                    };
                    ui.end_row();
                });

            if !state.warnings.is_empty() {
                ui.add_space(8.0);
                ui.separator();
                ui.label(egui::RichText::new("Startup warnings").strong());
                for warning in &state.warnings {
                    ui.label(egui::RichText::new(warning).small());
                }
            }

            ui.add_space(8.0);
            ui.separator();
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Built with Rust & egui").small().weak());
            });
            ui.add_space(8.0);
        });

    if !open {
        state.show_about = false;
    }
}
