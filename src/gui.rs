// Jewel - gui.rs
//
// eframe host: turns a `WindowSpec` into native options, runs the event loop,
// and implements eframe::App around the embedded editor widget.

use crate::app::shell::{WindowHost, WindowSpec};
use crate::app::state::AppState;
use crate::platform::properties::{HardwareAcceleration, ToolkitSettings};
use crate::ui;
use crate::ui::editor::EditorWidget;
use crate::ui::menu::MenuAction;
use crate::util::constants;
use crate::util::error::WindowError;

/// The Jewel window.
pub struct JewelApp {
    state: AppState,
    editor: Box<dyn EditorWidget>,
    toolkit: ToolkitSettings,
    /// Scale still to be pushed to the context (applied on the next frame,
    /// once native pixels-per-point is known).
    pending_scale: Option<f32>,
}

impl JewelApp {
    pub fn new(state: AppState, editor: Box<dyn EditorWidget>, toolkit: ToolkitSettings) -> Self {
        let pending_scale = Some(state.appearance.ui_scale());
        Self {
            state,
            editor,
            toolkit,
            pending_scale,
        }
    }

    fn apply_scale(&self, ctx: &egui::Context, scale: f32) {
        if self.toolkit.dpi_aware {
            ctx.set_zoom_factor(scale);
        } else {
            ctx.set_pixels_per_point(scale);
        }
    }

    fn handle(&mut self, ctx: &egui::Context, action: MenuAction) {
        match action {
            MenuAction::ToggleTheme => {
                let appearance = self.state.toggle_theme();
                ui::theme::apply(ctx, appearance);
            }
            MenuAction::SetUiScale(scale) => {
                let applied = self.state.set_ui_scale(scale);
                self.pending_scale = Some(applied);
            }
            MenuAction::ShowAbout => self.state.show_about = true,
            MenuAction::Exit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }
}

impl eframe::App for JewelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(scale) = self.pending_scale.take() {
            self.apply_scale(ctx, scale);
        }

        if let Some(action) = ui::menu::handle_shortcuts(ctx) {
            self.handle(ctx, action);
        }

        // Top menu bar
        let mut menu_action = None;
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            menu_action = ui::menu::render(ui, &self.state);
        });
        if let Some(action) = menu_action {
            self.handle(ctx, action);
        }

        // Status bar
        let (bg, fg) = ui::theme::status_colours(ctx.style().visuals.dark_mode);
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(egui::Frame::new().fill(bg).inner_margin(egui::Margin::symmetric(8, 2)))
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(egui::RichText::new(&self.state.status_message).color(fg));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let platform = self.state.platform.kind.display_name();
                        ui.label(egui::RichText::new(platform).color(fg));
                        ui.separator();
                        ui.label(egui::RichText::new(self.editor.status()).color(fg));
                    });
                });
            });

        // Editor fills the rest of the window.
        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).inner_margin(ui::theme::EDITOR_MARGIN))
            .show(ctx, |ui| {
                self.editor.show(ui);
            });

        ui::panels::about::render(ctx, &mut self.state);
    }

    fn clear_color(&self, visuals: &egui::Visuals) -> [f32; 4] {
        if self.toolkit.erase_background {
            visuals.panel_fill.to_normalized_gamma_f32()
        } else {
            egui::Rgba::TRANSPARENT.to_array()
        }
    }

    /// Called by eframe when the window is about to close. The shell writes
    /// the termination entry once the event loop has returned.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.log_info("Window closed");
    }
}

/// Map latched toolkit settings and the window spec onto eframe options.
pub fn native_options(spec: &WindowSpec) -> eframe::NativeOptions {
    let hardware_acceleration = match spec.toolkit.hardware_acceleration {
        HardwareAcceleration::Preferred => eframe::HardwareAcceleration::Preferred,
        HardwareAcceleration::Required => eframe::HardwareAcceleration::Required,
        HardwareAcceleration::Off => eframe::HardwareAcceleration::Off,
    };

    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(spec.title.clone())
            .with_app_id(spec.toolkit.app_name.clone())
            .with_inner_size(spec.inner_size)
            .with_min_inner_size(spec.min_size)
            .with_resizable(spec.resizable),
        vsync: spec.toolkit.vsync,
        hardware_acceleration,
        ..Default::default()
    }
}

/// Runs the window on the native event loop via `eframe::run_native`.
#[derive(Debug, Default)]
pub struct EframeHost;

impl WindowHost<Box<dyn EditorWidget>> for EframeHost {
    fn run(
        &mut self,
        window: WindowSpec,
        state: AppState,
        editor: Box<dyn EditorWidget>,
    ) -> Result<(), WindowError> {
        let options = native_options(&window);
        let appearance = window.appearance;
        let toolkit = window.toolkit.clone();
        let text_antialias = toolkit.text_antialias;

        eframe::run_native(
            constants::APP_NAME,
            options,
            Box::new(move |cc| {
                ui::fonts::configure(&cc.egui_ctx);
                ui::theme::apply(&cc.egui_ctx, appearance);
                cc.egui_ctx
                    .tessellation_options_mut(|o| o.feathering = text_antialias);
                Ok(Box::new(JewelApp::new(state, editor, toolkit)))
            }),
        )
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to launch GUI");
            WindowError::Launch {
                source: e.to_string().into(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::appearance::Appearance;

    #[test]
    fn test_native_options_follow_window_spec() {
        let toolkit = ToolkitSettings {
            hardware_acceleration: HardwareAcceleration::Off,
            vsync: false,
            ..ToolkitSettings::default()
        };
        let spec = WindowSpec::new(Appearance::Dark, 1.0, toolkit);
        let options = native_options(&spec);

        assert_eq!(options.hardware_acceleration, eframe::HardwareAcceleration::Off);
        assert!(!options.vsync);
        assert_eq!(options.viewport.title.as_deref(), Some("Jewel"));
        assert_eq!(options.viewport.min_inner_size, Some(egui::vec2(800.0, 600.0)));
        assert_eq!(options.viewport.inner_size, Some(egui::vec2(1280.0, 720.0)));
        assert_eq!(options.viewport.resizable, Some(true));
    }
}
