// Jewel - ui/editor.rs
//
// The editor widget embedded as the window's root content.

use crate::util::constants;

/// Anything the window can host as its main content.
pub trait EditorWidget {
    /// Draw the widget into the remaining space of `ui`.
    fn show(&mut self, ui: &mut egui::Ui);

    /// Short text for the status bar.
    fn status(&self) -> String {
        String::new()
    }
}

/// Plain-text code editor: monospace font, tab stops every
/// `EDITOR_TAB_SIZE` columns (egui's own tab width), Tab key inserts a tab.
#[derive(Debug, Default)]
pub struct TextEditor {
    text: String,
    modified: bool,
}

impl TextEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            modified: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Number of lines; an empty buffer still has one.
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

impl EditorWidget for TextEditor {
    fn show(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::both()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let edit = egui::TextEdit::multiline(&mut self.text)
                    .code_editor()
                    .font(egui::FontId::monospace(constants::EDITOR_FONT_SIZE))
                    .lock_focus(true)
                    .desired_width(f32::INFINITY)
                    .frame(false);
                let response = ui.add_sized(ui.available_size(), edit);
                if response.changed() {
                    self.modified = true;
                }
            });
    }

    fn status(&self) -> String {
        let lines = self.line_count();
        let chars = self.text.chars().count();
        let marker = if self.modified { "  \u{25cf} modified" } else { "" };
        format!(
            "{lines} line{}  |  {chars} chars  |  Tab: {}{marker}",
            if lines == 1 { "" } else { "s" },
            constants::EDITOR_TAB_SIZE
        )
    }
}
