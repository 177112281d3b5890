// Jewel - ui/fonts.rs
//
// System font configuration for the egui context.
//
// Each platform contributes a small list of well-known system fonts. Fonts
// that are missing on disk are skipped with a warning; the egui built-ins stay
// in every family as final fallbacks so no glyph is ever lost.

use egui::{FontData, FontDefinitions, FontFamily};

/// Which family a system font is promoted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    /// First choice for UI text.
    Proportional,
    /// First choice for the editor buffer.
    Monospace,
    /// Symbol coverage, appended to both families.
    Fallback,
}

#[cfg(target_os = "windows")]
const CANDIDATES: &[(&str, &str, FontRole)] = &[
    ("Segoe UI", r"C:\Windows\Fonts\segoeui.ttf", FontRole::Proportional),
    ("Consolas", r"C:\Windows\Fonts\consola.ttf", FontRole::Monospace),
    ("Segoe UI Symbol", r"C:\Windows\Fonts\seguisym.ttf", FontRole::Fallback),
];

#[cfg(target_os = "macos")]
const CANDIDATES: &[(&str, &str, FontRole)] =
    &[("Menlo", "/System/Library/Fonts/Menlo.ttc", FontRole::Monospace)];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const CANDIDATES: &[(&str, &str, FontRole)] = &[
    (
        "DejaVu Sans",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        FontRole::Proportional,
    ),
    (
        "DejaVu Sans Mono",
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        FontRole::Monospace,
    ),
];

/// System fonts to try on this platform, in priority order.
pub fn candidates() -> &'static [(&'static str, &'static str, FontRole)] {
    CANDIDATES
}

/// Register already-loaded fonts in `fonts` according to their role.
///
/// Primary fonts are inserted ahead of the egui defaults; fallbacks go last.
pub fn register(fonts: &mut FontDefinitions, loaded: Vec<(String, Vec<u8>, FontRole)>) {
    let mut proportional_pos = 0;
    let mut monospace_pos = 0;

    for (name, data, role) in loaded {
        fonts
            .font_data
            .insert(name.clone(), FontData::from_owned(data).into());

        match role {
            FontRole::Proportional => {
                if let Some(family) = fonts.families.get_mut(&FontFamily::Proportional) {
                    family.insert(proportional_pos, name);
                    proportional_pos += 1;
                }
            }
            FontRole::Monospace => {
                if let Some(family) = fonts.families.get_mut(&FontFamily::Monospace) {
                    family.insert(monospace_pos, name);
                    monospace_pos += 1;
                }
            }
            FontRole::Fallback => {
                for family in [FontFamily::Proportional, FontFamily::Monospace] {
                    if let Some(list) = fonts.families.get_mut(&family) {
                        list.push(name.clone());
                    }
                }
            }
        }
    }
}

/// Load this platform's system fonts and install them on `ctx`.
pub fn configure(ctx: &egui::Context) {
    let mut loaded = Vec::new();
    for (name, path, role) in candidates() {
        match std::fs::read(path) {
            Ok(data) => {
                tracing::debug!(font = name, "Loaded system font");
                loaded.push(((*name).to_owned(), data, *role));
            }
            Err(e) => {
                tracing::warn!(font = name, error = %e, "System font unavailable; using built-in");
            }
        }
    }

    if loaded.is_empty() {
        return;
    }

    let names: Vec<String> = loaded.iter().map(|(n, _, _)| n.clone()).collect();
    let mut fonts = FontDefinitions::default();
    register(&mut fonts, loaded);
    ctx.set_fonts(fonts);
    tracing::info!(fonts = ?names, "System fonts configured");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_places_primary_fonts_first_and_fallbacks_last() {
        let mut fonts = FontDefinitions::default();
        let builtin_mono = fonts.families[&FontFamily::Monospace].clone();

        register(
            &mut fonts,
            vec![
                ("Mono".to_string(), Vec::new(), FontRole::Monospace),
                ("Sans".to_string(), Vec::new(), FontRole::Proportional),
                ("Symbols".to_string(), Vec::new(), FontRole::Fallback),
            ],
        );

        let mono = &fonts.families[&FontFamily::Monospace];
        assert_eq!(mono[0], "Mono");
        assert_eq!(&mono[1..mono.len() - 1], builtin_mono.as_slice());
        assert_eq!(mono.last().map(String::as_str), Some("Symbols"));
        assert_eq!(fonts.families[&FontFamily::Proportional][0], "Sans");
        assert!(fonts.font_data.contains_key("Symbols"));
    }

    #[test]
    fn test_candidates_include_a_monospace_font() {
        assert!(candidates().iter().any(|(_, _, role)| *role == FontRole::Monospace));
    }
}
