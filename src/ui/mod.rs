// Jewel - ui/mod.rs
//
// UI layer: presentation only.
// Dependencies: app (state), egui.
// Must NOT depend on: direct I/O beyond font loading.

pub mod editor;
pub mod fonts;
pub mod menu;
pub mod panels;
pub mod theme;
