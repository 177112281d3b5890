// Jewel - lib.rs
//
// Library entry point, exposing all non-GUI-host modules for integration
// testing. The eframe host (`gui`) lives with `main.rs` and is not part of
// the library surface.

pub mod app;
pub mod platform;
pub mod ui;
pub mod util;
