// Jewel - app/mod.rs
//
// Application layer: bootstrap orchestration, session logging, appearance
// and state management.
// Dependencies: platform, util.
// Must NOT depend on: ui, egui.

pub mod appearance;
pub mod prefs;
pub mod session_log;
pub mod shell;
pub mod state;
pub mod termination;
