// Jewel - platform/mod.rs
//
// Platform abstraction layer: OS detection, toolkit properties, paths and
// configuration.
// Dependencies: standard library, directories crate, util.
// Must NOT depend on: app, ui.

pub mod config;
pub mod detect;
pub mod properties;
