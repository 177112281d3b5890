// Jewel - ui/panels/mod.rs

pub mod about;
