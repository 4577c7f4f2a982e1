// Nexus Shell - platform/mod.rs
//
// Platform abstraction layer.
// Dependencies: util, core models, directories crate.
// Must NOT depend on: app, ui.

pub mod config;
pub mod desktop;
pub mod fs;
pub mod install;
pub mod process;
