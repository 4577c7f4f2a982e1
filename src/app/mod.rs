// Nexus Shell - app/mod.rs
//
// Application layer: backend supervision, process threads, state management.
// Dependencies: core, platform, util.
// Must NOT depend on: ui.

pub mod process;
pub mod state;
pub mod supervisor;
