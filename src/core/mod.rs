// Nexus Shell - core/mod.rs
//
// Core logic layer: data model, backend location, document reduction.
// Dependencies: util, standard library, chrono/regex/tracing.
// Must NOT depend on: ui, platform, app.

pub mod document;
pub mod locate;
pub mod model;
