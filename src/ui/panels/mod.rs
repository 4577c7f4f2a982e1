// Nexus Shell - ui/panels/mod.rs

pub mod console;
pub mod document;
