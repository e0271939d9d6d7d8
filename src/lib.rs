//! Multi-pane reading workspace: panes, their layout, cross-pane
//! synchronisation and persistence.

pub mod app;
pub mod persistence;
pub mod settings;
pub mod window;
