//! Line-oriented shell for inspecting and driving the recurring engine.

mod commands;
pub mod core;
pub mod output;
mod shell;

pub use shell::run_cli;
