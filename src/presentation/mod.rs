//! Presentation layer: a line-oriented console.

/// Console input commands.
pub mod commands;
/// Interactive and one-shot console.
pub mod console;
/// Text rendering of results.
pub mod render;

pub use commands::ConsoleCommand;
pub use console::Console;
