//! The terminal log viewer: a crossterm render sink, the command line and
//! the event loop driving the router.
pub mod commands;
pub mod console;
pub mod input;
pub mod runner;

pub use commands::{Flow, LogCommand};
pub use console::ConsoleSink;
pub use input::InputLine;
pub use runner::{run_console, Console, ConsoleEvent};
