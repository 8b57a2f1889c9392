// Command-line surface: argument parsing, command handlers and the
// long-running refresh loop.

#[path = "args.rs"]
pub mod args;

#[path = "commands.rs"]
pub mod commands;

#[path = "scheduler.rs"]
pub mod scheduler;

pub use args::{Cli, Command};
