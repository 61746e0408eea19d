//! Interactive and scripted shell over the [`Tracker`](crate::core::Tracker).

pub mod commands;
pub mod context;
pub mod help;
pub mod io;
pub mod output;
mod shell;

pub use context::{CliError, CliMode, CommandError, ShellContext, TODAY_ENV};
pub use shell::{run_cli, SCRIPT_ENV};
