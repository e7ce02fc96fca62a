//! Command-line interface components
//!
//! This module contains CLI-specific code for the pypas client, including
//! argument parsing, command handlers, and terminal rendering.

pub mod args;
pub mod commands;
pub mod console;

pub use args::{AuthArgs, Cli, Commands, GlobalArgs, ListArgs};
pub use commands::{
    handle_auth, handle_doc, handle_get, handle_list, handle_log, handle_pull, handle_put,
    handle_run, handle_test, handle_unauth, handle_update, handle_zip,
};
pub use console::{render, Terminal};
