//! Command-line argument parsing for the pypas client
//!
//! This module defines the CLI structure using clap derive macros. Each
//! subcommand maps to one exercise lifecycle operation or one service query.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// pypas - Python Practical Assignments
#[derive(Parser, Debug)]
#[command(
    name = "pypas",
    version,
    about = "pypas ⚘ Python Practical Assignments",
    long_about = "Command-line client for the pypas platform.
Download exercises, test them locally, keep them up to date and upload your solutions."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Debug logging (URLs, per-file decisions)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Quiet mode - only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// User configuration file path (defaults to ~/.pypas.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Get (download) exercise
    Get {
        /// Slug of exercise
        exercise_slug: String,
    },

    /// Update exercise
    Update {
        /// Force update and omit backup of existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Authenticate at pypas.es (token required)
    Auth(AuthArgs),

    /// Unauthenticate from pypas.es (clear token)
    Unauth,

    /// Compress exercise contents
    Zip {
        /// Show included and ignored files
        #[arg(short, long)]
        verbose: bool,
    },

    /// Put (upload) exercise
    Put,

    /// Test exercise
    Test {
        /// Arguments passed to test tool
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Log of uploaded assignments
    Log {
        /// Filter by frame
        #[arg(short, long, default_value = "")]
        frame: String,

        /// Show every assignment
        #[arg(short, long)]
        verbose: bool,
    },

    /// List exercises. Topic in format <primary>/<secondary>
    List(ListArgs),

    /// Run exercise main file
    Run,

    /// Pull (download) specific assignment or all frame assignments
    Pull {
        /// Slug of exercise or frame
        item_slug: String,
    },

    /// Open documentation for exercise
    Doc,
}

/// Arguments for the auth command
#[derive(Args, Debug, Clone)]
pub struct AuthArgs {
    /// Access token (prompted without echo when omitted)
    pub token: Option<String>,

    /// Show authentication status instead of authenticating
    #[arg(long, conflicts_with = "token")]
    pub status: bool,
}

/// Arguments for the list command
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Filter by frame
    #[arg(short, long, default_value = "")]
    pub frame: String,

    /// Filter by primary topic
    #[arg(short = 'p', long = "ptopic", default_value = "")]
    pub primary_topic: String,

    /// Filter by secondary topic
    #[arg(short = 's', long = "stopic", default_value = "")]
    pub secondary_topic: String,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Logging level requested on the command line, if any
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.debug {
            Some(tracing::Level::DEBUG)
        } else {
            None
        }
    }
}

impl From<&ListArgs> for crate::app::ListFilter {
    fn from(args: &ListArgs) -> Self {
        Self {
            frame: args.frame.clone(),
            primary_topic: args.primary_topic.clone(),
            secondary_topic: args.secondary_topic.clone(),
        }
    }
}
