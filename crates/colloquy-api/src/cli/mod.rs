//! CLI command definitions and dispatch for the `colloquy` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Converse with an inference model and keep the conversation.
#[derive(Parser)]
#[command(name = "colloquy", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log only errors (command output is unaffected).
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question, starting or continuing a session.
    Chat {
        /// Inference model to invoke.
        #[arg(short, long, env = "COLLOQUY_MODEL")]
        model: String,

        /// Continue an existing session.
        #[arg(short, long)]
        session: Option<String>,

        /// Extra engine parameter (repeatable).
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// The question to ask.
        question: String,
    },

    /// Session management.
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// List sessions, oldest first.
    #[command(alias = "ls")]
    Sessions {
        #[command(flatten)]
        paging: Paging,
    },

    /// Show the turns of a session, oldest first.
    History {
        /// Session to show.
        session_id: String,

        #[command(flatten)]
        paging: Paging,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Export spans through OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Create an empty session for a user.
    Create {
        /// Owner of the session.
        #[arg(short, long)]
        user: String,

        /// Model the session is bound to.
        #[arg(short, long, env = "COLLOQUY_MODEL")]
        model: String,
    },
}

/// 1-based paging flags shared by listing commands.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct Paging {
    /// Page number, starting at 1.
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Entries per page (defaults to `default_page_size` from config.toml).
    #[arg(long)]
    pub page_size: Option<u32>,
}

/// Parse a `key=value` engine parameter.
fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
