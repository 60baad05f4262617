//! Colloquy CLI and REST API entry point.
//!
//! Binary name: `colloquy`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use std::process::ExitCode;

use clap::Parser;
use clap_complete::generate;
use colloquy_observe::tracing_setup::{init_tracing, shutdown_tracing};
use colloquy_types::error::ConversationError;

use cli::{Cli, Commands, SessionCommand};
use state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,colloquy=debug",
        _ => "trace",
    };
    let otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    if let Err(e) = init_tracing(otel, filter) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let json = cli.json;
    let result = run(cli).await;
    shutdown_tracing();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, json);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "colloquy", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Chat {
            model,
            session,
            params,
            question,
        } => {
            cli::chat::ask(&state, model, session, params, question, cli.json).await?;
        }

        Commands::Session { action } => match action {
            SessionCommand::Create { user, model } => {
                cli::chat::create_session(&state, user, model, cli.json).await?;
            }
        },

        Commands::Sessions { paging } => {
            cli::session::list_sessions(&state, paging, cli.json).await?;
        }

        Commands::History { session_id, paging } => {
            cli::session::show_history(&state, &session_id, paging, cli.json).await?;
        }

        Commands::Serve { port, host, .. } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Colloquy API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}/api/v1/conversation")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            tracing::info!(data_dir = %state.data_dir.display(), "Serving conversations");
            let router = http::router::build_router(state.clone());

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            state.db_pool.close().await;
            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Print a failure: a JSON error object with `--json`, a styled line otherwise.
fn report_error(err: &anyhow::Error, json: bool) {
    let (code, message) = match err.downcast_ref::<ConversationError>() {
        Some(e) => (e.code(), e.describe()),
        None => ("INTERNAL_ERROR", format!("{err:#}")),
    };

    if json {
        let body = serde_json::json!({ "error": { "code": code, "message": message } });
        println!("{body}");
    } else {
        eprintln!(
            "  {} {} {}",
            console::style("✗").red().bold(),
            console::style(code).red(),
            message
        );
    }
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
