//! Chat and session creation CLI commands.

use anyhow::Result;
use colloquy_types::chat::{ChatRequest, CreateSessionRequest};
use colloquy_types::session::SessionId;
use console::style;

use crate::state::AppState;

/// Ask one question and print the answer.
///
/// # Examples
///
/// ```bash
/// colloquy chat --model m1 "what is a borrow checker?"
/// colloquy chat --model m1 --session 0190... --param temperature=0.2 "and lifetimes?"
/// ```
pub async fn ask(
    state: &AppState,
    model: String,
    session: Option<String>,
    params: Vec<(String, String)>,
    question: String,
    json: bool,
) -> Result<()> {
    let mut request = ChatRequest::new(model, question);
    if let Some(session) = session {
        request = request.in_session(session);
    }
    for (key, value) in params {
        request = request.with_parameter(key, value);
    }

    let response = state.chat_service.chat(request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!();
    println!("{}", response.answer);
    println!();
    println!(
        "  {} {}",
        style("session").dim(),
        style(&response.session_id).cyan()
    );
    println!();
    Ok(())
}

/// Create an empty session bound to a user and model.
pub async fn create_session(state: &AppState, user: String, model: String, json: bool) -> Result<()> {
    let response = state
        .chat_service
        .create_session(CreateSessionRequest {
            user_id: Some(user),
            model_id: Some(model.clone()),
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Session {} created",
        style("✓").green().bold(),
        style(&response.session_id).cyan()
    );
    println!();
    println!(
        "  Continue it with: {}",
        style(continue_command(&model, &response.session_id)).yellow()
    );
    println!();
    Ok(())
}

/// Command line that asks the next question in `session_id`.
fn continue_command(model: &str, session_id: &SessionId) -> String {
    format!("colloquy chat --model {model} --session {session_id} \"<question>\"")
}
