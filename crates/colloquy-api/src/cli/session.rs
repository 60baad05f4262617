//! Session browsing CLI commands: list sessions, show history.
//!
//! Rich tables via comfy-table, or JSON with `--json`.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use super::Paging;
use crate::state::AppState;

/// List sessions, oldest first.
///
/// # Examples
///
/// ```bash
/// colloquy sessions
/// colloquy sessions --page 2 --page-size 20 --json
/// ```
pub async fn list_sessions(state: &AppState, paging: Paging, json: bool) -> Result<()> {
    let page = state.page(None, None, Some(paging.page), paging.page_size);
    let sessions = state.query_service.list_sessions(page).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions found. Start one with: {}",
            style("i").blue().bold(),
            style("colloquy chat --model <model> \"<question>\"").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Session").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for session in &sessions {
        let title = session.title.as_deref().unwrap_or("(untitled)");
        table.add_row(vec![
            Cell::new(&session.session_id).fg(Color::DarkGrey),
            Cell::new(truncate(title, 40)).fg(Color::Cyan),
            Cell::new(session.created_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::White),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{} (page {})",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" },
        paging.page.max(1)
    );
    println!();
    Ok(())
}

/// Show one page of a session's turns, oldest first.
pub async fn show_history(
    state: &AppState,
    session_id: &str,
    paging: Paging,
    json: bool,
) -> Result<()> {
    let page = state.page(None, None, Some(paging.page), paging.page_size);
    let history = state.query_service.get_history(session_id, page).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.steps.is_empty() {
        println!();
        println!(
            "  {} No turns for session '{}' on this page.",
            style("i").blue().bold(),
            style(session_id).cyan()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("  History for '{}'", style(&history.session_id).cyan().bold());
    for step in &history.steps {
        println!();
        println!(
            "  {} {}",
            style(step.created_at.format("%Y-%m-%d %H:%M:%S")).dim(),
            style("you").green().bold()
        );
        println!("  {}", step.question);
        println!("  {}", style("model").magenta().bold());
        println!("  {}", step.answer);
    }
    println!();
    Ok(())
}

/// Shorten `text` to at most `max` characters, marking the cut with "...".
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
