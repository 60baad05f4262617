//! History window reader.
//!
//! Fetches the most recent turns of a session (newest first, as the store
//! returns them) and reassembles them oldest first, flattened into
//! `question, answer` pairs ready for encoding.

use colloquy_types::error::ConversationError;
use colloquy_types::session::SessionId;
use colloquy_types::turn::Turn;
use tracing::{debug, warn};

use crate::context::stashed;
use crate::repository::turn::TurnRepository;

pub struct HistoryWindow<'a, T: TurnRepository> {
    turns: &'a T,
    size: u32,
}

impl<'a, T: TurnRepository> HistoryWindow<'a, T> {
    pub fn new(turns: &'a T, size: u32) -> Self {
        Self { turns, size }
    }

    /// Recall the window for `session_id`.
    ///
    /// No session means no history and no store access. Zero hits is an
    /// empty window, not an error.
    pub async fn read(&self, session_id: Option<&SessionId>) -> Result<Vec<String>, ConversationError> {
        let Some(session_id) = session_id else {
            return Ok(Vec::new());
        };
        if self.size == 0 {
            return Ok(Vec::new());
        }

        let recent = stashed(self.turns.recent_turns(session_id, self.size))
            .await
            .map_err(|source| {
                warn!(session_id = %session_id, error = %source, "History fetch failed");
                ConversationError::HistoryUnavailable {
                    session_id: session_id.clone(),
                    source,
                }
            })?;

        debug!(session_id = %session_id, turns = recent.len(), "Recalled history window");
        Ok(chronological(recent))
    }
}

/// Reverse a newest-first list and flatten it to `q, a, q, a, ...`.
pub fn chronological(newest_first: Vec<Turn>) -> Vec<String> {
    newest_first
        .into_iter()
        .rev()
        .flat_map(|turn| [turn.question, turn.answer])
        .collect()
}
