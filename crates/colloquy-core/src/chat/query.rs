//! Read-side query service: paginated sessions and session histories.

use colloquy_types::config::EmptyResultPolicy;
use colloquy_types::error::ConversationError;
use colloquy_types::page::Page;
use colloquy_types::session::{Session, SessionId, SessionSummary};
use colloquy_types::turn::{HistoryStep, SessionHistory};
use tracing::debug;

use crate::context::stashed;
use crate::repository::session::SessionRepository;
use crate::repository::turn::TurnRepository;

pub struct ConversationQueryService<S: SessionRepository, T: TurnRepository> {
    sessions: S,
    turns: T,
    empty_result_policy: EmptyResultPolicy,
}

impl<S: SessionRepository, T: TurnRepository> ConversationQueryService<S, T> {
    pub fn new(sessions: S, turns: T) -> Self {
        Self {
            sessions,
            turns,
            empty_result_policy: EmptyResultPolicy::default(),
        }
    }

    pub fn with_empty_result_policy(mut self, policy: EmptyResultPolicy) -> Self {
        self.empty_result_policy = policy;
        self
    }

    /// One page of a session's turns, oldest first.
    #[tracing::instrument(skip(self), fields(from = page.from, size = page.size))]
    pub async fn get_history(
        &self,
        session_id: &str,
        page: Page,
    ) -> Result<SessionHistory, ConversationError> {
        let session_id = SessionId::from_optional(Some(session_id))
            .ok_or_else(|| ConversationError::InvalidRequest("session id is required".to_string()))?;
        page.validate().map_err(ConversationError::InvalidRequest)?;

        let turns = stashed(self.turns.turn_page(&session_id, page)).await?;
        debug!(session_id = %session_id, turns = turns.len(), "Fetched history page");

        if turns.is_empty() && self.empty_result_policy == EmptyResultPolicy::NotFound {
            return Err(ConversationError::NotFound(format!(
                "no history for session '{session_id}'"
            )));
        }

        Ok(SessionHistory {
            session_id,
            steps: turns.into_iter().map(HistoryStep::from).collect(),
        })
    }

    /// One page of sessions, oldest first.
    #[tracing::instrument(skip(self), fields(from = page.from, size = page.size))]
    pub async fn list_sessions(&self, page: Page) -> Result<Vec<SessionSummary>, ConversationError> {
        page.validate().map_err(ConversationError::InvalidRequest)?;

        let sessions = stashed(self.sessions.list_sessions(page)).await?;
        debug!(sessions = sessions.len(), "Fetched session page");

        if sessions.is_empty() && self.empty_result_policy == EmptyResultPolicy::NotFound {
            return Err(ConversationError::NotFound("no sessions".to_string()));
        }

        Ok(sessions.into_iter().map(SessionSummary::from).collect())
    }

    /// Point lookup of one session.
    pub async fn get_session(&self, session_id: &str) -> Result<Session, ConversationError> {
        let id = SessionId::from_optional(Some(session_id))
            .ok_or_else(|| ConversationError::InvalidRequest("session id is required".to_string()))?;
        stashed(self.sessions.get_session(&id))
            .await?
            .ok_or_else(|| ConversationError::NotFound(format!("session '{id}'")))
    }
}
