//! Turn recorder: lazily opens a session, then appends the answered turn.

use chrono::Utc;
use colloquy_types::error::ConversationError;
use colloquy_types::session::{NewSession, SessionId};
use colloquy_types::turn::NewTurn;
use tracing::{info, warn};

use super::stage::{AnsweredTurn, RecordedTurn};
use crate::context::stashed;
use crate::repository::session::SessionRepository;
use crate::repository::turn::TurnRepository;

pub struct TurnRecorder<'a, S: SessionRepository, T: TurnRepository> {
    sessions: &'a S,
    turns: &'a T,
}

impl<'a, S: SessionRepository, T: TurnRepository> TurnRecorder<'a, S, T> {
    pub fn new(sessions: &'a S, turns: &'a T) -> Self {
        Self { sessions, turns }
    }

    /// Make the answered turn durable.
    ///
    /// A turn without a session first opens one titled by its question. If
    /// the append then fails, the new session stays behind empty and the
    /// error carries its id.
    pub async fn record(&self, turn: AnsweredTurn) -> Result<RecordedTurn, ConversationError> {
        let AnsweredTurn {
            session_id,
            model_id,
            question,
            answer,
        } = turn;

        let (session_id, session_created) = match session_id {
            Some(id) => (id, false),
            None => {
                let new = NewSession::from_first_question(&question, &model_id);
                (open_session(self.sessions, &new).await?, true)
            }
        };

        let new_turn = NewTurn::now(session_id.clone(), question, answer.clone());
        let turn_id = self.append(&new_turn).await?;
        info!(session_id = %session_id, turn_id = %turn_id, "Turn recorded");

        if let Err(e) = stashed(self.sessions.touch_session(&session_id, Utc::now())).await {
            warn!(session_id = %session_id, error = %e, "Failed to bump session update time");
        }

        Ok(RecordedTurn {
            session_id,
            turn_id,
            answer,
            session_created,
        })
    }

    async fn append(&self, turn: &NewTurn) -> Result<String, ConversationError> {
        let wrap = |source| ConversationError::TurnAppend {
            session_id: turn.session_id.clone(),
            source,
        };
        stashed(self.turns.ensure_schema()).await.map_err(wrap)?;
        stashed(self.turns.append_turn(turn)).await.map_err(|source| {
            warn!(session_id = %turn.session_id, error = %source, "Turn append failed");
            wrap(source)
        })
    }
}

/// Ensure the session collection, then create a session.
///
/// Any failure, including schema initialization, is a `SessionCreation` error.
pub async fn open_session<S: SessionRepository>(
    sessions: &S,
    new: &NewSession,
) -> Result<SessionId, ConversationError> {
    stashed(sessions.ensure_schema())
        .await
        .map_err(ConversationError::SessionCreation)?;
    let session_id = stashed(sessions.create_session(new))
        .await
        .map_err(|e| {
            warn!(model_id = %new.model_id, error = %e, "Session creation failed");
            ConversationError::SessionCreation(e)
        })?;
    info!(session_id = %session_id, model_id = %new.model_id, "Session created");
    Ok(session_id)
}
