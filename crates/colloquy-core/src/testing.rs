//! In-memory store doubles and a scripted engine for unit tests.
//!
//! Each double counts its calls, records the principal active during each
//! call, and can be told to fail a specific operation.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use colloquy_types::error::RepositoryError;
use colloquy_types::inference::{InferenceError, InferenceOutput, InferenceRequest};
use colloquy_types::page::Page;
use colloquy_types::session::{NewSession, Session, SessionId};
use colloquy_types::turn::{NewTurn, Turn};

use crate::context::{Principal, current_principal};
use crate::inference::engine::InferenceEngine;
use crate::repository::session::SessionRepository;
use crate::repository::turn::TurnRepository;

#[derive(Default)]
pub struct SessionState {
    pub sessions: Vec<Session>,
    pub calls: usize,
    pub principals: Vec<Principal>,
    pub fail_init: bool,
    pub fail_create: bool,
    pub fail_read: bool,
    pub fail_touch: bool,
}

#[derive(Clone, Default)]
pub struct InMemorySessions {
    state: Arc<Mutex<SessionState>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&self, f: impl FnOnce(&mut SessionState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn principals(&self) -> Vec<Principal> {
        self.state.lock().unwrap().principals.clone()
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.state.lock().unwrap().sessions.clone()
    }

    fn enter(&self) -> MutexGuard<'_, SessionState> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.principals.push(current_principal());
        state
    }
}

impl SessionRepository for InMemorySessions {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        let state = self.enter();
        if state.fail_init {
            return Err(RepositoryError::Init("session collection unavailable".to_string()));
        }
        Ok(())
    }

    async fn create_session(&self, session: &NewSession) -> Result<SessionId, RepositoryError> {
        let mut state = self.enter();
        if state.fail_create {
            return Err(RepositoryError::Write("session index rejected write".to_string()));
        }
        let id = SessionId(format!("s{}", state.sessions.len() + 1));
        state.sessions.push(Session {
            id: id.clone(),
            title: session.title.clone(),
            model_id: session.model_id.clone(),
            user_id: session.user_id.clone(),
            created_at: session.created_at,
            last_updated_at: session.created_at,
        });
        Ok(id)
    }

    async fn get_session(&self, session_id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let state = self.enter();
        if state.fail_read {
            return Err(RepositoryError::Read("session index unreachable".to_string()));
        }
        Ok(state.sessions.iter().find(|s| &s.id == session_id).cloned())
    }

    async fn list_sessions(&self, page: Page) -> Result<Vec<Session>, RepositoryError> {
        let state = self.enter();
        if state.fail_read {
            return Err(RepositoryError::Read("session index unreachable".to_string()));
        }
        let mut sessions = state.sessions.clone();
        sessions.sort_by_key(|s| s.created_at);
        Ok(sessions
            .into_iter()
            .skip(page.from as usize)
            .take(page.size as usize)
            .collect())
    }

    async fn touch_session(
        &self,
        session_id: &SessionId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.enter();
        if state.fail_touch {
            return Err(RepositoryError::Write("session index rejected update".to_string()));
        }
        if let Some(session) = state.sessions.iter_mut().find(|s| &s.id == session_id) {
            session.last_updated_at = at;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct TurnState {
    pub turns: Vec<Turn>,
    pub calls: usize,
    pub principals: Vec<Principal>,
    pub fail_init: bool,
    pub fail_append: bool,
    pub fail_read: bool,
}

#[derive(Clone, Default)]
pub struct InMemoryTurns {
    state: Arc<Mutex<TurnState>>,
}

impl InMemoryTurns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&self, f: impl FnOnce(&mut TurnState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn principals(&self) -> Vec<Principal> {
        self.state.lock().unwrap().principals.clone()
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.state.lock().unwrap().turns.clone()
    }

    /// Seed a turn directly, bypassing call accounting.
    pub fn seed(&self, session_id: &str, question: &str, answer: &str, created_at: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        let id = format!("t{}", state.turns.len() + 1);
        state.turns.push(Turn {
            id,
            session_id: SessionId(session_id.to_string()),
            question: question.to_string(),
            answer: answer.to_string(),
            created_at,
            last_updated_at: created_at,
        });
    }

    fn enter(&self) -> MutexGuard<'_, TurnState> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.principals.push(current_principal());
        state
    }

    /// Turns of one session in ascending order; the stable sort keeps
    /// insertion order for equal timestamps.
    fn ascending(state: &TurnState, session_id: &SessionId) -> Vec<Turn> {
        let mut turns: Vec<Turn> = state
            .turns
            .iter()
            .filter(|t| &t.session_id == session_id)
            .cloned()
            .collect();
        turns.sort_by_key(|t| t.created_at);
        turns
    }
}

impl TurnRepository for InMemoryTurns {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        let state = self.enter();
        if state.fail_init {
            return Err(RepositoryError::Init("turn collection unavailable".to_string()));
        }
        Ok(())
    }

    async fn append_turn(&self, turn: &NewTurn) -> Result<String, RepositoryError> {
        let mut state = self.enter();
        if state.fail_append {
            return Err(RepositoryError::Write("turn index rejected write".to_string()));
        }
        let id = format!("t{}", state.turns.len() + 1);
        state.turns.push(Turn {
            id: id.clone(),
            session_id: turn.session_id.clone(),
            question: turn.question.clone(),
            answer: turn.answer.clone(),
            created_at: turn.created_at,
            last_updated_at: turn.created_at,
        });
        Ok(id)
    }

    async fn recent_turns(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<Turn>, RepositoryError> {
        let state = self.enter();
        if state.fail_read {
            return Err(RepositoryError::Read("turn index unreachable".to_string()));
        }
        let mut turns = Self::ascending(&state, session_id);
        turns.reverse();
        turns.truncate(limit as usize);
        Ok(turns)
    }

    async fn turn_page(&self, session_id: &SessionId, page: Page) -> Result<Vec<Turn>, RepositoryError> {
        let state = self.enter();
        if state.fail_read {
            return Err(RepositoryError::Read("turn index unreachable".to_string()));
        }
        Ok(Self::ascending(&state, session_id)
            .into_iter()
            .skip(page.from as usize)
            .take(page.size as usize)
            .collect())
    }
}

/// Engine returning a fixed answer (or a fixed failure) and recording requests.
pub struct ScriptedEngine {
    result: Result<String, String>,
    requests: Arc<Mutex<Vec<InferenceRequest>>>,
}

impl ScriptedEngine {
    pub fn answering(answer: &str) -> Self {
        Self {
            result: Ok(answer.to_string()),
            requests: Arc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<InferenceRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl InferenceEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn predict(&self, request: &InferenceRequest) -> Result<InferenceOutput, InferenceError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.result {
            Ok(answer) => Ok(InferenceOutput {
                answer: answer.clone(),
            }),
            Err(message) => Err(InferenceError::Engine {
                message: message.clone(),
            }),
        }
    }
}
