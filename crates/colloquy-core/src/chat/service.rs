//! Chat service orchestrating one conversational turn.
//!
//! ChatService wires the history window, the inference invoker, and the turn
//! recorder into the chat pipeline, and exposes explicit session creation.

use colloquy_types::chat::{ChatRequest, ChatResponse, CreateSessionRequest, CreateSessionResponse};
use colloquy_types::error::ConversationError;
use colloquy_types::session::NewSession;
use tracing::info;

use super::history::HistoryWindow;
use super::recorder::{TurnRecorder, open_session};
use super::stage::PendingTurn;
use crate::inference::box_engine::BoxInferenceEngine;
use crate::inference::invoker::InferenceInvoker;
use crate::repository::session::SessionRepository;
use crate::repository::turn::TurnRepository;

/// Default number of turns recalled as context.
pub const DEFAULT_HISTORY_WINDOW: u32 = 20;

/// Orchestrates the chat request path.
///
/// Generic over `SessionRepository` and `TurnRepository` so colloquy-core
/// never depends on colloquy-infra.
pub struct ChatService<S: SessionRepository, T: TurnRepository> {
    sessions: S,
    turns: T,
    invoker: InferenceInvoker,
    history_window: u32,
}

impl<S: SessionRepository, T: TurnRepository> ChatService<S, T> {
    pub fn new(sessions: S, turns: T, engine: BoxInferenceEngine) -> Self {
        Self {
            sessions,
            turns,
            invoker: InferenceInvoker::new(engine),
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Override how many recent turns are fed back to the engine.
    pub fn with_history_window(mut self, turns: u32) -> Self {
        self.history_window = turns;
        self
    }

    pub fn history_window(&self) -> u32 {
        self.history_window
    }

    pub fn engine_name(&self) -> &str {
        self.invoker.engine_name()
    }

    /// Answer a question, continuing or opening a session.
    ///
    /// Steps run strictly in order and the first failure ends the request:
    /// validate, recall history, invoke the engine, open a session when none
    /// was given, append the turn. The returned session id is always durable.
    #[tracing::instrument(
        skip_all,
        fields(
            model_id = request.model_id.as_deref().unwrap_or(""),
            session_id = tracing::field::Empty
        )
    )]
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ConversationError> {
        let pending = PendingTurn::from_request(request)?;
        if let Some(id) = pending.session_id() {
            tracing::Span::current().record("session_id", id.as_str());
        }

        let history = HistoryWindow::new(&self.turns, self.history_window)
            .read(pending.session_id())
            .await?;

        let answer = self
            .invoker
            .invoke(pending.model_id(), pending.parameters(), &history)
            .await?;

        let recorded = TurnRecorder::new(&self.sessions, &self.turns)
            .record(pending.answered(answer))
            .await?;

        if recorded.session_created() {
            tracing::Span::current().record("session_id", recorded.session_id().as_str());
        }
        Ok(recorded.into_response())
    }

    /// Create an empty session on behalf of a user, before any turn.
    #[tracing::instrument(skip_all)]
    pub async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CreateSessionResponse, ConversationError> {
        let user_id = required(request.user_id.as_deref(), "user id")?;
        let model_id = required(request.model_id.as_deref(), "model id")?;

        let session_id = open_session(&self.sessions, &NewSession::for_user(user_id, model_id)).await?;
        info!(session_id = %session_id, user_id, "Session created on request");
        Ok(CreateSessionResponse { session_id })
    }
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, ConversationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConversationError::InvalidRequest(format!("{what} is required")))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use colloquy_types::chat::{CHAT_HISTORY_FORMAT_PARAM, CHAT_HISTORY_PARAM};
    use colloquy_types::page::Page;

    use super::*;
    use crate::chat::query::ConversationQueryService;
    use crate::context::{Principal, as_caller, current_principal};
    use crate::testing::{InMemorySessions, InMemoryTurns, ScriptedEngine};

    struct Fixture {
        sessions: InMemorySessions,
        turns: InMemoryTurns,
        requests: std::sync::Arc<std::sync::Mutex<Vec<colloquy_types::inference::InferenceRequest>>>,
        service: ChatService<InMemorySessions, InMemoryTurns>,
    }

    fn fixture(engine: ScriptedEngine) -> Fixture {
        let sessions = InMemorySessions::new();
        let turns = InMemoryTurns::new();
        let requests = engine.requests();
        let service = ChatService::new(sessions.clone(), turns.clone(), BoxInferenceEngine::new(engine));
        Fixture {
            sessions,
            turns,
            requests,
            service,
        }
    }

    fn query(f: &Fixture) -> ConversationQueryService<InMemorySessions, InMemoryTurns> {
        ConversationQueryService::new(f.sessions.clone(), f.turns.clone())
    }

    #[tokio::test]
    async fn test_new_chat_creates_session_and_records_turn() {
        let f = fixture(ScriptedEngine::answering("hi there"));

        let response = f.service.chat(ChatRequest::new("m1", "hello")).await.unwrap();
        assert_eq!(response.session_id.as_str(), "s1");
        assert_eq!(response.answer, "hi there");

        let history = query(&f).get_history("s1", Page::new(0, 10)).await.unwrap();
        assert_eq!(history.session_id.as_str(), "s1");
        assert_eq!(history.steps.len(), 1);
        assert_eq!(history.steps[0].question, "hello");
        assert_eq!(history.steps[0].answer, "hi there");
    }

    #[tokio::test]
    async fn test_new_chat_sends_empty_history_without_reading() {
        let f = fixture(ScriptedEngine::answering("a"));
        f.service.chat(ChatRequest::new("m1", "q")).await.unwrap();

        let requests = f.requests.lock().unwrap();
        assert_eq!(requests[0].parameters[CHAT_HISTORY_PARAM], "[]");
        assert_eq!(requests[0].parameters[CHAT_HISTORY_FORMAT_PARAM], "json_array_v1");
        // ensure_schema + append only; no recent_turns
        assert_eq!(f.turns.calls(), 2);
    }

    #[tokio::test]
    async fn test_session_reuse_appends_in_order() {
        let f = fixture(ScriptedEngine::answering("a"));
        let first = f.service.chat(ChatRequest::new("m1", "q1")).await.unwrap();
        let second = f
            .service
            .chat(ChatRequest::new("m1", "q2").in_session(first.session_id.as_str()))
            .await
            .unwrap();
        assert_eq!(first.session_id, second.session_id);
        assert_eq!(f.sessions.sessions().len(), 1);

        let history = query(&f)
            .get_history(first.session_id.as_str(), Page::new(0, 10))
            .await
            .unwrap();
        let questions: Vec<_> = history.steps.iter().map(|s| s.question.as_str()).collect();
        assert_eq!(questions, vec!["q1", "q2"]);
    }

    #[tokio::test]
    async fn test_context_is_chronological() {
        let f = fixture(ScriptedEngine::answering("a3"));
        let base = Utc::now() - Duration::minutes(5);
        f.turns.seed("s1", "q1", "a1", base);
        f.turns.seed("s1", "q2", "a2", base + Duration::seconds(1));

        f.service
            .chat(ChatRequest::new("m1", "q3").in_session("s1"))
            .await
            .unwrap();

        let requests = f.requests.lock().unwrap();
        assert_eq!(
            requests[0].parameters[CHAT_HISTORY_PARAM],
            r#"["q1","a1","q2","a2"]"#
        );
    }

    #[tokio::test]
    async fn test_history_window_bounds_context() {
        let f = fixture(ScriptedEngine::answering("a"));
        let base = Utc::now() - Duration::minutes(5);
        f.turns.seed("s1", "old", "x", base);
        f.turns.seed("s1", "new", "y", base + Duration::seconds(1));

        let engine = ScriptedEngine::answering("z");
        let requests = engine.requests();
        let service = ChatService::new(f.sessions.clone(), f.turns.clone(), BoxInferenceEngine::new(engine))
            .with_history_window(1);
        assert_eq!(service.history_window(), 1);
        service
            .chat(ChatRequest::new("m1", "q").in_session("s1"))
            .await
            .unwrap();
        assert_eq!(
            requests.lock().unwrap()[0].parameters[CHAT_HISTORY_PARAM],
            r#"["new","y"]"#
        );
    }

    #[tokio::test]
    async fn test_unused_session_id_proceeds_with_empty_context() {
        let f = fixture(ScriptedEngine::answering("a"));
        let response = f
            .service
            .chat(ChatRequest::new("m1", "q").in_session("fresh"))
            .await
            .unwrap();
        assert_eq!(response.session_id.as_str(), "fresh");
        assert_eq!(f.requests.lock().unwrap()[0].parameters[CHAT_HISTORY_PARAM], "[]");
        assert_eq!(f.turns.turns().len(), 1);
        assert!(f.sessions.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_missing_model_touches_nothing() {
        let f = fixture(ScriptedEngine::answering("a"));
        let mut request = ChatRequest::new("m1", "q").in_session("s1");
        request.model_id = None;

        let err = f.service.chat(request).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");
        assert_eq!(f.sessions.calls(), 0);
        assert_eq!(f.turns.calls(), 0);
        assert!(f.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_inference_failure_writes_nothing() {
        let f = fixture(ScriptedEngine::failing("model exploded"));
        let err = f.service.chat(ChatRequest::new("m1", "q")).await.unwrap_err();
        assert_eq!(err.code(), "INFERENCE_ERROR");
        assert_eq!(f.sessions.calls(), 0);
        assert_eq!(f.turns.calls(), 0);
    }

    #[tokio::test]
    async fn test_history_failure_skips_inference() {
        let f = fixture(ScriptedEngine::answering("a"));
        f.turns.configure(|s| s.fail_read = true);

        let err = f
            .service
            .chat(ChatRequest::new("m1", "q").in_session("s1"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "HISTORY_UNAVAILABLE");
        assert!(f.requests.lock().unwrap().is_empty());
        assert!(f.turns.turns().is_empty());
    }

    #[tokio::test]
    async fn test_turn_append_failure_reports_created_session() {
        let f = fixture(ScriptedEngine::answering("a"));
        f.turns.configure(|s| s.fail_append = true);

        let err = f.service.chat(ChatRequest::new("m1", "q")).await.unwrap_err();
        assert_eq!(err.code(), "TURN_APPEND_ERROR");
        assert_eq!(f.sessions.sessions().len(), 1);

        let history = query(&f).get_history("s1", Page::new(0, 10)).await.unwrap();
        assert!(history.steps.is_empty());
    }

    #[tokio::test]
    async fn test_turn_schema_failure_leaves_empty_session() {
        let f = fixture(ScriptedEngine::answering("a"));
        f.turns.configure(|s| s.fail_init = true);

        let err = f.service.chat(ChatRequest::new("m1", "q")).await.unwrap_err();
        assert_eq!(err.code(), "TURN_APPEND_ERROR");
        assert!(err.describe().contains("schema initialization failed"));
        assert!(f.turns.turns().is_empty());

        let sessions = f.sessions.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].title.as_deref(), Some("q"));
    }

    #[tokio::test]
    async fn test_concurrent_new_chats_get_distinct_sessions() {
        let f = fixture(ScriptedEngine::answering("a"));
        let (a, b) = tokio::join!(
            f.service.chat(ChatRequest::new("m1", "q")),
            f.service.chat(ChatRequest::new("m1", "q")),
        );
        assert_ne!(a.unwrap().session_id, b.unwrap().session_id);
        assert_eq!(f.sessions.sessions().len(), 2);
    }

    #[tokio::test]
    async fn test_caller_principal_restored_around_backend_calls() {
        let f = fixture(ScriptedEngine::answering("a"));
        let caller = Principal::User("alice".to_string());

        as_caller(caller.clone(), async {
            f.service
                .chat(ChatRequest::new("m1", "q1"))
                .await
                .unwrap();
            assert_eq!(current_principal(), caller);

            f.sessions.configure(|s| s.fail_create = true);
            let err = f.service.chat(ChatRequest::new("m1", "q2")).await.unwrap_err();
            assert_eq!(err.code(), "SESSION_CREATION_ERROR");
            assert_eq!(current_principal(), caller);
        })
        .await;

        assert!(f.sessions.principals().iter().all(|p| *p == Principal::System));
        assert!(f.turns.principals().iter().all(|p| *p == Principal::System));
    }

    #[tokio::test]
    async fn test_create_session_requires_user_and_model() {
        let f = fixture(ScriptedEngine::answering("a"));
        let err = f
            .service
            .create_session(CreateSessionRequest {
                user_id: Some("u1".to_string()),
                model_id: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");

        let err = f
            .service
            .create_session(CreateSessionRequest {
                user_id: Some(" ".to_string()),
                model_id: Some("m1".to_string()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");
        assert_eq!(f.sessions.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_session_records_user() {
        let f = fixture(ScriptedEngine::answering("a"));
        let response = f
            .service
            .create_session(CreateSessionRequest {
                user_id: Some("u1".to_string()),
                model_id: Some("m1".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(response.session_id.as_str(), "s1");

        let stored = f.sessions.sessions();
        assert_eq!(stored[0].user_id.as_deref(), Some("u1"));
        assert!(stored[0].title.is_none());
    }
}
