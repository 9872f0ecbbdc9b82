//! Turn orchestration.
//!
//! A turn moves through [`TurnState`]: the user text is validated and
//! recorded, the credential decides between the backend and the local
//! fallback, and the reply is recorded as an assistant message. Backend
//! failures never escape a turn; they become the reply text.
//!
//! The turn is split so the slow part can run off the UI thread:
//! [`ResponseDispatcher::begin_turn`] records the user message and returns
//! an owned [`PendingReply`], [`PendingReply::resolve`] performs the backend
//! call, and [`ResponseDispatcher::finish_turn`] records the reply. Both ends
//! take the store by `&mut`, so two turns can never overlap on one store.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use tokio::task::JoinError;

use crate::core::backend::{BackendFailure, CompletionBackend};
use crate::core::conversation::{ConversationStore, MessageError};
use crate::core::credentials::{BackendCredential, CredentialResolver};
use crate::core::message::{Message, TranscriptRole};

pub const FALLBACK_PREFIX: &str = "Assistant (demo): I received your message: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingUserInput,
    UserAppended,
    BackendDecision,
    AssistantAppended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// Submitted text was blank; nothing was recorded.
    EmptyInput,
    InvalidMessage(MessageError),
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::EmptyInput => write!(f, "cannot send an empty message"),
            TurnError::InvalidMessage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TurnError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TurnError::EmptyInput => None,
            TurnError::InvalidMessage(err) => Some(err),
        }
    }
}

impl From<MessageError> for TurnError {
    fn from(err: MessageError) -> Self {
        TurnError::InvalidMessage(err)
    }
}

pub fn fallback_reply(user_text: &str) -> String {
    format!("{FALLBACK_PREFIX}{user_text}")
}

/// Reply still to be produced for a recorded user message.
pub enum PendingReply {
    Fallback(String),
    Backend {
        backend: Arc<dyn CompletionBackend>,
        history: Vec<Message>,
        prompt: String,
        credential: BackendCredential,
    },
}

impl PendingReply {
    pub fn uses_backend(&self) -> bool {
        matches!(self, PendingReply::Backend { .. })
    }

    /// Produces the assistant text. Owns everything it needs, so it can be
    /// moved onto a worker task.
    pub async fn resolve(self) -> String {
        match self {
            PendingReply::Fallback(text) => text,
            PendingReply::Backend {
                backend,
                history,
                prompt,
                credential,
            } => match backend.complete(&history, &prompt, &credential).await {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => failure_text(
                    backend.name(),
                    &BackendFailure::Malformed("completion had no content".to_string()),
                ),
                Err(failure) => failure_text(backend.name(), &failure),
            },
        }
    }
}

/// The single mapping from a backend failure to chat text.
fn failure_text(backend_name: &str, failure: &BackendFailure) -> String {
    tracing::warn!(backend = backend_name, error = %failure, "backend call failed");
    failure.in_band_message(backend_name)
}

/// Reply text for a worker task that panicked or was aborted before
/// [`PendingReply::resolve`] finished.
pub fn worker_failure_reply(backend_name: &str, err: &JoinError) -> String {
    failure_text(backend_name, &BackendFailure::Transport(err.to_string()))
}

pub struct ResponseDispatcher {
    resolver: CredentialResolver,
    backend: Arc<dyn CompletionBackend>,
    context_window: usize,
    state: TurnState,
}

impl ResponseDispatcher {
    pub fn new(
        resolver: CredentialResolver,
        backend: Arc<dyn CompletionBackend>,
        context_window: usize,
    ) -> Self {
        Self {
            resolver,
            backend,
            context_window,
            state: TurnState::Idle,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Whether the next turn would reach the backend.
    pub fn has_credential(&self) -> bool {
        self.resolver.resolve().is_some()
    }

    fn transition(&mut self, next: TurnState) {
        tracing::debug!(from = ?self.state, to = ?next, "turn state");
        self.state = next;
    }

    /// Runs a full turn and returns the recorded assistant message.
    pub async fn handle_turn(
        &mut self,
        store: &mut ConversationStore,
        user_text: &str,
    ) -> Result<Message, TurnError> {
        let pending = self.begin_turn(store, user_text)?;
        let reply = pending.resolve().await;
        self.finish_turn(store, reply)
    }

    pub fn begin_turn(
        &mut self,
        store: &mut ConversationStore,
        user_text: &str,
    ) -> Result<PendingReply, TurnError> {
        self.transition(TurnState::AwaitingUserInput);
        let text = user_text.trim();
        if text.is_empty() {
            self.transition(TurnState::Idle);
            return Err(TurnError::EmptyInput);
        }

        if let Err(err) = store.append(TranscriptRole::User, text) {
            self.transition(TurnState::Idle);
            return Err(err.into());
        }
        self.transition(TurnState::UserAppended);

        self.transition(TurnState::BackendDecision);
        let Some(credential) = self.resolver.resolve() else {
            tracing::info!("no backend credential; answering locally");
            return Ok(PendingReply::Fallback(fallback_reply(text)));
        };

        // The new prompt travels separately, so leave it out of the history.
        let context = store.recent(self.context_window + 1);
        let history = context[..context.len() - 1].to_vec();

        Ok(PendingReply::Backend {
            backend: Arc::clone(&self.backend),
            history,
            prompt: text.to_string(),
            credential,
        })
    }

    pub fn finish_turn(
        &mut self,
        store: &mut ConversationStore,
        reply: String,
    ) -> Result<Message, TurnError> {
        let message = match store.append(TranscriptRole::Assistant, reply) {
            Ok(message) => message,
            Err(err) => {
                self.transition(TurnState::Idle);
                return Err(err.into());
            }
        };
        self.transition(TurnState::AssistantAppended);
        self.transition(TurnState::Idle);
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credentials::fakes::MapSource;
    use crate::core::credentials::SecretSource;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const KEY: &str = "OPENAI_API_KEY";

    struct BlankBackend;

    #[async_trait]
    impl CompletionBackend for BlankBackend {
        fn name(&self) -> &str {
            "TestBackend"
        }

        async fn complete(
            &self,
            _history: &[Message],
            _new_prompt: &str,
            _credential: &BackendCredential,
        ) -> Result<String, BackendFailure> {
            Ok("   ".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<(Vec<String>, String)>>,
        failure: Option<BackendFailure>,
    }

    #[async_trait]
    impl CompletionBackend for RecordingBackend {
        fn name(&self) -> &str {
            "TestBackend"
        }

        async fn complete(
            &self,
            history: &[Message],
            new_prompt: &str,
            credential: &BackendCredential,
        ) -> Result<String, BackendFailure> {
            assert_eq!(credential.expose(), "sk-test");
            self.calls.lock().unwrap().push((
                history.iter().map(|m| m.content.clone()).collect(),
                new_prompt.to_string(),
            ));
            match &self.failure {
                Some(failure) => Err(failure.clone()),
                None => Ok(format!("echo: {new_prompt}")),
            }
        }
    }

    fn resolver(with_key: bool) -> CredentialResolver {
        let source: Box<dyn SecretSource> = if with_key {
            Box::new(MapSource::with("fake", KEY, "sk-test"))
        } else {
            Box::new(MapSource::empty("fake"))
        };
        CredentialResolver::new(KEY, vec![source])
    }

    fn dispatcher(
        with_key: bool,
        backend: Arc<RecordingBackend>,
    ) -> ResponseDispatcher {
        ResponseDispatcher::new(resolver(with_key), backend, 12)
    }

    #[tokio::test]
    async fn fallback_scenario_without_credential() {
        let mut store = ConversationStore::default();
        let backend = Arc::new(RecordingBackend::default());
        let mut dispatcher = dispatcher(false, backend.clone());

        let reply = dispatcher
            .handle_turn(&mut store, "What is 2+2?")
            .await
            .expect("turn completes");

        assert_eq!(
            reply.content,
            "Assistant (demo): I received your message: What is 2+2?"
        );
        let roles: Vec<_> = store.all().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                TranscriptRole::Assistant,
                TranscriptRole::User,
                TranscriptRole::Assistant
            ]
        );
        assert_eq!(store.all()[1].content, "What is 2+2?");
        assert_eq!(store.last(), Some(&reply));
        assert!(backend.calls.lock().unwrap().is_empty());
        assert_eq!(dispatcher.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn fallback_echoes_hello_exactly() {
        let mut store = ConversationStore::default();
        let mut dispatcher = dispatcher(false, Arc::new(RecordingBackend::default()));
        let reply = dispatcher.handle_turn(&mut store, "hello").await.unwrap();
        assert_eq!(
            reply.content,
            "Assistant (demo): I received your message: hello"
        );
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_mutation() {
        let mut store = ConversationStore::default();
        let mut dispatcher = dispatcher(true, Arc::new(RecordingBackend::default()));

        for blank in ["", "   ", "\n\t"] {
            let err = dispatcher
                .handle_turn(&mut store, blank)
                .await
                .expect_err("blank input rejected");
            assert_eq!(err, TurnError::EmptyInput);
        }
        assert_eq!(store.len(), 1);
        assert_eq!(dispatcher.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn each_turn_adds_exactly_two_messages() {
        let mut store = ConversationStore::default();
        let mut dispatcher = dispatcher(true, Arc::new(RecordingBackend::default()));

        for i in 0..5 {
            let before = store.len();
            dispatcher
                .handle_turn(&mut store, &format!("question {i}"))
                .await
                .unwrap();
            assert_eq!(store.len(), before + 2);
            let _ = dispatcher.handle_turn(&mut store, " ").await;
            assert_eq!(store.len(), before + 2);
        }
    }

    #[tokio::test]
    async fn backend_receives_prior_history_and_new_prompt() {
        let mut store = ConversationStore::default();
        let backend = Arc::new(RecordingBackend::default());
        let mut dispatcher = dispatcher(true, backend.clone());

        let reply = dispatcher.handle_turn(&mut store, "  first  ").await.unwrap();
        assert_eq!(reply.content, "echo: first");

        let calls = backend.calls.lock().unwrap();
        let (history, prompt) = &calls[0];
        assert_eq!(prompt, "first");
        assert_eq!(history.len(), 1, "only the greeting precedes the prompt");
        assert!(!history.contains(&"first".to_string()));
    }

    #[tokio::test]
    async fn backend_history_is_bounded_to_window() {
        let mut store = ConversationStore::default();
        let backend = Arc::new(RecordingBackend::default());
        let mut dispatcher = dispatcher(true, backend.clone());

        for i in 0..10 {
            dispatcher
                .handle_turn(&mut store, &format!("q{i}"))
                .await
                .unwrap();
        }

        let calls = backend.calls.lock().unwrap();
        let (history, prompt) = calls.last().unwrap();
        assert_eq!(prompt, "q9");
        assert_eq!(history.len(), 12);
        assert_eq!(history.last().unwrap(), "echo: q8");
        assert_eq!(history.first().unwrap(), "q3");
    }

    #[tokio::test]
    async fn backend_failure_becomes_assistant_text() {
        let mut store = ConversationStore::default();
        let backend = Arc::new(RecordingBackend {
            failure: Some(BackendFailure::Timeout),
            ..Default::default()
        });
        let mut dispatcher = dispatcher(true, backend);

        let reply = dispatcher
            .handle_turn(&mut store, "hello")
            .await
            .expect("failures do not escape the turn");
        assert_eq!(reply.content, "Error calling TestBackend API: timeout");
        assert_eq!(reply.role, TranscriptRole::Assistant);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn split_turn_matches_handle_turn() {
        let mut store = ConversationStore::default();
        let mut dispatcher = dispatcher(true, Arc::new(RecordingBackend::default()));

        let pending = dispatcher.begin_turn(&mut store, "split").unwrap();
        assert!(pending.uses_backend());
        assert_eq!(dispatcher.state(), TurnState::BackendDecision);
        assert_eq!(store.len(), 2);

        let text = tokio::spawn(pending.resolve()).await.unwrap();
        let reply = dispatcher.finish_turn(&mut store, text).unwrap();
        assert_eq!(reply.content, "echo: split");
        assert_eq!(dispatcher.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn blank_backend_reply_still_completes_the_turn() {
        let mut store = ConversationStore::default();
        let mut dispatcher = ResponseDispatcher::new(resolver(true), Arc::new(BlankBackend), 12);

        let reply = dispatcher
            .handle_turn(&mut store, "hello")
            .await
            .expect("blank replies do not escape the turn");
        assert_eq!(
            reply.content,
            "Error calling TestBackend API: malformed response: completion had no content"
        );
        assert_eq!(store.len(), 3);
        assert_eq!(dispatcher.state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn panicked_worker_is_reported_in_band() {
        let err = tokio::spawn(async { panic!("worker blew up") })
            .await
            .expect_err("task panicked");
        let text = worker_failure_reply("TestBackend", &err);
        assert!(text.starts_with("Error calling TestBackend API: "));

        let mut store = ConversationStore::default();
        let mut dispatcher = dispatcher(true, Arc::new(RecordingBackend::default()));
        dispatcher.begin_turn(&mut store, "hi").unwrap();
        let reply = dispatcher.finish_turn(&mut store, text.clone()).unwrap();
        assert_eq!(reply.content, text);
        assert_eq!(store.len(), 3);
    }
}
