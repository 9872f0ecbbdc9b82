//! Wiring for one chat session: transcript, dispatcher and transcript log.

use std::error::Error;
use std::sync::Arc;

use crate::core::backend::OpenAiBackend;
use crate::core::config::data::{BackendSettings, Config};
use crate::core::conversation::ConversationStore;
use crate::core::credentials::CredentialResolver;
use crate::core::dispatcher::{PendingReply, ResponseDispatcher, TurnError};
use crate::core::message::Message;
use crate::utils::logging::LoggingState;

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Overrides the configured model for this session only
    pub model: Option<String>,
    /// Transcript log file
    pub log_file: Option<String>,
    /// Skip the keyring and read the key from the environment only
    pub env_only: bool,
}

pub struct ChatSession {
    pub store: ConversationStore,
    pub dispatcher: ResponseDispatcher,
    pub settings: BackendSettings,
    logging: LoggingState,
}

impl ChatSession {
    pub fn new(config: &Config, options: SessionOptions) -> Result<Self, Box<dyn Error>> {
        let mut settings = config.backend_settings();
        if let Some(model) = options.model.filter(|m| !m.trim().is_empty()) {
            settings.model = model;
        }

        let resolver = if options.env_only {
            CredentialResolver::env_only(config.credential_name())
        } else {
            CredentialResolver::system(config.credential_name())
        };
        let backend = Arc::new(OpenAiBackend::new(settings.clone())?);
        let dispatcher = ResponseDispatcher::new(resolver, backend, settings.context_window);
        let logging = LoggingState::new(options.log_file)?;

        tracing::info!(
            backend = %settings.backend_name,
            model = %settings.model,
            context_window = settings.context_window,
            "session started"
        );

        let session = Self::from_parts(
            ConversationStore::new(config.greeting()),
            dispatcher,
            settings,
            logging,
        );
        if let Some(greeting) = session.store.last() {
            session.log(greeting);
        }
        Ok(session)
    }

    pub fn from_parts(
        store: ConversationStore,
        dispatcher: ResponseDispatcher,
        settings: BackendSettings,
        logging: LoggingState,
    ) -> Self {
        Self {
            store,
            dispatcher,
            settings,
            logging,
        }
    }

    pub fn logging_status(&self) -> String {
        self.logging.get_status_string()
    }

    fn log(&self, message: &Message) {
        if let Err(err) = self.logging.log_message(message) {
            tracing::warn!(error = %err, "failed to write transcript log");
        }
    }

    /// Records the user message and decides how the reply is produced.
    pub fn begin_turn(&mut self, user_text: &str) -> Result<PendingReply, TurnError> {
        let pending = self.dispatcher.begin_turn(&mut self.store, user_text)?;
        if let Some(user_message) = self.store.last() {
            self.log(user_message);
        }
        Ok(pending)
    }

    pub fn finish_turn(&mut self, reply: String) -> Result<Message, TurnError> {
        let message = self.dispatcher.finish_turn(&mut self.store, reply)?;
        self.log(&message);
        Ok(message)
    }

    pub async fn submit(&mut self, user_text: &str) -> Result<Message, TurnError> {
        let pending = self.begin_turn(user_text)?;
        let reply = pending.resolve().await;
        self.finish_turn(reply)
    }
}
