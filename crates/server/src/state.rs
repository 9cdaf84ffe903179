//! Shared application state

use std::sync::Arc;

use crate::ai::{Completer, OpenAiClient};
use crate::config::Config;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub completer: Arc<dyn Completer>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(completer: Arc<dyn Completer>, sessions: SessionStore) -> Self {
        Self {
            completer,
            sessions,
        }
    }

    /// State backed by the real chat-completion client
    pub fn from_config(config: &Config) -> Self {
        let client = OpenAiClient::new(
            config.openai_api_key.clone(),
            &config.openai_base_url,
            &config.openai_model,
            config.ai_timeout,
        );
        Self::new(Arc::new(client), SessionStore::new())
    }
}
