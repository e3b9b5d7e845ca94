use super::base::{ChatProvider, ChatResponse, GenerationOptions};
use super::errors::ProviderError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Box<dyn Fn(&str, &str) -> Result<String, ProviderError> + Send + Sync>;

/// A recorded call made against a [`MockProvider`]
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub model: String,
    pub prompt: String,
}

/// A chat provider with a fixed set of installed models and a scripted reply
/// function, for exercising runners without a live service.
pub struct MockProvider {
    installed: Option<Vec<String>>,
    responder: Responder,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockProvider {
    /// Every call succeeds with `reply`
    pub fn replying(installed: Vec<&str>, reply: &str) -> Self {
        let reply = reply.to_string();
        Self::with_responder(installed, move |_, _| Ok(reply.clone()))
    }

    /// Every call fails with a service error
    pub fn failing(installed: Vec<&str>, message: &str) -> Self {
        let message = message.to_string();
        Self::with_responder(installed, move |_, _| {
            Err(ProviderError::Service(message.clone()))
        })
    }

    /// Replies are computed from `(model, prompt)`
    pub fn with_responder(
        installed: Vec<&str>,
        responder: impl Fn(&str, &str) -> Result<String, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            installed: Some(installed.into_iter().map(String::from).collect()),
            responder: Box::new(responder),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Listing models fails as if the service were down
    pub fn unreachable() -> Self {
        Self {
            installed: None,
            responder: Box::new(|_, _| {
                Err(ProviderError::Unavailable("connection refused".to_string()))
            }),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        _options: &GenerationOptions,
        _timeout: Duration,
    ) -> Result<ChatResponse, ProviderError> {
        self.calls.lock().unwrap().push(MockCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
        });
        let text = (self.responder)(model, prompt)?;
        Ok(ChatResponse::new(text, Duration::from_millis(10)))
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        self.installed
            .clone()
            .ok_or_else(|| ProviderError::Unavailable("connection refused".to_string()))
    }
}
