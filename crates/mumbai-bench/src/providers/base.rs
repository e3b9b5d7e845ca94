use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::ProviderError;

/// Text returned by a single chat call together with how long the call took
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub text: String,
    pub elapsed: Duration,
}

impl ChatResponse {
    pub fn new(text: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            text: text.into(),
            elapsed,
        }
    }
}

/// Sampling options forwarded to the model runtime. Unset fields are left to
/// the runtime's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

impl GenerationOptions {
    /// Settings the evaluation script historically ran with.
    pub fn reproducible() -> Self {
        Self {
            num_ctx: Some(2048),
            temperature: Some(0.3),
            seed: Some(42),
            top_k: Some(40),
            repeat_penalty: Some(1.1),
            num_predict: Some(512),
        }
    }

    pub fn with_num_predict(mut self, num_predict: i32) -> Self {
        self.num_predict = Some(num_predict);
        self
    }
}

/// Boundary to a chat service hosting one or more named models.
///
/// Implementations perform exactly one request per call; retry policy, if
/// any, belongs to the caller.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a single user prompt to `model` and wait for the full reply
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
        timeout: Duration,
    ) -> Result<ChatResponse, ProviderError>;

    /// Names of the models installed on the service
    async fn list_models(&self) -> Result<Vec<String>, ProviderError>;

    /// True iff `model` is a prefix of some installed model name, so `llama3`
    /// matches an installed `llama3:latest`.
    async fn is_available(&self, model: &str) -> Result<bool, ProviderError> {
        let installed = self.list_models().await?;
        Ok(installed.iter().any(|name| name.starts_with(model)))
    }
}
