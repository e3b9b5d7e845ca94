use super::base::{ChatProvider, ChatResponse, GenerationOptions};
use super::errors::ProviderError;
use super::utils::{get_message_content, handle_response, request_error, resolve_base_url};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use url::Url;

pub const OLLAMA_HOST: &str = "localhost";
pub const OLLAMA_DEFAULT_PORT: u16 = 11434;
/// Upper bound for listing models; chat calls carry their own timeout.
const LIST_MODELS_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Chat adapter for a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: Url,
}

impl OllamaProvider {
    pub fn new(host: &str) -> Result<Self, ProviderError> {
        let base_url = resolve_base_url(host, OLLAMA_DEFAULT_PORT)?;
        let client = Client::builder()
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build client: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url.join(path).map_err(|e| {
            ProviderError::RequestFailed(format!("Failed to construct endpoint URL: {e}"))
        })
    }

    async fn send(request: RequestBuilder, timeout: Duration) -> Result<Value, ProviderError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| request_error(e, timeout))?;
        handle_response(response, timeout).await
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    #[tracing::instrument(skip(self, prompt, options), fields(prompt_chars = prompt.chars().count()))]
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
        timeout: Duration,
    ) -> Result<ChatResponse, ProviderError> {
        let url = self.endpoint("api/chat")?;

        let mut runtime_options = serde_json::to_value(options)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid options: {e}")))?;
        runtime_options["timeout"] = json!(timeout.as_millis() as u64);

        let payload = json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false,
            "options": runtime_options,
        });

        let start = Instant::now();
        let response = Self::send(self.client.post(url).json(&payload), timeout).await?;
        let elapsed = start.elapsed();

        let text = get_message_content(&response)?;
        tracing::debug!(model, elapsed_secs = elapsed.as_secs_f64(), "chat call finished");
        Ok(ChatResponse::new(text, elapsed))
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = self.endpoint("api/tags")?;
        let value = Self::send(self.client.get(url), LIST_MODELS_TIMEOUT).await?;
        let tags: TagsResponse = serde_json::from_value(value)
            .map_err(|e| ProviderError::RequestFailed(format!("Malformed model list: {e}")))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_mock_server(path_url: &str, template: ResponseTemplate) -> (MockServer, OllamaProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(path(path_url))
            .respond_with(template)
            .mount(&mock_server)
            .await;
        let provider = OllamaProvider::new(&mock_server.uri()).unwrap();
        (mock_server, provider)
    }

    fn tags_body() -> Value {
        json!({
            "models": [
                {"name": "falcon:7b-instruct", "size": 4_000_000_000u64},
                {"name": "llama3:latest", "size": 4_700_000_000u64}
            ]
        })
    }

    #[tokio::test]
    async fn test_complete_basic() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "model": "falcon:7b-instruct",
                "stream": false,
                "messages": [{"role": "user", "content": "What is Mumbai famous for?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "falcon:7b-instruct",
                "message": {"role": "assistant", "content": "Bollywood and vada pav."},
                "done": true
            })))
            .mount(&mock_server)
            .await;

        let provider = OllamaProvider::new(&mock_server.uri()).unwrap();
        let response = provider
            .complete(
                "falcon:7b-instruct",
                "What is Mumbai famous for?",
                &GenerationOptions::default(),
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert_eq!(response.text, "Bollywood and vada pav.");
    }

    #[tokio::test]
    async fn test_complete_forwards_options_and_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "options": {"seed": 42, "num_predict": 512, "timeout": 30000}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "ok"}
            })))
            .mount(&mock_server)
            .await;

        let provider = OllamaProvider::new(&mock_server.uri()).unwrap();
        let response = provider
            .complete(
                "llama3",
                "hi",
                &GenerationOptions::reproducible(),
                Duration::from_secs(30),
            )
            .await
            .unwrap();
        assert_eq!(response.text, "ok");
    }

    #[tokio::test]
    async fn test_service_error_is_passed_through() {
        let (_server, provider) = setup_mock_server(
            "/api/chat",
            ResponseTemplate::new(404).set_body_json(json!({"error": "model 'mistral' not found"})),
        )
        .await;

        let err = provider
            .complete("mistral", "hi", &GenerationOptions::default(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "model 'mistral' not found");
    }

    #[tokio::test]
    async fn test_timeout() {
        let (_server, provider) = setup_mock_server(
            "/api/chat",
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": {"content": "late"}}))
                .set_delay(Duration::from_secs(3)),
        )
        .await;

        let err = provider
            .complete("llama3", "hi", &GenerationOptions::default(), Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Nothing listens on port 9 on a test host
        let provider = OllamaProvider::new("127.0.0.1:9").unwrap();
        let err = provider.list_models().await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_list_models_and_prefix_availability() {
        let (_server, provider) =
            setup_mock_server("/api/tags", ResponseTemplate::new(200).set_body_json(tags_body())).await;

        let models = provider.list_models().await.unwrap();
        assert_eq!(models, vec!["falcon:7b-instruct", "llama3:latest"]);

        assert!(provider.is_available("llama3").await.unwrap());
        assert!(provider.is_available("falcon:7b").await.unwrap());
        assert!(!provider.is_available("mistral").await.unwrap());
        assert!(!provider.is_available("llama3:70b").await.unwrap());
    }
}
