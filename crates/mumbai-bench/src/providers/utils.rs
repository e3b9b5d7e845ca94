use reqwest::{Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::providers::errors::ProviderError;

// Maps a non-ok response to a ProviderError, keeping the service's own
// error message when the body carries one.
pub async fn non_ok_response_to_provider_error(response: Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if let Some(message) = service_error_message(&body) {
        return ProviderError::Service(message);
    }

    match status {
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            ProviderError::Unavailable(format!("Status: {}", status))
        }
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => {
            ProviderError::RequestFailed(format!("Upstream timeout. Status: {}", status))
        }
        _ => {
            tracing::debug!("Chat request failed with status: {}. Body: {}", status, body);
            ProviderError::RequestFailed(format!("Request failed with status: {}.", status))
        }
    }
}

/// Map a transport error, reporting timeouts against the call's own limit
pub fn request_error(error: reqwest::Error, timeout: Duration) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(timeout.as_secs())
    } else {
        ProviderError::from(error)
    }
}

pub async fn handle_response(response: Response, timeout: Duration) -> Result<Value, ProviderError> {
    match response.status() {
        StatusCode::OK => {
            let value: Value = response
                .json()
                .await
                .map_err(|e| request_error(e, timeout))?;
            // Some runtimes answer 200 with an error body
            if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
                return Err(ProviderError::Service(message.to_string()));
            }
            Ok(value)
        }
        _ => Err(non_ok_response_to_provider_error(response).await),
    }
}

fn service_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.as_str())
        .map(|s| s.to_string())
}

/// Build the base URL from a host that may be just `host`, `host:port`, or a
/// full URL. The scheme defaults to http and the port to `default_port`.
pub fn resolve_base_url(host: &str, default_port: u16) -> Result<Url, ProviderError> {
    let base = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };

    let mut base_url = Url::parse(&base)
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid base URL: {e}")))?;

    // Url drops :80 and :443 for their schemes, so look at what was written
    if base_url.port().is_none() && !has_explicit_port(host) {
        base_url
            .set_port(Some(default_port))
            .map_err(|_| ProviderError::RequestFailed("Failed to set default port".to_string()))?;
    }

    // Endpoints are joined relative to the base, which needs a trailing slash
    // to keep a path prefix such as `/ollama`
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }

    Ok(base_url)
}

fn has_explicit_port(host: &str) -> bool {
    let without_scheme = host.split_once("://").map_or(host, |(_, rest)| rest);
    let authority = without_scheme.split('/').next().unwrap_or_default();
    authority
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
}

/// Extract the reply text from a chat response body
pub fn get_message_content(data: &Value) -> Result<String, ProviderError> {
    data.get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            ProviderError::RequestFailed("Response is missing message.content".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_base_url_adds_scheme_and_port() {
        let url = resolve_base_url("localhost", 11434).unwrap();
        assert_eq!(url.as_str(), "http://localhost:11434/");
    }

    #[test]
    fn test_resolve_base_url_keeps_explicit_port() {
        let url = resolve_base_url("10.0.0.5:8080", 11434).unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.5:8080/");

        let url = resolve_base_url("https://ollama.internal", 11434).unwrap();
        assert_eq!(url.as_str(), "https://ollama.internal:11434/");

        let url = resolve_base_url("http://gpu-box:80", 11434).unwrap();
        assert_eq!(url.port_or_known_default(), Some(80));

        let url = resolve_base_url("http://gpu-box:80/", 11434).unwrap();
        assert_eq!(url.port_or_known_default(), Some(80));

        let url = resolve_base_url("https://gpu-box:443/ollama", 11434).unwrap();
        assert_eq!(url.as_str(), "https://gpu-box/ollama/");
    }

    #[test]
    fn test_resolve_base_url_keeps_path_prefix() {
        let url = resolve_base_url("http://proxy/ollama", 11434).unwrap();
        assert_eq!(url.as_str(), "http://proxy:11434/ollama/");
        assert_eq!(
            url.join("api/chat").unwrap().as_str(),
            "http://proxy:11434/ollama/api/chat"
        );

        let url = resolve_base_url("proxy:8080/ollama/", 11434).unwrap();
        assert_eq!(url.join("api/tags").unwrap().as_str(), "http://proxy:8080/ollama/api/tags");
    }

    #[test]
    fn test_has_explicit_port() {
        assert!(has_explicit_port("localhost:11434"));
        assert!(has_explicit_port("http://[::1]:80/"));
        assert!(!has_explicit_port("http://[::1]/"));
        assert!(!has_explicit_port("https://ollama.internal/api"));
    }

    #[tokio::test]
    async fn test_request_error_maps_timeouts() {
        use wiremock::matchers::any;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let err = reqwest::Client::new()
            .get(mock_server.uri())
            .timeout(Duration::from_millis(50))
            .send()
            .await
            .unwrap_err();

        let mapped = request_error(err, Duration::from_secs(30));
        assert!(matches!(mapped, ProviderError::Timeout(30)));
    }

    #[test]
    fn test_get_message_content() {
        let body = json!({"message": {"role": "assistant", "content": "Vada pav."}});
        assert_eq!(get_message_content(&body).unwrap(), "Vada pav.");

        let err = get_message_content(&json!({"done": true})).unwrap_err();
        assert!(matches!(err, ProviderError::RequestFailed(_)));
    }

    #[test]
    fn test_service_error_message() {
        assert_eq!(
            service_error_message(r#"{"error":"model 'foo' not found"}"#),
            Some("model 'foo' not found".to_string())
        );
        assert_eq!(service_error_message("not json"), None);
    }
}
