use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use log::{debug, error};

use crate::errors::ProviderError;
use crate::providers::{map_status_error, map_transport_error, translation_system_prompt, TextTranslator};

/// Ollama client for interacting with Ollama API
#[derive(Debug, Clone)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model used for translation
    model: String,
    /// HTTP client for making requests
    client: Client,
    /// Client-side timeout, reported on timeouts
    timeout_ms: u64,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant, or tool)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    /// How long to keep the model loaded in memory
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
}

/// Chat response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model name
    pub model: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl ChatRequest {
    /// Create a new non-streaming chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            stream: Some(false),
            keep_alive: None,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        match &mut self.options {
            Some(options) => options.temperature = Some(temperature),
            None => {
                self.options = Some(GenerationOptions {
                    temperature: Some(temperature),
                    num_predict: None,
                })
            }
        }
        self
    }

    /// Set the keep-alive duration
    pub fn keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }
}

/// Parse a chat response body.
///
/// Ollama answers with a single JSON object when streaming is off, but some
/// versions still send JSONL chunks; in that case the message pieces are
/// concatenated in order.
pub fn parse_chat_response(body: &str) -> Result<ChatResponse, ProviderError> {
    if let Ok(response) = serde_json::from_str::<ChatResponse>(body) {
        return Ok(response);
    }

    let chunks: Vec<serde_json::Value> = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .collect();

    if chunks.is_empty() {
        let excerpt: String = body.chars().take(500).collect();
        error!("Failed to parse Ollama API chat response. Raw response (first 500 chars): {}", excerpt);
        return Err(ProviderError::ParseError(
            "Ollama API chat response contains invalid JSON".to_string(),
        ));
    }

    let content: String = chunks
        .iter()
        .filter_map(|obj| obj.get("message")?.get("content")?.as_str())
        .collect();

    let last = &chunks[chunks.len() - 1];
    Ok(ChatResponse {
        model: last.get("model").and_then(|v| v.as_str()).unwrap_or("unknown").to_string(),
        created_at: last.get("created_at").and_then(|v| v.as_str()).unwrap_or("").to_string(),
        message: ChatMessage::new("assistant", content),
        done: true,
        prompt_eval_count: last.get("prompt_eval_count").and_then(|v| v.as_u64()),
        eval_count: last.get("eval_count").and_then(|v| v.as_u64()),
    })
}

impl Ollama {
    /// Create a new Ollama client for a base URL such as `http://localhost:11434`
    ///
    /// Ollama uses HTTP/1.1, so the client is pinned to it and keeps
    /// connections alive for parallel requests.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base_url = if base_url.starts_with("http://") || base_url.starts_with("https://") {
            base_url
        } else {
            format!("http://{}", base_url)
        };

        Self {
            base_url,
            model: model.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .pool_max_idle_per_host(20)
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            timeout_ms: timeout_secs * 1000,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat with the Ollama API
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(map_status_error(status, error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to read Ollama response: {}", e)))?;

        parse_chat_response(&body)
    }
}

#[async_trait]
impl TextTranslator for Ollama {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest::new(
            self.model.clone(),
            vec![
                ChatMessage::new("system", translation_system_prompt(source_language, target_language)),
                ChatMessage::new("user", text),
            ],
        )
        .temperature(0.3);

        let response = self.chat(&request).await?;
        debug!(
            "Ollama translated {} chars (prompt tokens: {:?}, eval tokens: {:?})",
            text.len(),
            response.prompt_eval_count,
            response.eval_count
        );
        Ok(response.message.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_withoutScheme_shouldAddHttp() {
        let client = Ollama::new("localhost:11434/", "llama3.2:3b", 30);
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_chatRequest_shouldSerializeWithoutStreaming() {
        let request = ChatRequest::new("m", vec![ChatMessage::new("user", "hi")]).temperature(0.3);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["content"], "hi");
        assert!(json.get("keep_alive").is_none());
    }

    #[test]
    fn test_parseChatResponse_withSingleObject_shouldParse() {
        let body = r#"{"model":"m","created_at":"t","message":{"role":"assistant","content":"Olá"},"done":true}"#;
        let response = parse_chat_response(body).unwrap();
        assert_eq!(response.message.content, "Olá");
    }

    #[test]
    fn test_parseChatResponse_withJsonLines_shouldConcatenateChunks() {
        let body = concat!(
            r#"{"model":"m","message":{"role":"assistant","content":"Bon"},"done":false}"#,
            "\n",
            r#"{"model":"m","message":{"role":"assistant","content":"jour"},"done":true,"eval_count":3}"#,
        );
        let response = parse_chat_response(body).unwrap();
        assert_eq!(response.message.content, "Bonjour");
        assert_eq!(response.eval_count, Some(3));
    }

    #[test]
    fn test_parseChatResponse_withGarbage_shouldFail() {
        assert!(matches!(parse_chat_response("not json"), Err(ProviderError::ParseError(_))));
    }
}
