//! Language model seam.
//!
//! The model is a black box turning a prompt into raw text. Everything the
//! pipeline needs from it goes through [`LlmClient`].

use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// Prompt sent to a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmRequest {
    /// Instructions describing the expected output.
    pub system: String,
    /// The caller's instruction.
    pub user: String,
}

/// LLM error.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Response error: {0}")]
    Response(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Trait for language model backends.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a prompt, returning the raw model text.
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError>;
}

#[async_trait]
impl<T> LlmClient for Arc<T>
where
    T: LlmClient + ?Sized,
{
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError> {
        (**self).complete(request).await
    }
}

/// Client replaying canned responses in order.
///
/// Useful for tests and offline demos.
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlmClient {
    /// Create a client that returns `responses` one per call.
    #[must_use]
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError> {
        self.requests.lock().await.push(request);
        self.responses
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| LlmError::Response("No scripted response left".to_string()))
    }
}

#[cfg(feature = "ollama")]
pub use ollama::{OllamaClient, OllamaConfig};

#[cfg(feature = "ollama")]
mod ollama {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};

    use super::{LlmClient, LlmError, LlmRequest};

    /// Ollama connection settings.
    #[derive(Debug, Clone)]
    pub struct OllamaConfig {
        /// Server base URL, e.g. `http://localhost:11434`.
        pub base_url: String,
        /// Model name.
        pub model: String,
        /// Request timeout.
        pub timeout_secs: u64,
    }

    impl Default for OllamaConfig {
        fn default() -> Self {
            Self {
                base_url: "http://localhost:11434".to_string(),
                model: "llama3".to_string(),
                timeout_secs: 120,
            }
        }
    }

    /// Client for Ollama's `/api/chat` endpoint.
    pub struct OllamaClient {
        client: reqwest::Client,
        config: OllamaConfig,
    }

    impl OllamaClient {
        /// Create a new client.
        ///
        /// # Errors
        /// Returns error if the HTTP client cannot be built.
        pub fn new(config: OllamaConfig) -> Result<Self, LlmError> {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|e| LlmError::Http(e.to_string()))?;
            Ok(Self { client, config })
        }
    }

    #[derive(Debug, Serialize)]
    struct ChatMessage {
        role: &'static str,
        content: String,
    }

    #[derive(Debug, Serialize)]
    struct ChatRequest<'a> {
        model: &'a str,
        messages: Vec<ChatMessage>,
        stream: bool,
    }

    #[derive(Debug, Deserialize)]
    struct ChatResponse {
        message: ChatResponseMessage,
    }

    #[derive(Debug, Deserialize)]
    struct ChatResponseMessage {
        #[serde(default)]
        content: String,
    }

    #[async_trait]
    impl LlmClient for OllamaClient {
        async fn complete(&self, request: LlmRequest) -> Result<String, LlmError> {
            let url = format!("{}/api/chat", self.config.base_url.trim_end_matches('/'));
            let body = ChatRequest {
                model: &self.config.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: request.system,
                    },
                    ChatMessage {
                        role: "user",
                        content: request.user,
                    },
                ],
                stream: false,
            };

            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| LlmError::Http(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                return Err(LlmError::Response(format!("HTTP {status}: {text}")));
            }

            let text = response
                .text()
                .await
                .map_err(|e| LlmError::Http(e.to_string()))?;
            let parsed: ChatResponse =
                serde_json::from_str(&text).map_err(|e| LlmError::Serialization(e.to_string()))?;

            Ok(parsed.message.content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: &str) -> LlmRequest {
        LlmRequest {
            system: "sys".to_string(),
            user: user.to_string(),
        }
    }

    #[tokio::test]
    async fn test_scripted_client_replays_in_order() {
        let client = ScriptedLlmClient::new(["one", "two"]);
        assert_eq!(client.complete(request("a")).await.unwrap(), "one");
        assert_eq!(client.complete(request("b")).await.unwrap(), "two");
        assert!(matches!(
            client.complete(request("c")).await,
            Err(LlmError::Response(_))
        ));

        let users: Vec<_> = client.requests().await.into_iter().map(|r| r.user).collect();
        assert_eq!(users, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_shared_client_delegates() {
        let client: Arc<dyn LlmClient> = Arc::new(ScriptedLlmClient::new(["hi"]));
        assert_eq!(client.complete(request("x")).await.unwrap(), "hi");
    }
}
