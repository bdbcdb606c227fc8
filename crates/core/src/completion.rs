//! Client for the external chat-completion service.
//!
//! The orchestrator needs exactly one operation from the language model:
//! given the full turn history, produce the next assistant reply.
//! [`CompletionService`] is that seam. [`OpenRouterClient`] is the
//! production implementation, speaking the OpenAI-compatible
//! `chat/completions` wire format with bearer-token authorization.

use crate::conversation::Turn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Public endpoint used when a deployment does not override it.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Model identifier used when a deployment does not override it.
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat";

/// Upper bound on a single completion request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a completion request produced no reply.
///
/// Every variant is non-fatal to the call: the orchestrator substitutes a
/// fixed fallback line and the session continues.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request timed out after {0:?}")]
    Timeout(Duration),
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed completion response: {0}")]
    Malformed(String),
}

/// External language-model endpoint returning a generated reply for a turn
/// history.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Requests the next assistant reply for the given history.
    ///
    /// The history is sent in order; its first element is the system
    /// instruction. On success the reply text is returned with surrounding
    /// whitespace trimmed. No retries are attempted on failure.
    async fn complete(&self, history: &[Turn]) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// [`CompletionService`] implementation for any OpenAI-compatible
/// `chat/completions` endpoint, OpenRouter by default.
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OpenRouterClient {
    /// Creates a client for the default OpenRouter endpoint.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Points the client at a different OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Bounds each completion request. A request that exceeds the bound
    /// fails with [`CompletionError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn classify(&self, err: reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout(self.timeout)
        } else {
            CompletionError::Transport(err)
        }
    }
}

#[async_trait]
impl CompletionService for OpenRouterClient {
    async fn complete(&self, history: &[Turn]) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: history,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Status(status));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| CompletionError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| CompletionError::Malformed("response contained no choices".to_string()))
    }
}

/// A scripted [`CompletionService`] for development and tests.
///
/// Queued replies (or errors) are handed out in order; a call with nothing
/// queued answers `"Hello."`. Every history snapshot the service was called
/// with is recorded for inspection.
#[derive(Default)]
pub struct MockCompletionService {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: Mutex<Vec<Vec<Turn>>>,
}

fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockCompletionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next call to succeed with the given reply.
    pub fn push_reply(&self, text: impl Into<String>) {
        relock(&self.replies).push_back(Ok(text.into()));
    }

    /// Queues the next call to fail.
    pub fn push_error(&self, err: CompletionError) {
        relock(&self.replies).push_back(Err(err));
    }

    /// Histories the service has been called with, oldest first.
    pub fn calls(&self) -> Vec<Vec<Turn>> {
        relock(&self.calls).clone()
    }

    /// How many completion requests were made.
    pub fn call_count(&self) -> usize {
        relock(&self.calls).len()
    }
}

#[async_trait]
impl CompletionService for MockCompletionService {
    async fn complete(&self, history: &[Turn]) -> Result<String, CompletionError> {
        relock(&self.calls).push(history.to_vec());
        relock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Ok("Hello.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{CallSession, Role};

    #[test]
    fn request_body_matches_the_wire_contract() {
        let mut session = CallSession::new("act as a professor");
        session.push_user("hello");

        let request = ChatCompletionRequest {
            model: DEFAULT_MODEL,
            messages: session.turns(),
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "deepseek/deepseek-chat");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "act as a professor");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn response_parsing_reads_the_first_choice() {
        let body = r#"{
            "id": "gen-1",
            "choices": [
                {"message": {"role": "assistant", "content": "  Hello there.  "}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let content = parsed.choices.into_iter().next().unwrap().message.content;
        assert_eq!(content.as_deref(), Some("  Hello there.  "));
    }

    #[test]
    fn error_display_is_actionable() {
        let timeout = CompletionError::Timeout(Duration::from_secs(30));
        assert_eq!(
            timeout.to_string(),
            "completion request timed out after 30s"
        );

        let status = CompletionError::Status(reqwest::StatusCode::BAD_GATEWAY);
        assert!(status.to_string().contains("502"));

        let malformed = CompletionError::Malformed("response contained no choices".into());
        assert!(malformed.to_string().starts_with("malformed"));
    }

    #[tokio::test]
    async fn mock_hands_out_replies_in_order_and_records_calls() {
        let mock = MockCompletionService::new();
        mock.push_reply("first");
        mock.push_error(CompletionError::Malformed("boom".into()));

        let history = vec![Turn::system("sys")];
        assert_eq!(mock.complete(&history).await.unwrap(), "first");
        assert!(mock.complete(&history).await.is_err());
        // Nothing queued: the default reply keeps scripted flows moving.
        assert_eq!(mock.complete(&history).await.unwrap(), "Hello.");

        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.calls()[0][0].role, Role::System);
    }
}
