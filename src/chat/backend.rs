//! Real AI endpoint client.
//!
//! # Responsibilities
//! - Send the full transcript to the chat endpoint
//! - Map non-success statuses and transport failures to `ChatError`
//!
//! The request carries `{ "messages": [{ "role", "content" }] }`; the
//! response must carry the answer in `text` (`content` and `response` are
//! accepted as aliases).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::chat::types::{ChatError, Message, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

/// Payload for one completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
}

impl ChatRequest {
    pub fn from_transcript(transcript: &[Message]) -> Self {
        Self {
            messages: transcript
                .iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: m.content.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    #[serde(alias = "content", alias = "response")]
    text: String,
}

/// Something that can answer a chat transcript.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError>;
}

/// JSON-over-HTTP chat endpoint.
#[derive(Clone)]
pub struct HttpChatBackend {
    client: reqwest::Client,
    url: Url,
}

impl HttpChatBackend {
    pub fn new(url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %self.url, status = %status, "Chat endpoint rejected request");
            return Err(ChatError::Status {
                status: status.as_u16(),
            });
        }

        let body: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;
        Ok(body.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_full_transcript() {
        let transcript = vec![
            Message::new(1, Role::User, "low stock?"),
            Message::new(2, Role::Assistant, "Wireless Mouse"),
            Message::new(3, Role::User, "restock plan"),
        ];
        let json = serde_json::to_value(ChatRequest::from_transcript(&transcript)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "messages": [
                    { "role": "user", "content": "low stock?" },
                    { "role": "assistant", "content": "Wireless Mouse" },
                    { "role": "user", "content": "restock plan" },
                ]
            })
        );
    }

    #[test]
    fn test_response_aliases() {
        for body in [
            r#"{"text":"a"}"#,
            r#"{"content":"a"}"#,
            r#"{"response":"a"}"#,
        ] {
            let parsed: ChatResponseBody = serde_json::from_str(body).unwrap();
            assert_eq!(parsed.text, "a");
        }
    }
}
