//! LLM chat-completions client with tool-call support
//!
//! Speaks the OpenAI-compatible wire format against any of the configured
//! providers. Authentication and quota failures map to
//! [`FlipError::LlmUnavailable`] so callers can degrade to the local
//! fallback instead of surfacing an error to the user.

use reqwest::Client;
use serde_json::Value;

use crate::config::LlmConfig;
use crate::error::{FlipError, Result};

/// One assistant turn: either final text or a batch of tool invocations.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// Final answer text, when the model produced one.
    pub content: Option<String>,
    /// Requested tool invocations, possibly empty.
    pub tool_calls: Vec<ToolCall>,
    /// The raw assistant message, appended verbatim to the transcript when
    /// the loop continues.
    pub message: Value,
}

#[derive(Debug, Clone)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

pub struct LlmClient {
    http: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> (String, String) {
        match self.config.provider.to_lowercase().as_str() {
            "deepseek" => (
                "https://api.deepseek.com".to_string(),
                self.config
                    .model
                    .clone()
                    .unwrap_or_else(|| "deepseek-chat".to_string()),
            ),
            "openai" | "gpt" => (
                self.config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.openai.com".to_string()),
                self.config
                    .model
                    .clone()
                    .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            ),
            "ollama" => (
                self.config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string()),
                self.config
                    .model
                    .clone()
                    .unwrap_or_else(|| "qwen2.5:14b".to_string()),
            ),
            _ => (
                self.config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.deepseek.com".to_string()),
                self.config
                    .model
                    .clone()
                    .unwrap_or_else(|| "deepseek-chat".to_string()),
            ),
        }
    }

    /// One chat-completions round trip. `tools` may be empty.
    pub async fn chat(&self, messages: &[Value], tools: &[Value]) -> Result<ChatTurn> {
        let (base_url, model) = self.endpoint();

        let mut request = serde_json::json!({
            "model": model,
            "messages": messages,
        });
        if !tools.is_empty() {
            request["tools"] = Value::from(tools.to_vec());
            request["tool_choice"] = Value::from("auto");
        }

        let mut req = self
            .http
            .post(format!("{}/v1/chat/completions", base_url))
            .header("content-type", "application/json");

        if !self.config.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.config.api_key));
        }

        let resp = req.json(&request).send().await?;
        let status = resp.status();
        match status.as_u16() {
            401 | 403 => {
                return Err(FlipError::LlmUnavailable(format!(
                    "authentication rejected ({status})"
                )))
            }
            402 | 429 => {
                return Err(FlipError::LlmUnavailable(format!(
                    "quota exhausted ({status})"
                )))
            }
            _ if !status.is_success() => {
                return Err(FlipError::Api(format!("LLM backend returned {status}")))
            }
            _ => {}
        }

        let body: Value = resp.json().await?;
        let message = body["choices"][0]["message"].clone();
        if message.is_null() {
            return Err(FlipError::Api("empty LLM response".into()));
        }

        let content = message["content"].as_str().map(|s| s.to_string());
        let tool_calls = message["tool_calls"]
            .as_array()
            .map(|calls| calls.iter().filter_map(parse_tool_call).collect())
            .unwrap_or_default();

        Ok(ChatTurn {
            content,
            tool_calls,
            message,
        })
    }
}

fn parse_tool_call(call: &Value) -> Option<ToolCall> {
    let id = call["id"].as_str()?.to_string();
    let name = call["function"]["name"].as_str()?.to_string();
    let arguments = call["function"]["arguments"]
        .as_str()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_else(|| serde_json::json!({}));
    Some(ToolCall {
        id,
        name,
        arguments,
    })
}
