use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;

use ivy_core::tools::{FunctionCall, ToolCall, ToolSchema};
use ivy_core::Message;

use crate::provider::{LLMError, LLMProvider, LLMStream, Result};
use crate::types::LLMChunk;

/// OpenAI-compatible chat completions over SSE (`stream: true`).
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_request_body(&self, messages: &[Message], tools: &[ToolSchema]) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": true,
        });
        if !tools.is_empty() {
            body["tools"] = serde_json::json!(tools);
        }
        body
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn chat_stream(&self, messages: &[Message], tools: &[ToolSchema]) -> Result<LLMStream> {
        let body = self.build_request_body(messages, tools);

        log::debug!(
            "Requesting completion: model={}, {} messages, {} tools",
            self.model,
            messages.len(),
            tools.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(LLMError::Api(format!("HTTP {status}: {text}")));
        }

        let stream = response
            .bytes_stream()
            .eventsource()
            .map(|event| {
                let event = event.map_err(|e| LLMError::Stream(e.to_string()))?;

                if event.data == "[DONE]" {
                    return Ok(LLMChunk::Done);
                }

                let chunk: StreamChunk =
                    serde_json::from_str(&event.data).map_err(LLMError::Json)?;
                Ok(parse_chunk(chunk))
            })
            .filter_map(|result| async move {
                match result {
                    Ok(LLMChunk::Done) => None,
                    other => Some(other),
                }
            });

        Ok(Box::pin(stream))
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    id: Option<String>,
    #[serde(rename = "type")]
    tool_type: Option<String>,
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    name: Option<String>,
    arguments: Option<String>,
}

fn parse_chunk(chunk: StreamChunk) -> LLMChunk {
    let Some(choice) = chunk.choices.into_iter().next() else {
        return LLMChunk::Token(String::new());
    };

    if let Some(tool_calls) = choice.delta.tool_calls {
        let deltas = tool_calls
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id.unwrap_or_default(),
                tool_type: tc.tool_type.unwrap_or_default(),
                function: FunctionCall {
                    name: tc
                        .function
                        .as_ref()
                        .and_then(|f| f.name.clone())
                        .unwrap_or_default(),
                    arguments: tc
                        .function
                        .and_then(|f| f.arguments)
                        .unwrap_or_default(),
                },
            })
            .collect();
        LLMChunk::ToolCalls(deltas)
    } else {
        LLMChunk::Token(choice.delta.content.unwrap_or_default())
    }
}
