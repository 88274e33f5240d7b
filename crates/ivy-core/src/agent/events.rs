use serde::{Deserialize, Serialize};

/// Everything the agent loop can report while it runs.
///
/// The enum is closed on purpose: the SSE adapter matches on it and only a
/// subset of kinds reach the wire. Anything it does not translate is dropped
/// there, never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    Token {
        content: String,
    },

    ToolStart {
        tool_call_id: String,
        tool_name: String,
        input: serde_json::Value,
    },

    ToolEnd {
        tool_call_id: String,
        tool_name: String,
        output: String,
    },

    ToolError {
        tool_call_id: String,
        tool_name: String,
        error: String,
    },

    Complete {
        usage: TokenUsage,
    },

    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
