use ivy_core::tools::ToolCall;

/// One increment of a streamed model response.
#[derive(Debug, Clone)]
pub enum LLMChunk {
    Token(String),
    ToolCalls(Vec<ToolCall>),
    Done,
}
