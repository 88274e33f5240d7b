pub mod agent;
pub mod storage;
pub mod tools;
pub mod trim;

pub use agent::error::AgentError;
pub use agent::events::{AgentEvent, TokenUsage};
pub use agent::types::{Message, Role, Session};
pub use storage::{JsonlStorage, MemorySaver, MemoryStore};
pub use tools::{
    FunctionCall, FunctionSchema, RegistryExecutor, Tool, ToolCall, ToolCallAccumulator,
    ToolError, ToolExecutor, ToolRegistry, ToolResult, ToolSchema,
};
pub use trim::trim_messages;
