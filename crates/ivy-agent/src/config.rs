/// Configuration for one agent invocation.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Upper bound on model-call rounds before the loop gives up.
    pub max_rounds: usize,
    /// System prompt inserted at the head of the session if none is present.
    pub system_prompt: Option<String>,
    /// History budget handed to the trimmer before every model call,
    /// counted in messages.
    pub max_history_messages: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            system_prompt: None,
            max_history_messages: 16_000,
        }
    }
}
