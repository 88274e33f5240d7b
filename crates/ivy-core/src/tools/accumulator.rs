use uuid::Uuid;

use crate::tools::types::{FunctionCall, ToolCall};

/// Reassembles tool calls from streamed deltas.
///
/// OpenAI-style streams split one tool call across many chunks: the first
/// fragment carries the id and name, later fragments carry only argument
/// text. Fragments with an id open a new call; id-less fragments append to
/// the most recent one.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: Vec<ToolCall>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delta: ToolCall) {
        if delta.id.is_empty() && delta.function.name.is_empty() {
            if delta.function.arguments.is_empty() {
                return;
            }
            if let Some(last) = self.calls.last_mut() {
                last.function.arguments.push_str(&delta.function.arguments);
                return;
            }
        }

        if !delta.id.is_empty() {
            if let Some(existing) = self.calls.iter_mut().find(|call| call.id == delta.id) {
                existing
                    .function
                    .arguments
                    .push_str(&delta.function.arguments);
                if !delta.function.name.is_empty() {
                    existing.function.name = delta.function.name;
                }
                return;
            }
        }

        self.calls.push(delta);
    }

    pub fn extend<I>(&mut self, deltas: I)
    where
        I: IntoIterator<Item = ToolCall>,
    {
        for delta in deltas {
            self.push(delta);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Completed calls. Fragments that never received a name are discarded;
    /// calls that never received an id get a generated one.
    pub fn finalize(self) -> Vec<ToolCall> {
        self.calls
            .into_iter()
            .filter(|call| !call.function.name.trim().is_empty())
            .map(|mut call| {
                if call.id.is_empty() {
                    call.id = format!("call_{}", Uuid::new_v4());
                }
                if call.tool_type.is_empty() {
                    call.tool_type = "function".to_string();
                }
                call
            })
            .collect()
    }
}
