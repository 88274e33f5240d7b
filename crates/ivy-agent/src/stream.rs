use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use ivy_core::tools::{ToolCall, ToolCallAccumulator};
use ivy_core::{AgentError, AgentEvent};
use ivy_llm::{LLMChunk, LLMStream};

pub struct StreamOutput {
    pub content: String,
    pub token_count: usize,
    pub tool_calls: Vec<ToolCall>,
}

/// Drain one model response: forward token chunks as events, collect
/// tool-call deltas. A closed event channel means the consumer is gone and
/// is treated as cancellation.
pub async fn consume_llm_stream(
    mut stream: LLMStream,
    event_tx: &mpsc::Sender<AgentEvent>,
    cancel_token: &CancellationToken,
    thread_id: &str,
) -> Result<StreamOutput, AgentError> {
    let mut content = String::new();
    let mut token_count = 0usize;
    let mut tool_calls = ToolCallAccumulator::new();

    while let Some(chunk_result) = stream.next().await {
        if cancel_token.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        match chunk_result {
            Ok(LLMChunk::Token(token)) => {
                token_count += 1;
                content.push_str(&token);

                if event_tx
                    .send(AgentEvent::Token { content: token })
                    .await
                    .is_err()
                {
                    return Err(AgentError::Cancelled);
                }
            }
            Ok(LLMChunk::ToolCalls(deltas)) => {
                log::debug!("[{}] {} tool call delta(s)", thread_id, deltas.len());
                tool_calls.extend(deltas);
            }
            Ok(LLMChunk::Done) => {
                log::debug!("[{}] model stream completed", thread_id);
            }
            Err(error) => {
                let _ = event_tx
                    .send(AgentEvent::Error {
                        message: error.to_string(),
                    })
                    .await;
                return Err(AgentError::Llm(error.to_string()));
            }
        }
    }

    Ok(StreamOutput {
        content,
        token_count,
        tool_calls: tool_calls.finalize(),
    })
}
