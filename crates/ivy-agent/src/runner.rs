use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use ivy_core::tools::{parse_tool_args, ToolExecutor};
use ivy_core::{trim_messages, AgentError, AgentEvent, Message, Session, TokenUsage};
use ivy_llm::LLMProvider;

use crate::config::AgentConfig;
use crate::stream::consume_llm_stream;

pub type Result<T> = std::result::Result<T, AgentError>;

/// Run one agent turn: append the user message, then alternate model calls
/// and tool executions until the model answers without requesting tools.
///
/// Events are pushed into `event_tx` as they happen. The loop stops early if
/// the token is cancelled or the receiving side of the channel goes away.
pub async fn run_agent(
    session: &mut Session,
    message: String,
    event_tx: mpsc::Sender<AgentEvent>,
    llm: Arc<dyn LLMProvider>,
    tools: Arc<dyn ToolExecutor>,
    cancel_token: CancellationToken,
    config: AgentConfig,
) -> Result<()> {
    let thread_id = session.id.clone();
    log::debug!("[{}] agent turn started: {}", thread_id, message);

    if let Some(prompt) = config.system_prompt.as_deref() {
        let has_system = session
            .messages
            .iter()
            .any(|m| m.role == ivy_core::Role::System);
        if !has_system {
            session.messages.insert(0, Message::system(prompt));
        }
    }

    session.add_message(Message::user(message));

    let mut completion_tokens = 0usize;

    for round in 0..config.max_rounds {
        if cancel_token.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        let context = trim_messages(&session.messages, config.max_history_messages);
        let schemas = tools.list_tools();

        log::debug!(
            "[{}] round {}: {} of {} messages in context",
            thread_id,
            round + 1,
            context.len(),
            session.messages.len()
        );

        let stream = match llm.chat_stream(&context, &schemas).await {
            Ok(stream) => stream,
            Err(error) => {
                let _ = event_tx
                    .send(AgentEvent::Error {
                        message: error.to_string(),
                    })
                    .await;
                return Err(AgentError::Llm(error.to_string()));
            }
        };

        let output = consume_llm_stream(stream, &event_tx, &cancel_token, &thread_id).await?;
        completion_tokens += output.token_count;

        if output.tool_calls.is_empty() {
            session.add_message(Message::assistant(output.content, None));
            send(
                &event_tx,
                AgentEvent::Complete {
                    usage: TokenUsage {
                        prompt_tokens: 0,
                        completion_tokens: completion_tokens as u32,
                        total_tokens: completion_tokens as u32,
                    },
                },
            )
            .await?;
            log::debug!("[{}] agent turn complete", thread_id);
            return Ok(());
        }

        session.add_message(Message::assistant(
            output.content,
            Some(output.tool_calls.clone()),
        ));

        for tool_call in &output.tool_calls {
            let name = tool_call.function.name.clone();
            let input = parse_tool_args(&tool_call.function.arguments)
                .unwrap_or_else(|_| serde_json::Value::String(tool_call.function.arguments.clone()));

            send(
                &event_tx,
                AgentEvent::ToolStart {
                    tool_call_id: tool_call.id.clone(),
                    tool_name: name.clone(),
                    input,
                },
            )
            .await?;

            match tools.execute(tool_call).await {
                Ok(result) => {
                    log::debug!(
                        "[{}] tool {} finished (success={})",
                        thread_id,
                        name,
                        result.success
                    );
                    session.add_message(Message::tool_result(
                        tool_call.id.clone(),
                        result.output.clone(),
                    ));
                    send(
                        &event_tx,
                        AgentEvent::ToolEnd {
                            tool_call_id: tool_call.id.clone(),
                            tool_name: name,
                            output: result.output,
                        },
                    )
                    .await?;
                }
                Err(error) => {
                    log::warn!("[{}] tool {} failed: {}", thread_id, name, error);
                    session.add_message(Message::tool_result(
                        tool_call.id.clone(),
                        format!("Error: {error}"),
                    ));
                    send(
                        &event_tx,
                        AgentEvent::ToolError {
                            tool_call_id: tool_call.id.clone(),
                            tool_name: name,
                            error: error.to_string(),
                        },
                    )
                    .await?;
                }
            }
        }
    }

    log::warn!(
        "[{}] gave up after {} rounds with tool calls still pending",
        thread_id,
        config.max_rounds
    );
    send(
        &event_tx,
        AgentEvent::Complete {
            usage: TokenUsage {
                prompt_tokens: 0,
                completion_tokens: completion_tokens as u32,
                total_tokens: completion_tokens as u32,
            },
        },
    )
    .await
}

async fn send(event_tx: &mpsc::Sender<AgentEvent>, event: AgentEvent) -> Result<()> {
    event_tx
        .send(event)
        .await
        .map_err(|_| AgentError::Cancelled)
}
