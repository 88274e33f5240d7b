//! Event-to-SSE translation.
//!
//! Exactly three agent event kinds reach the wire; each recognized event
//! becomes one `data: <json>\n\n` frame, in emission order. Everything else
//! is dropped without a frame, and no end-of-stream sentinel is sent.

use actix_web::web::Bytes;
use serde::Serialize;

use ivy_core::AgentEvent;

/// Wire shape of one frame's JSON payload.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseFrame {
    Token { content: String },
    ToolStart { tool: String, input: String },
    ToolEnd { tool: String, output: String },
}

/// Translate one agent event. `None` means no frame: unrecognized kinds and
/// empty token chunks are suppressed.
pub fn frame_for(event: &AgentEvent) -> Option<SseFrame> {
    match event {
        AgentEvent::Token { content } => {
            if content.is_empty() {
                None
            } else {
                Some(SseFrame::Token {
                    content: content.clone(),
                })
            }
        }
        AgentEvent::ToolStart {
            tool_name, input, ..
        } => Some(SseFrame::ToolStart {
            tool: tool_name.clone(),
            input: stringify_input(input),
        }),
        AgentEvent::ToolEnd {
            tool_name, output, ..
        } => Some(SseFrame::ToolEnd {
            tool: tool_name.clone(),
            output: output.clone(),
        }),
        AgentEvent::ToolError { .. } | AgentEvent::Complete { .. } | AgentEvent::Error { .. } => {
            None
        }
    }
}

/// Encode an event as wire bytes, or `None` when it produces no frame.
pub fn encode_event(event: &AgentEvent) -> Option<Bytes> {
    let frame = frame_for(event)?;
    let json = serde_json::to_string(&frame).ok()?;
    Some(Bytes::from(format!("data: {json}\n\n")))
}

/// Tool input goes out as a string regardless of its JSON shape; bare
/// strings keep their content without added quotes.
fn stringify_input(input: &serde_json::Value) -> String {
    match input {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ivy_core::TokenUsage;

    fn encode_str(event: &AgentEvent) -> Option<String> {
        encode_event(event).map(|b| String::from_utf8(b.to_vec()).unwrap())
    }

    fn tool_start(input: serde_json::Value) -> AgentEvent {
        AgentEvent::ToolStart {
            tool_call_id: "call_1".to_string(),
            tool_name: "get_user_age".to_string(),
            input,
        }
    }

    fn tool_end(output: &str) -> AgentEvent {
        AgentEvent::ToolEnd {
            tool_call_id: "call_1".to_string(),
            tool_name: "get_user_age".to_string(),
            output: output.to_string(),
        }
    }

    #[test]
    fn token_frame_wire_format() {
        let frame = encode_str(&AgentEvent::Token {
            content: "hi".to_string(),
        })
        .unwrap();
        assert_eq!(frame, "data: {\"type\":\"token\",\"content\":\"hi\"}\n\n");
    }

    #[test]
    fn empty_token_is_suppressed() {
        assert!(encode_event(&AgentEvent::Token {
            content: String::new()
        })
        .is_none());
    }

    #[test]
    fn tool_start_frame_wire_format() {
        let frame = encode_str(&tool_start(serde_json::json!({"name": "bob"}))).unwrap();
        assert_eq!(
            frame,
            "data: {\"type\":\"tool_start\",\"tool\":\"get_user_age\",\"input\":\"{\\\"name\\\":\\\"bob\\\"}\"}\n\n"
        );
    }

    #[test]
    fn tool_end_frame_wire_format() {
        let frame = encode_str(&tool_end("42 years old")).unwrap();
        assert_eq!(
            frame,
            "data: {\"type\":\"tool_end\",\"tool\":\"get_user_age\",\"output\":\"42 years old\"}\n\n"
        );
    }

    #[test]
    fn string_input_is_not_double_quoted() {
        let frame = frame_for(&tool_start(serde_json::Value::String("bob".to_string()))).unwrap();
        assert_eq!(
            frame,
            SseFrame::ToolStart {
                tool: "get_user_age".to_string(),
                input: "bob".to_string(),
            }
        );
    }

    #[test]
    fn unrecognized_kinds_produce_no_frame() {
        assert!(encode_event(&AgentEvent::Complete {
            usage: TokenUsage::default()
        })
        .is_none());
        assert!(encode_event(&AgentEvent::Error {
            message: "boom".to_string()
        })
        .is_none());
        assert!(encode_event(&AgentEvent::ToolError {
            tool_call_id: "call_1".to_string(),
            tool_name: "t".to_string(),
            error: "boom".to_string()
        })
        .is_none());
    }

    #[test]
    fn synthetic_stream_yields_three_frames_in_order() {
        let events = vec![
            AgentEvent::Token {
                content: "hi".to_string(),
            },
            AgentEvent::Token {
                content: String::new(),
            },
            tool_start(serde_json::json!({"name": "bob"})),
            tool_end("42 years old"),
        ];

        let frames: Vec<String> = events.iter().filter_map(encode_str).collect();
        assert_eq!(frames.len(), 3);
        assert!(frames[0].contains("\"type\":\"token\""));
        assert!(frames[1].contains("\"type\":\"tool_start\""));
        assert!(frames[2].contains("\"type\":\"tool_end\""));
    }
}
