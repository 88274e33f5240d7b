//! History trimming applied before every model call.
//!
//! The budget is a message *count*, not a true token measure. The window is
//! the longest suffix that fits the budget, advanced so it starts on a user
//! message; a leading system message is always retained on top of the
//! window, even when that lands one over the budget. Messages are kept or
//! dropped whole. The stored session history is never mutated — trimming
//! only shapes what the model sees.

use crate::agent::types::{Message, Role};

pub fn trim_messages(messages: &[Message], max_messages: usize) -> Vec<Message> {
    let (system, rest) = match messages.first() {
        Some(first) if first.role == Role::System => (Some(first), &messages[1..]),
        _ => (None, messages),
    };

    let window_start = rest.len().saturating_sub(max_messages);
    let window = align_to_user_start(&rest[window_start..]);

    let mut trimmed = Vec::with_capacity(window.len() + 1);
    if let Some(system) = system {
        trimmed.push(system.clone());
    }
    trimmed.extend(window.iter().cloned());
    trimmed
}

/// Drop leading messages until the window opens on a user message. A window
/// that starts mid-exchange (on an assistant or tool message) would show the
/// model answers without their questions.
fn align_to_user_start(window: &[Message]) -> &[Message] {
    match window.iter().position(|message| message.role == Role::User) {
        Some(start) => &window[start..],
        None => &[],
    }
}
