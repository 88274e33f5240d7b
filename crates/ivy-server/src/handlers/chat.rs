use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use ivy_agent::run_agent;
use ivy_core::{AgentEvent, Session};

use crate::sse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub thread_id: Option<String>,
}

/// `POST /chat` — run one agent turn and stream it back as SSE.
///
/// The agent loop runs on its own task feeding an event channel; this
/// handler's stream translates each event to at most one frame, in order,
/// buffering nothing beyond the channel. When the client disconnects the
/// response stream is dropped, the receiver closes, and the loop stops.
pub async fn handler(state: web::Data<AppState>, req: web::Json<ChatRequest>) -> impl Responder {
    let thread_id = req
        .thread_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    log::info!("[{}] chat request", thread_id);

    let mut session = match state.memory.load_session(&thread_id).await {
        Ok(Some(session)) => session,
        Ok(None) => Session::new(thread_id.clone()),
        Err(e) => {
            log::error!("[{}] failed to load session: {}", thread_id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to load session: {e}")
            }));
        }
    };

    let (event_tx, mut event_rx) = mpsc::channel::<AgentEvent>(100);

    let message = req.message.clone();
    let state = state.into_inner();
    tokio::spawn(async move {
        // Held until the session is saved so the response body does not
        // reach EOF before the write-back lands.
        let save_guard = event_tx.clone();

        let result = run_agent(
            &mut session,
            message,
            event_tx,
            state.llm.clone(),
            state.tools.clone(),
            CancellationToken::new(),
            state.agent_config.clone(),
        )
        .await;

        if let Err(e) = &result {
            log::warn!("[{}] agent loop ended early: {}", session.id, e);
        }

        // Whatever the turn produced is persisted, even on early exit.
        if let Err(e) = state.memory.save_session(&session).await {
            log::error!("[{}] failed to save session: {}", session.id, e);
        }
        drop(save_guard);
    });

    HttpResponse::Ok()
        .append_header((header::CONTENT_TYPE, "text/event-stream"))
        .append_header((header::CACHE_CONTROL, "no-cache"))
        .append_header((header::CONNECTION, "keep-alive"))
        .streaming(async_stream::stream! {
            while let Some(event) = event_rx.recv().await {
                if let Some(frame) = sse::encode_event(&event) {
                    yield Ok::<_, actix_web::Error>(frame);
                }
            }
        })
}
