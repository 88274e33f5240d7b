use std::sync::{Arc, Mutex};

use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::json;

use ivy_core::storage::{JsonlStorage, MemorySaver, MemoryStore};
use ivy_core::tools::{FunctionCall, ToolCall, ToolSchema};
use ivy_core::Message;
use ivy_llm::{LLMChunk, LLMError, LLMProvider, LLMStream};
use ivy_server::handlers::{chat, health};
use ivy_server::state::{build_tool_executor, AppState};

/// Replays one chunk script per model call; repeats the last script when the
/// loop asks more often than scripted.
struct ScriptedProvider {
    scripts: Mutex<Vec<Vec<LLMChunk>>>,
}

impl ScriptedProvider {
    fn new(scripts: Vec<Vec<LLMChunk>>) -> Self {
        Self {
            scripts: Mutex::new(scripts),
        }
    }

    fn text(text: &str) -> Self {
        Self::new(vec![vec![LLMChunk::Token(text.to_string())]])
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat_stream(
        &self,
        _messages: &[Message],
        _tools: &[ToolSchema],
    ) -> Result<LLMStream, LLMError> {
        let mut scripts = self.scripts.lock().unwrap();
        let chunks = if scripts.len() > 1 {
            scripts.remove(0)
        } else {
            scripts.first().cloned().unwrap_or_default()
        };
        Ok(Box::pin(futures::stream::iter(chunks.into_iter().map(Ok))))
    }
}

fn app_state(memory: Arc<MemorySaver>, provider: ScriptedProvider) -> web::Data<AppState> {
    web::Data::new(AppState::with_components(
        memory,
        Arc::new(provider),
        build_tool_executor(),
    ))
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .route("/chat", web::post().to(chat::handler))
                .route("/health", web::get().to(health::handler)),
        )
        .await
    };
}

#[actix_web::test]
async fn health_returns_healthy_json() {
    let state = app_state(Arc::new(MemorySaver::new()), ScriptedProvider::text("x"));
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json"
    );

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[actix_web::test]
async fn chat_streams_tokens_as_sse() {
    let state = app_state(
        Arc::new(MemorySaver::new()),
        ScriptedProvider::new(vec![vec![
            LLMChunk::Token("Hello ".to_string()),
            LLMChunk::Token(String::new()),
            LLMChunk::Token("world".to_string()),
        ]]),
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({ "message": "hi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert_eq!(
        body,
        "data: {\"type\":\"token\",\"content\":\"Hello \"}\n\n\
         data: {\"type\":\"token\",\"content\":\"world\"}\n\n"
    );
}

#[actix_web::test]
async fn tool_round_trip_appears_on_the_wire_in_order() {
    let state = app_state(
        Arc::new(MemorySaver::new()),
        ScriptedProvider::new(vec![
            vec![LLMChunk::ToolCalls(vec![ToolCall {
                id: "call_1".to_string(),
                tool_type: "function".to_string(),
                function: FunctionCall {
                    name: "get_user_age".to_string(),
                    arguments: r#"{"name":"bob"}"#.to_string(),
                },
            }])],
            vec![LLMChunk::Token("Bob is 42.".to_string())],
        ]),
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({ "message": "how old is bob?" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    let frames: Vec<&str> = body.split("\n\n").filter(|s| !s.is_empty()).collect();
    assert_eq!(frames.len(), 3);
    assert_eq!(
        frames[0],
        "data: {\"type\":\"tool_start\",\"tool\":\"get_user_age\",\"input\":\"{\\\"name\\\":\\\"bob\\\"}\"}"
    );
    assert_eq!(
        frames[1],
        "data: {\"type\":\"tool_end\",\"tool\":\"get_user_age\",\"output\":\"42 years old\"}"
    );
    assert_eq!(frames[2], "data: {\"type\":\"token\",\"content\":\"Bob is 42.\"}");
}

#[actix_web::test]
async fn explicit_thread_id_shares_history_across_calls() {
    let memory = Arc::new(MemorySaver::new());
    let state = app_state(Arc::clone(&memory), ScriptedProvider::text("reply"));
    let app = init_app!(state);

    for message in ["first", "second"] {
        let req = test::TestRequest::post()
            .uri("/chat")
            .set_json(json!({ "message": message, "thread_id": "thread-123" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        // Body EOF implies the session write-back has landed.
        let _ = test::read_body(resp).await;
    }

    let session = memory.load_session("thread-123").await.unwrap().unwrap();
    assert_eq!(session.id, "thread-123");
    let contents: Vec<&str> = session.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "reply", "second", "reply"]);
}

#[actix_web::test]
async fn missing_thread_id_generates_a_uuid() {
    let memory = Arc::new(MemorySaver::new());
    let state = app_state(Arc::clone(&memory), ScriptedProvider::text("reply"));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({ "message": "hi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let _ = test::read_body(resp).await;

    let ids = memory.thread_ids().await;
    assert_eq!(ids.len(), 1);
    assert!(uuid::Uuid::parse_str(&ids[0]).is_ok());
}

#[actix_web::test]
async fn file_backed_store_survives_a_new_app_instance() {
    let dir = tempfile::TempDir::new().unwrap();

    {
        let storage = JsonlStorage::new(dir.path());
        storage.init().await.unwrap();
        let state = web::Data::new(AppState::with_components(
            Arc::new(storage),
            Arc::new(ScriptedProvider::text("reply")),
            build_tool_executor(),
        ));
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/chat")
            .set_json(json!({ "message": "remember me", "thread_id": "durable" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let _ = test::read_body(resp).await;
    }

    // A fresh store over the same directory sees the conversation.
    let storage = JsonlStorage::new(dir.path());
    let session = storage.load_session("durable").await.unwrap().unwrap();
    assert_eq!(session.messages[0].content, "remember me");
}

#[actix_web::test]
async fn request_without_message_is_rejected() {
    let state = app_state(Arc::new(MemorySaver::new()), ScriptedProvider::text("x"));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({ "thread_id": "t1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}

#[actix_web::test]
async fn empty_model_output_closes_stream_without_frames() {
    // An empty script makes the model produce nothing: no tool calls, no
    // tokens. The loop completes immediately; only unrecognized events flow.
    let state = app_state(
        Arc::new(MemorySaver::new()),
        ScriptedProvider::new(vec![vec![]]),
    );
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({ "message": "hi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}
