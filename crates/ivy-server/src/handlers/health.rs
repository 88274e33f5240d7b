use actix_web::{HttpResponse, Responder};

/// Fixed liveness response; no dependency checks.
pub async fn handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "healthy" }))
}
