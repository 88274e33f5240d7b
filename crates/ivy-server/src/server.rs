use std::io;
use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use crate::handlers;
use crate::state::AppState;

pub async fn run_server(
    port: u16,
    llm_base_url: String,
    model: String,
    api_key: String,
    data_dir: Option<PathBuf>,
) -> io::Result<()> {
    let state = web::Data::new(AppState::new(llm_base_url, model, api_key, data_dir).await?);

    log::info!("Listening on 0.0.0.0:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .route("/chat", web::post().to(handlers::chat::handler))
            .route("/health", web::get().to(handlers::health::handler))
    })
    .bind(format!("0.0.0.0:{port}"))?
    .run()
    .await
}
