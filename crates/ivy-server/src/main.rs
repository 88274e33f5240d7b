use std::io;
use std::path::PathBuf;

use clap::Parser;

mod handlers;
mod logging;
mod server;
mod sse;
mod state;
mod tools;

use logging::init_logging;
use server::run_server;

#[derive(Parser, Debug)]
#[command(name = "ivy-server")]
#[command(about = "Streaming chat agent over SSE")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Server port
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,

    /// LLM API base URL (OpenAI-compatible)
    #[arg(long, env = "LLM_BASE_URL", default_value = "https://api.openai.com/v1")]
    llm_base_url: String,

    /// LLM model name
    #[arg(long, env = "LLM_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// LLM API key
    #[arg(long, env = "LLM_API_KEY", default_value = "")]
    api_key: String,

    /// Directory for persisted conversations; in-memory only when unset
    #[arg(long, env = "IVY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (overrides the debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if cli.log_level.is_some() {
        env_logger::init();
    } else {
        init_logging(cli.debug);
    }

    log::info!("Starting ivy-server on port {}", cli.port);
    log::info!("  Model: {}", cli.model);
    log::info!("  Base URL: {}", cli.llm_base_url);

    run_server(
        cli.port,
        cli.llm_base_url,
        cli.model,
        cli.api_key,
        cli.data_dir,
    )
    .await
}
