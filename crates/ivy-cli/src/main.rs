use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "ivy-cli")]
#[command(about = "Terminal client for ivy-server")]
#[command(version)]
struct Cli {
    /// Server base URL
    #[arg(long, env = "IVY_SERVER", default_value = "http://localhost:8080")]
    server: String,

    /// Thread id to continue; a fresh one is generated when unset
    #[arg(long)]
    thread: Option<String>,

    /// Message to send; starts an interactive session when unset
    message: Option<String>,
}

/// The server's SSE frame payloads.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Frame {
    Token { content: String },
    ToolStart { tool: String, input: String },
    ToolEnd { tool: String, output: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let thread_id = cli
        .thread
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match cli.message {
        Some(message) => send_message(&client, &cli.server, &thread_id, &message).await,
        None => interactive(&client, &cli.server, &thread_id).await,
    }
}

async fn interactive(client: &reqwest::Client, server: &str, thread_id: &str) -> Result<()> {
    println!("{} thread {}", "ivy".green().bold(), thread_id.dimmed());
    println!("{}", "Type a message, or 'exit' to quit.".dimmed());

    let stdin = io::stdin();
    loop {
        print!("{} ", ">".cyan().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        send_message(client, server, thread_id, line).await?;
    }
    Ok(())
}

async fn send_message(
    client: &reqwest::Client,
    server: &str,
    thread_id: &str,
    message: &str,
) -> Result<()> {
    let response = client
        .post(format!("{server}/chat"))
        .json(&serde_json::json!({
            "message": message,
            "thread_id": thread_id,
        }))
        .send()
        .await
        .with_context(|| format!("failed to reach {server}"))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        bail!("server returned {status}: {text}");
    }

    let mut stream = response.bytes_stream().eventsource();
    while let Some(event) = stream.next().await {
        let event = event.context("stream interrupted")?;
        match serde_json::from_str::<Frame>(&event.data) {
            Ok(Frame::Token { content }) => {
                print!("{content}");
                io::stdout().flush()?;
            }
            Ok(Frame::ToolStart { tool, input }) => {
                println!();
                println!("{} {} {}", "tool".yellow().bold(), tool.yellow(), input.dimmed());
            }
            Ok(Frame::ToolEnd { tool, output }) => {
                println!("{} {} {}", "  ->".yellow(), tool.yellow(), output);
            }
            Err(e) => {
                eprintln!("{} unrecognized frame: {e}", "warn".red());
            }
        }
    }
    println!();
    Ok(())
}
