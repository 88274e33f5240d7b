pub mod config;
pub mod runner;
pub mod stream;

pub use config::AgentConfig;
pub use runner::run_agent;
