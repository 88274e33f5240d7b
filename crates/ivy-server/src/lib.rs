pub mod handlers;
pub mod logging;
pub mod server;
pub mod sse;
pub mod state;
pub mod tools;

pub use server::run_server;
pub use state::AppState;
