pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStorage;
pub use memory::MemorySaver;

use async_trait::async_trait;

use crate::agent::types::Session;

/// Conversation memory keyed by thread id.
///
/// No locking is performed per thread: two concurrent requests on the same
/// thread race, last write wins.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn save_session(&self, session: &Session) -> std::io::Result<()>;
    async fn load_session(&self, thread_id: &str) -> std::io::Result<Option<Session>>;
}
