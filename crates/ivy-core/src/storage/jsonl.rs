use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::agent::types::Session;
use crate::storage::MemoryStore;

/// File-backed memory store: one JSON document per thread under a data
/// directory. Survives restarts, unlike [`MemorySaver`](crate::MemorySaver).
#[derive(Debug, Clone)]
pub struct JsonlStorage {
    base_path: PathBuf,
}

impl JsonlStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub async fn init(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.base_path).await
    }

    fn session_path(&self, thread_id: &str) -> PathBuf {
        // Thread ids are caller-supplied; strip path separators so an id
        // like "../x" cannot escape the data directory.
        let safe: String = thread_id
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.base_path.join(format!("{safe}.json"))
    }
}

#[async_trait]
impl MemoryStore for JsonlStorage {
    async fn save_session(&self, session: &Session) -> std::io::Result<()> {
        let path = self.session_path(&session.id);
        let json = serde_json::to_string(session)?;
        fs::write(path, json).await
    }

    async fn load_session(&self, thread_id: &str) -> std::io::Result<Option<Session>> {
        let path = self.session_path(thread_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).await?;
        let session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }
}
