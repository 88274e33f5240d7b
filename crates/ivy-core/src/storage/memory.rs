use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::agent::types::Session;
use crate::storage::MemoryStore;

/// In-process memory store: a map of thread id to session. Contents are lost
/// on restart.
#[derive(Default)]
pub struct MemorySaver {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn thread_ids(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl MemoryStore for MemorySaver {
    async fn save_session(&self, session: &Session) -> std::io::Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn load_session(&self, thread_id: &str) -> std::io::Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(thread_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::Message;

    #[tokio::test]
    async fn round_trips_a_session() {
        let store = MemorySaver::new();
        let mut session = Session::new("t1");
        session.add_message(Message::user("hello"));

        store.save_session(&session).await.unwrap();

        let loaded = store.load_session("t1").await.unwrap().unwrap();
        assert_eq!(loaded.id, "t1");
        assert_eq!(loaded.messages.len(), 1);
    }

    #[tokio::test]
    async fn missing_thread_loads_none() {
        let store = MemorySaver::new();
        assert!(store.load_session("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_overwrites_previous_state() {
        let store = MemorySaver::new();
        let mut session = Session::new("t1");
        store.save_session(&session).await.unwrap();

        session.add_message(Message::user("more"));
        store.save_session(&session).await.unwrap();

        let loaded = store.load_session("t1").await.unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(store.len().await, 1);
    }
}
