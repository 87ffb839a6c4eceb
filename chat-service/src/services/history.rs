//! Session history store.
//!
//! Sessions live for the lifetime of the process; nothing is evicted.

use crate::models::Turn;
use async_trait::async_trait;
use dashmap::DashMap;

/// Keyed, process-lifetime storage of conversation turns.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Existing turns for `session_id`, creating an empty session if unseen.
    async fn get_or_create(&self, session_id: &str) -> anyhow::Result<Vec<Turn>>;

    /// Append a user turn followed by a model turn, creating the session if absent.
    async fn append(
        &self,
        session_id: &str,
        user_text: String,
        model_text: String,
    ) -> anyhow::Result<()>;

    /// Turns for `session_id` without creating it.
    async fn history(&self, session_id: &str) -> anyhow::Result<Option<Vec<Turn>>>;

    /// Number of sessions currently held.
    async fn session_count(&self) -> anyhow::Result<usize>;
}

/// In-memory store backed by a sharded concurrent map.
///
/// Each append holds the entry guard for its key while pushing both turns, so
/// pairs from concurrent requests on one session never interleave. Guards are
/// never held across an await.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    sessions: DashMap<String, Vec<Turn>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn get_or_create(&self, session_id: &str) -> anyhow::Result<Vec<Turn>> {
        let turns = self
            .sessions
            .entry(session_id.to_string())
            .or_default()
            .value()
            .clone();
        Ok(turns)
    }

    async fn append(
        &self,
        session_id: &str,
        user_text: String,
        model_text: String,
    ) -> anyhow::Result<()> {
        let mut turns = self.sessions.entry(session_id.to_string()).or_default();
        turns.push(Turn::user(user_text));
        turns.push(Turn::model(model_text));
        Ok(())
    }

    async fn history(&self, session_id: &str) -> anyhow::Result<Option<Vec<Turn>>> {
        Ok(self.sessions.get(session_id).map(|turns| turns.value().clone()))
    }

    async fn session_count(&self) -> anyhow::Result<usize> {
        Ok(self.sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use std::sync::Arc;

    #[tokio::test]
    async fn unseen_session_starts_empty() {
        let store = InMemoryHistoryStore::new();
        assert!(store.history("s1").await.unwrap().is_none());

        assert!(store.get_or_create("s1").await.unwrap().is_empty());
        assert_eq!(store.history("s1").await.unwrap(), Some(Vec::new()));
        assert_eq!(store.session_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn append_adds_user_then_model() {
        let store = InMemoryHistoryStore::new();
        store
            .append("s1", "question".to_string(), "answer".to_string())
            .await
            .unwrap();

        let turns = store.get_or_create("s1").await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].text, "question");
        assert_eq!(turns[1].role, Role::Model);
        assert_eq!(turns[1].text, "answer");
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = InMemoryHistoryStore::new();
        store
            .append("a", "1".to_string(), "2".to_string())
            .await
            .unwrap();

        assert!(store.get_or_create("b").await.unwrap().is_empty());
        assert_eq!(store.get_or_create("a").await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_keep_pairs_together() {
        let store = Arc::new(InMemoryHistoryStore::new());

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .append("shared", format!("q{}", i), format!("a{}", i))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let turns = store.history("shared").await.unwrap().unwrap();
        assert_eq!(turns.len(), 100);
        for pair in turns.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Model);
            assert_eq!(pair[0].text[1..], pair[1].text[1..]);
        }
    }
}
