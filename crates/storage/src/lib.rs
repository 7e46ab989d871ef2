use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use rihla_core::ConversationMemory;

/// The persisted shape: one serializable table mapping session id to its
/// conversation memory.
pub type SessionTable = HashMap<String, ConversationMemory>;

/// Whole-table snapshot persistence. The contract is "read everything on
/// startup, write everything on mutation, best-effort" — the engine treats
/// every failure here as non-fatal.
pub trait SnapshotRepository: Send + Sync {
    async fn load_all(&self) -> Result<SessionTable>;
    async fn save_all(&self, table: &SessionTable) -> Result<()>;
}

/// In-process snapshot surface, used as the default backend and in tests.
#[derive(Clone, Default)]
pub struct EphemeralStore {
    table: Arc<RwLock<SessionTable>>,
}

impl EphemeralStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotRepository for EphemeralStore {
    async fn load_all(&self) -> Result<SessionTable> {
        Ok(self.table.read().clone())
    }

    async fn save_all(&self, table: &SessionTable) -> Result<()> {
        *self.table.write() = table.clone();
        Ok(())
    }
}

/// Single JSON document on disk. Writes go through a sibling temp file and a
/// rename so a crashed save never truncates the previous snapshot.
#[derive(Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotRepository for FileStore {
    async fn load_all(&self) -> Result<SessionTable> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Ok(SessionTable::new());
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed reading snapshot at {}", self.path.display()));
            }
        };

        serde_json::from_slice(&bytes)
            .with_context(|| format!("failed decoding snapshot at {}", self.path.display()))
    }

    async fn save_all(&self, table: &SessionTable) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(table).context("failed encoding snapshot")?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("failed creating snapshot directory {}", parent.display())
                })?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .with_context(|| format!("failed writing snapshot to {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed replacing snapshot at {}", self.path.display()))?;

        Ok(())
    }
}

#[derive(Clone)]
pub enum Store {
    Ephemeral(EphemeralStore),
    File(FileStore),
}

impl Store {
    pub fn ephemeral() -> Self {
        Self::Ephemeral(EphemeralStore::new())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(FileStore::new(path))
    }
}

impl SnapshotRepository for Store {
    async fn load_all(&self) -> Result<SessionTable> {
        match self {
            Store::Ephemeral(store) => store.load_all().await,
            Store::File(store) => store.load_all().await,
        }
    }

    async fn save_all(&self, table: &SessionTable) -> Result<()> {
        match self {
            Store::Ephemeral(store) => store.save_all(table).await,
            Store::File(store) => store.save_all(table).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rihla_core::{ConversationContext, CulturalPreferences, Locale, PersonalPreferences};

    fn sample_memory(session_id: &str) -> ConversationMemory {
        ConversationMemory {
            session_id: session_id.to_string(),
            preferred_language: Locale::Ar,
            cultural_preferences: CulturalPreferences::default(),
            travel_history: Vec::new(),
            personal_preferences: PersonalPreferences::default(),
            conversation_context: ConversationContext::default(),
            last_interaction: "2026-08-23T09:30:00Z".parse().unwrap(),
            total_interactions: 3,
        }
    }

    #[tokio::test]
    async fn file_store_round_trips_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("sessions.json"));

        let mut table = SessionTable::new();
        table.insert("s-1".to_string(), sample_memory("s-1"));
        store.save_all(&table).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded, table);
    }

    #[tokio::test]
    async fn missing_snapshot_file_loads_as_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("missing.json"));
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_an_error_for_the_engine_to_absorb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = FileStore::new(path);
        assert!(store.load_all().await.is_err());
    }

    #[tokio::test]
    async fn ephemeral_store_keeps_the_last_saved_table() {
        let store = EphemeralStore::new();
        let mut table = SessionTable::new();
        table.insert("s-2".to_string(), sample_memory("s-2"));

        store.save_all(&table).await.unwrap();
        table.remove("s-2");
        store.save_all(&table).await.unwrap();

        assert!(store.load_all().await.unwrap().is_empty());
    }
}
