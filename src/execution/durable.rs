//! Durable Execution Persistence
//!
//! Optional restart survival for execution records. The in-memory
//! [`ExecutionStore`](super::ExecutionStore) is authoritative while the
//! engine runs; a `DurableStore` mirrors every update so records outlive the
//! process. One record is written per execution id, containing exactly the
//! `WorkflowExecution` fields. Templates are configuration loaded at
//! startup and are not persisted here.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{info, warn};
use tokio::fs;

use crate::error::{EngineError, EngineResult};

use super::record::WorkflowExecution;

/// External persistence contract for execution records.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Writes or overwrites the record for the execution's id.
    async fn save(&self, execution: &WorkflowExecution) -> EngineResult<()>;

    /// Reads the record for an id, or `None` if absent.
    async fn load(&self, id: &str) -> EngineResult<Option<WorkflowExecution>>;

    /// Reads every stored record.
    async fn load_all(&self) -> EngineResult<Vec<WorkflowExecution>>;
}

/// Durable store writing one pretty-printed JSON file per execution.
///
/// Records land in `<dir>/<execution_id>.json`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a file store rooted at the given directory. The directory is
    /// created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    async fn read_record(path: &Path) -> EngineResult<WorkflowExecution> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| EngineError::Storage(format!("read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| EngineError::Storage(format!("parse {}: {}", path.display(), e)))
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn save(&self, execution: &WorkflowExecution) -> EngineResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| EngineError::Storage(format!("create {}: {}", self.dir.display(), e)))?;

        let path = self.record_path(&execution.id);
        let json = serde_json::to_string_pretty(execution)
            .map_err(|e| EngineError::Storage(format!("serialize '{}': {}", execution.id, e)))?;

        fs::write(&path, json)
            .await
            .map_err(|e| EngineError::Storage(format!("write {}: {}", path.display(), e)))?;

        info!("Saved execution '{}' to {}", execution.id, path.display());
        Ok(())
    }

    async fn load(&self, id: &str) -> EngineResult<Option<WorkflowExecution>> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::read_record(&path).await?))
    }

    async fn load_all(&self) -> EngineResult<Vec<WorkflowExecution>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| EngineError::Storage(format!("read {}: {}", self.dir.display(), e)))?;

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| EngineError::Storage(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_record(&path).await {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }

        records.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
        info!("Loaded {} execution records from {}", records.len(), self.dir.display());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Context;
    use crate::template::{StepDescriptor, WorkflowTemplate};
    use tempfile::tempdir;

    fn make_execution() -> WorkflowExecution {
        let template = WorkflowTemplate::new("t1", "Test", "Testing")
            .with_step(StepDescriptor::new(0, "noop"));
        WorkflowExecution::new(&template, Context::new())
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let mut exec = make_execution();
        exec.start();
        store.save(&exec).await.unwrap();

        let loaded = store.load(&exec.id).await.unwrap().unwrap();
        assert_eq!(loaded, exec);
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.load("exec_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_record() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let mut exec = make_execution();
        store.save(&exec).await.unwrap();

        exec.start();
        exec.fail("cancelled");
        store.save(&exec).await.unwrap();

        let loaded = store.load(&exec.id).await.unwrap().unwrap();
        assert_eq!(loaded.failure_reason.as_deref(), Some("cancelled"));
    }

    #[tokio::test]
    async fn test_load_all() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let a = make_execution();
        let b = make_execution();
        store.save(&a).await.unwrap();
        store.save(&b).await.unwrap();

        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_load_all_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("never_created"));

        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_all_skips_unparseable_files() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save(&make_execution()).await.unwrap();
        std::fs::write(dir.path().join("garbage.json"), "not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 1);
    }
}
