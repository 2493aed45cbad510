use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::CacheError;

/// Client-local store for the selected seat ids, one JSON file per key.
#[derive(Debug, Clone)]
pub struct SelectionCache {
    dir: PathBuf,
    key: String,
}

impl SelectionCache {
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    /// Cached ids, or an empty list when nothing was stored yet.
    pub async fn load(&self) -> Result<Vec<String>, CacheError> {
        match tokio::fs::read(self.path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn store(&self, ids: &[String]) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let data = serde_json::to_vec(ids)?;
        // write-then-rename so a reader never sees half a file
        let tmp = self.dir.join(format!(".{}.tmp", self.key));
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, self.path()).await?;
        Ok(())
    }

    /// Background writer applying stores in the order they were queued.
    pub fn spawn_writer(self) -> SelectionWriter {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<String>>();
        let task = tokio::spawn(async move {
            while let Some(mut ids) = rx.recv().await {
                // only the newest pending snapshot matters
                while let Ok(newer) = rx.try_recv() {
                    ids = newer;
                }
                match self.store(&ids).await {
                    Ok(()) => debug!("Stored {} selected seats", ids.len()),
                    Err(e) => error!("Failed to store selection: {}", e),
                }
            }
            info!("Selection writer stopped");
        });
        SelectionWriter { tx, task }
    }
}

pub struct SelectionWriter {
    tx: mpsc::UnboundedSender<Vec<String>>,
    task: JoinHandle<()>,
}

impl SelectionWriter {
    pub fn persist(&self, ids: Vec<String>) {
        if self.tx.send(ids).is_err() {
            error!("Selection writer is gone, selection not persisted");
        }
    }

    /// Flush everything queued so far and stop.
    pub async fn finish(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            error!("Selection writer task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_cache_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SelectionCache::new(dir.path(), "selectedSeats");
        assert!(cache.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SelectionCache::new(dir.path().join("nested"), "selectedSeats");
        let ids = vec!["A-1-1".to_string(), "A-1-2".to_string()];
        cache.store(&ids).await.unwrap();
        assert_eq!(cache.load().await.unwrap(), ids);
        let raw = std::fs::read_to_string(cache.path()).unwrap();
        assert_eq!(raw, r#"["A-1-1","A-1-2"]"#);
    }

    #[tokio::test]
    async fn corrupt_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SelectionCache::new(dir.path(), "selectedSeats");
        std::fs::write(cache.path(), "{not a list").unwrap();
        assert!(matches!(cache.load().await, Err(CacheError::Json(_))));
    }

    #[tokio::test]
    async fn writer_keeps_the_last_write() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SelectionCache::new(dir.path(), "selectedSeats");
        let writer = cache.clone().spawn_writer();
        writer.persist(vec!["a".into()]);
        writer.persist(vec!["a".into(), "b".into()]);
        writer.persist(vec!["b".into()]);
        writer.finish().await;
        assert_eq!(cache.load().await.unwrap(), vec!["b".to_string()]);
    }
}
