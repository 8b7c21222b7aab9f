//! Persistence of captured bags.

use crate::error::{CaptureError, Result};
use crate::task::CaptureTask;
use futures::future::BoxFuture;

/// Persists one capture. Runs on the capture worker.
pub trait CaptureStore: Send + Sync + 'static {
    fn store<'a>(&'a self, task: &'a CaptureTask) -> BoxFuture<'a, Result<()>>;
}

/// Writes each capture as a pretty-printed JSON file, creating the
/// directory if needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

impl CaptureStore for FileStore {
    fn store<'a>(&'a self, task: &'a CaptureTask) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let contents = serde_json::to_vec_pretty(task.contents())?;
            tokio::fs::create_dir_all(task.directory())
                .await
                .map_err(|source| CaptureError::Io {
                    path: task.directory().to_path_buf(),
                    source,
                })?;
            let path = task.path();
            if let Err(source) = tokio::fs::write(&path, contents).await {
                return Err(CaptureError::Io { path, source });
            }
            Ok(())
        })
    }
}
