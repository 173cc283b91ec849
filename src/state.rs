//! Application state management

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::config::Config;
use crate::document::DocumentOperationService;
use crate::engine::PdfEditEngine;
use crate::error::AppError;
use crate::workspace::Workspace;

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Workspace root {path} is not usable: {source}")]
    WorkspaceRoot {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    service: DocumentOperationService<PdfEditEngine>,
    permits: Semaphore,
}

impl AppState {
    /// Create a new application state
    ///
    /// Fails when the workspace root cannot be created.
    pub fn new(config: Config) -> Result<Self, StateError> {
        let root = &config.workspace.root;
        std::fs::create_dir_all(root).map_err(|source| StateError::WorkspaceRoot {
            path: root.display().to_string(),
            source,
        })?;

        let permits = Semaphore::new(config.limits.max_concurrent_ops.max(1));
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                service: DocumentOperationService::new(PdfEditEngine::new()),
                permits,
            }),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the document operation service
    pub fn service(&self) -> &DocumentOperationService<PdfEditEngine> {
        &self.inner.service
    }

    /// Open a fresh per-request workspace
    pub fn workspace(&self) -> Result<Workspace, AppError> {
        Ok(Workspace::new(&self.inner.config.workspace)?)
    }

    /// Run a document operation on the blocking pool
    ///
    /// At most `max_concurrent_ops` operations run at once. On timeout the
    /// request fails while the task finishes in the background; `workspace`
    /// is moved into the task so it outlives the files the task touches.
    pub async fn run_blocking<T, F>(&self, workspace: Workspace, op: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&DocumentOperationService<PdfEditEngine>, &Workspace) -> T + Send + 'static,
    {
        let _permit = self
            .inner
            .permits
            .acquire()
            .await
            .map_err(|e| AppError::Internal(format!("Operation pool closed: {}", e)))?;

        let state = self.clone();
        let limit = self.inner.config.limits.operation_timeout_secs;
        let result = timeout(
            self.inner.config.limits.operation_timeout(),
            tokio::task::spawn_blocking(move || {
                let output = op(state.service(), &workspace);
                drop(workspace);
                output
            }),
        )
        .await;

        match result {
            Ok(join_result) => {
                join_result.map_err(|e| AppError::Internal(format!("Task join error: {}", e)))
            }
            Err(_) => Err(AppError::Timeout(limit)),
        }
    }
}
