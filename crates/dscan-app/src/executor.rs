//! Background executor for store and file work.
//!
//! Store reads and writes never run on the context that drives the display
//! layer. The executor either owns a dedicated multi-thread runtime or borrows
//! the handle of the runtime it was created on (useful in tests).

use dscan_core::AppError;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::{JoinError, JoinHandle};

const THREAD_NAME: &str = "dscan-io";

struct OwnedRuntime(Option<Runtime>);

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        // Dropping a runtime inside another runtime's context panics;
        // shutdown_background does not block.
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

/// Cheaply cloneable handle to the background executor.
#[derive(Clone)]
pub struct BackgroundExecutor {
    handle: Handle,
    _runtime: Option<Arc<OwnedRuntime>>,
}

impl BackgroundExecutor {
    /// Start a dedicated runtime with `worker_threads` threads.
    pub fn new(worker_threads: usize) -> Result<Self, AppError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name(THREAD_NAME)
            .enable_all()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to start background runtime: {}", e)))?;

        tracing::debug!(worker_threads, "Background executor started");

        Ok(Self {
            handle: runtime.handle().clone(),
            _runtime: Some(Arc::new(OwnedRuntime(Some(runtime)))),
        })
    }

    /// Share the runtime the caller is running on.
    pub fn current() -> Result<Self, AppError> {
        let handle = Handle::try_current()
            .map_err(|e| AppError::Internal(format!("No async runtime available: {}", e)))?;
        Ok(Self {
            handle,
            _runtime: None,
        })
    }

    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }

    /// Run `future` on the executor and wait for its result.
    pub async fn run<F, T>(&self, future: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>> + Send + 'static,
        T: Send + 'static,
    {
        self.handle.spawn(future).await.map_err(join_error)?
    }
}

fn join_error(err: JoinError) -> AppError {
    if err.is_cancelled() {
        AppError::Internal("Background task was cancelled".to_string())
    } else {
        AppError::Internal(format!("Background task panicked: {}", err))
    }
}
