//! Serialized host execution context
//!
//! The host project model may only be touched from one execution context.
//! [`HostContext`] owns the host on a dedicated thread and runs jobs sent
//! from request handlers one at a time. A job holds the context only for
//! its own duration; filesystem writes happen outside it.

use std::panic::AssertUnwindSafe;

use filebridge_core::ProjectHost;
use tokio::sync::{mpsc, oneshot};

type Job = Box<dyn FnOnce(&mut dyn ProjectHost) + Send>;

/// Errors from marshaling a job onto the host context
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Host context is not running")]
    Closed,

    #[error("Host job failed before completing")]
    JobFailed,
}

/// Handle to the host thread; cheap to clone
#[derive(Clone)]
pub struct HostContext {
    jobs: mpsc::UnboundedSender<Job>,
}

impl HostContext {
    /// Move `host` onto its own thread and start serving jobs
    pub fn spawn<H>(host: H) -> std::io::Result<Self>
    where
        H: ProjectHost + 'static,
    {
        let (jobs, mut rx) = mpsc::unbounded_channel::<Job>();

        std::thread::Builder::new()
            .name("filebridge-host".to_string())
            .spawn(move || {
                let mut host = host;
                while let Some(job) = rx.blocking_recv() {
                    let target: &mut dyn ProjectHost = &mut host;
                    // A panicking job fails its own request only
                    let result = std::panic::catch_unwind(AssertUnwindSafe(move || job(target)));
                    if result.is_err() {
                        tracing::error!("Host job panicked; host context continues");
                    }
                }
                tracing::debug!("Host context stopped");
            })?;

        Ok(Self { jobs })
    }

    /// Run `f` on the host context and wait for its result
    pub async fn run<T, F>(&self, f: F) -> Result<T, ContextError>
    where
        F: FnOnce(&mut dyn ProjectHost) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move |host| {
            let _ = tx.send(f(host));
        });
        self.jobs.send(job).map_err(|_| ContextError::Closed)?;
        rx.await.map_err(|_| ContextError::JobFailed)
    }
}
