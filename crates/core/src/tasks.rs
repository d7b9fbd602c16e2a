use std::convert::Infallible;
use std::future::Future;
use tokio::task::JoinSet;

/// Supervisor for a device's long-running loops.
///
/// Every loop is expected to run forever, so the first one to finish, whether
/// by error, by panic, or by returning at all, brings the whole set down.
/// There is no per-loop recovery: the owner blanks its outputs, releases the
/// radio, and exits with the error that [`supervise`](Self::supervise) returns.
#[derive(Debug, Default)]
pub struct Tasks {
    set: JoinSet<anyhow::Error>,
}

impl Tasks {
    pub fn new() -> Self {
        Self::default()
    }
    /// Spawns a named loop.
    pub fn spawn<F>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = anyhow::Result<Infallible>> + Send + 'static,
    {
        log::debug!("[tasks] spawning {}", name);
        self.set.spawn(async move {
            match task.await {
                Ok(never) => match never {},
                Err(e) => e.context(format!("{} loop failed", name)),
            }
        });
    }
    /// Waits for the first loop to stop, aborts the rest, and returns the cause.
    pub async fn supervise(mut self) -> anyhow::Error {
        let error = match self.set.join_next().await {
            Some(Ok(e)) => e,
            Some(Err(e)) if e.is_panic() => anyhow::anyhow!("loop panicked: {}", e),
            Some(Err(e)) => anyhow::anyhow!("loop cancelled: {}", e),
            None => anyhow::anyhow!("no loops to supervise"),
        };
        log::error!("[tasks] shutting down: {:#}", error);
        self.set.shutdown().await;
        error
    }
}
