//! The single task-join primitive shared by dump and restore: spawn a tree of
//! tasks, cancel every unfinished sibling as soon as one fails, await their
//! termination, and propagate only the first error.

use slicedb_errors::SliceError;
use tokio::task::JoinSet;
use tracing::debug;

/// Spawns tasks that return `Result<(), SliceError>` and, on the first
/// failure, aborts every task still running and waits for them to unwind
/// before returning that first error.
///
/// Tasks may themselves spawn further tasks onto the same `TaskJoin` (e.g. a
/// `TableTask` spawning child `TableTask`s) — `spawn` takes `&self`.
pub struct TaskJoin {
    tasks: tokio::sync::Mutex<JoinSet<Result<(), SliceError>>>,
}

impl Default for TaskJoin {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskJoin {
    pub fn new() -> Self {
        TaskJoin {
            tasks: tokio::sync::Mutex::new(JoinSet::new()),
        }
    }

    /// Spawns a future onto this join set.
    pub async fn spawn<F>(&self, fut: F)
    where
        F: std::future::Future<Output = Result<(), SliceError>> + Send + 'static,
    {
        self.tasks.lock().await.spawn(fut);
    }

    /// Awaits all spawned tasks (including ones spawned by other tasks while
    /// this call is running). On the first task failure, aborts every
    /// remaining task and returns that failure; later failures are dropped
    /// to keep the first cause unambiguous, per the core's error policy.
    pub async fn join(&self) -> Result<(), SliceError> {
        let mut first_error: Option<SliceError> = None;

        loop {
            let next = {
                let mut tasks = self.tasks.lock().await;
                tasks.join_next().await
            };
            let Some(joined) = next else {
                break;
            };

            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    if first_error.is_none() {
                        debug!(kind = err.kind(), "task failed, cancelling siblings");
                        first_error = Some(err);
                        self.tasks.lock().await.abort_all();
                    }
                }
                Err(join_err) if join_err.is_cancelled() => {
                    // Expected once we've called abort_all(); not itself the
                    // reported cause.
                }
                Err(join_err) => {
                    if first_error.is_none() {
                        first_error = Some(SliceError::database(
                            slicedb_errors::ObjectId::None,
                            format!("task panicked: {join_err}"),
                        ));
                        self.tasks.lock().await.abort_all();
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn succeeds_when_all_tasks_succeed() {
        let join = TaskJoin::new();
        for _ in 0..5 {
            join.spawn(async { Ok(()) }).await;
        }
        assert!(join.join().await.is_ok());
    }

    #[tokio::test]
    async fn propagates_first_error_and_cancels_rest() {
        let join = Arc::new(TaskJoin::new());
        let completed = Arc::new(AtomicUsize::new(0));

        join.spawn(async {
            Err(SliceError::data(
                slicedb_errors::ObjectId::None,
                "boom".to_string(),
            ))
        })
        .await;

        for _ in 0..4 {
            let completed = Arc::clone(&completed);
            join.spawn(async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                completed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;
        }

        let result = join.join().await;
        assert!(result.is_err());
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }
}
