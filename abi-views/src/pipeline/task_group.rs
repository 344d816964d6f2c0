use std::future::Future;

use tokio::task::{JoinError, JoinSet};
use tracing::error;

use super::PipelineError;

/// Tasks spawned eagerly and awaited behind a single barrier.
#[derive(Default)]
pub struct TaskGroup {
    tasks: JoinSet<()>,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for every task, even after one has panicked, and returns how many
    /// were joined. The first panic is reported once all tasks are done.
    pub async fn join_all(mut self) -> Result<usize, PipelineError> {
        let mut joined = 0;
        let mut first_panic = None;

        while let Some(result) = self.tasks.join_next().await {
            joined += 1;

            if let Err(join_error) = result {
                let message = panic_message(join_error);
                error!(message = message.as_str(), "task did not run to completion");

                first_panic.get_or_insert(message);
            }
        }

        match first_panic {
            Some(message) => Err(PipelineError::TaskPanicked(message)),
            None => Ok(joined),
        }
    }
}

fn panic_message(join_error: JoinError) -> String {
    if !join_error.is_panic() {
        return join_error.to_string();
    }

    let payload = join_error.into_panic();

    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "task panicked".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn joins_every_spawned_task() {
        let completed = Arc::new(AtomicUsize::new(0));
        let mut task_group = TaskGroup::new();

        for delay in [30, 10, 20] {
            let completed = completed.clone();

            task_group.spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                completed.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(task_group.len(), 3);
        assert_eq!(task_group.join_all().await.unwrap(), 3);
        assert_eq!(completed.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn surfaces_panics_after_joining_the_rest() {
        let completed = Arc::new(AtomicUsize::new(0));
        let mut task_group = TaskGroup::new();

        task_group.spawn(async { panic!("contract task blew up") });

        for _ in 0..3 {
            let completed = completed.clone();

            task_group.spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                completed.fetch_add(1, Ordering::SeqCst);
            });
        }

        let result = task_group.join_all().await;

        assert_eq!(
            result,
            Err(PipelineError::TaskPanicked("contract task blew up".to_string()))
        );
        assert_eq!(completed.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn joins_nothing_when_empty() {
        let task_group = TaskGroup::new();

        assert!(task_group.is_empty());
        assert_eq!(task_group.join_all().await.unwrap(), 0);
    }
}
