use std::sync::Arc;

use rayon::ThreadPool;
use tokio::sync::oneshot;

use crate::{panic_payload_to_str, task::BlockingTask, CancellationToken, Cancelled, TaskError};

/// A named rayon pool, or `None` when its threads could not be started; work then runs on the
/// spawning thread.
fn build_pool(name: &'static str, threads: usize) -> Option<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(move |idx| format!("{name}-{idx}"))
        .build()
        .map_err(|err| {
            tracing::warn!(
                target = "remap.scheduler",
                pool = name,
                error = %err,
                "running tasks inline"
            );
        })
        .ok()
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Threads for matching rounds.
    pub compute_threads: usize,
    /// Threads for source index rebuilds.
    pub background_threads: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            compute_threads: available.saturating_sub(1).clamp(1, 8),
            background_threads: available.clamp(1, 2),
        }
    }
}

#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    compute: Option<ThreadPool>,
    background: Option<ThreadPool>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                compute: build_pool("remap-compute", config.compute_threads),
                background: build_pool("remap-background", config.background_threads),
            }),
        }
    }

    /// Runs `f` on the compute pool.
    pub fn spawn_compute<T, F>(&self, f: F) -> BlockingTask<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Result<T, Cancelled> + Send + 'static,
    {
        spawn_on(self.inner.compute.as_ref(), "compute", f)
    }

    /// Runs `f` on the background pool.
    pub fn spawn_background<T, F>(&self, f: F) -> BlockingTask<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Result<T, Cancelled> + Send + 'static,
    {
        spawn_on(self.inner.background.as_ref(), "background", f)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

fn spawn_on<T, F>(pool: Option<&ThreadPool>, name: &'static str, f: F) -> BlockingTask<T>
where
    T: Send + 'static,
    F: FnOnce(CancellationToken) -> Result<T, Cancelled> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let token = CancellationToken::new();
    let body_token = token.clone();
    let job = move || {
        let result = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            f(body_token.clone())
        })) {
            // A body that finished after cancellation still publishes nothing.
            Ok(_) if body_token.is_cancelled() => Err(TaskError::Cancelled),
            Ok(result) => result.map_err(TaskError::from),
            Err(panic) => {
                tracing::error!(
                    target = "remap.scheduler",
                    pool = name,
                    panic = %panic_payload_to_str(&*panic),
                    "task panicked"
                );
                Err(TaskError::Panicked)
            }
        };
        let _ = tx.send(result);
    };

    match pool {
        Some(pool) => pool.spawn(job),
        None => job(),
    }
    BlockingTask::new(token, rx)
}
