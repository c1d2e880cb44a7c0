// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::{JobProgress, JobRequest};
use crate::queue::progress_store::ProgressStore;
use crate::queue::task_queue::{QueueError, QueuedJob, TaskQueue};
use crate::workers::executor::{ExecutorRegistry, JobExecutor, ProgressReporter};
use crate::workers::worker::Worker;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::task::AbortHandle;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 作业工作器
///
/// 从本地队列取出任务，交给对应类型的执行器运行，并把结果写回进度存储
pub struct JobWorker<Q>
where
    Q: TaskQueue,
{
    queue: Arc<Q>,
    store: Arc<ProgressStore>,
    executors: Arc<ExecutorRegistry>,
    in_flight: Arc<DashMap<String, AbortHandle>>,
    worker_id: Uuid,
    name: String,
}

impl<Q> JobWorker<Q>
where
    Q: TaskQueue + 'static,
{
    /// # 参数
    ///
    /// * `in_flight` - 正在执行的任务，关闭时由 [`crate::workers::manager::WorkerManager`] 统一中止
    pub fn new(
        queue: Arc<Q>,
        store: Arc<ProgressStore>,
        executors: Arc<ExecutorRegistry>,
        in_flight: Arc<DashMap<String, AbortHandle>>,
    ) -> Self {
        let worker_id = Uuid::new_v4();
        Self {
            queue,
            store,
            executors,
            in_flight,
            worker_id,
            name: format!("job-worker-{}", worker_id),
        }
    }

    #[instrument(skip(self, job), fields(task_id = %job.task_id, kind = %job.request.kind(), worker_id = %self.worker_id))]
    async fn process_job(&self, job: QueuedJob) {
        let QueuedJob { task_id, request } = job;

        let outcome = match self.executors.get(request.kind()) {
            Some(executor) => {
                self.store.transition(
                    &task_id,
                    JobProgress::Running {
                        current: 0,
                        total: 1,
                        message: "Task started".to_string(),
                    },
                );
                info!("Processing job");

                let reporter = ProgressReporter::new(task_id.clone(), self.store.clone());
                let handle = tokio::spawn(run_executor(executor, request, reporter));
                self.in_flight.insert(task_id.clone(), handle.abort_handle());
                let joined = handle.await;
                self.in_flight.remove(&task_id);

                match joined {
                    Ok(Ok(result)) => JobProgress::Succeeded {
                        result: non_null(result),
                    },
                    Ok(Err(e)) => JobProgress::Failed {
                        error: format!("{:#}", e),
                    },
                    Err(e) => JobProgress::Failed {
                        error: format!("Executor aborted: {}", e),
                    },
                }
            }
            None => JobProgress::Failed {
                error: format!("No executor registered for job kind '{}'", request.kind()),
            },
        };

        match &outcome {
            JobProgress::Failed { error } => warn!(error = %error, "Job failed"),
            _ => info!("Job completed"),
        }
        self.store.transition(&task_id, outcome);
    }
}

async fn run_executor(
    executor: Arc<dyn JobExecutor>,
    request: JobRequest,
    reporter: ProgressReporter,
) -> anyhow::Result<Value> {
    executor.execute(&request, reporter).await
}

/// 成功结果总是非空对象
fn non_null(result: Value) -> Value {
    match result {
        Value::Null => Value::Object(Map::new()),
        other => other,
    }
}

#[async_trait]
impl<Q> Worker for JobWorker<Q>
where
    Q: TaskQueue + 'static,
{
    async fn run(&self) {
        info!("Job worker {} started", self.worker_id);

        loop {
            match self.queue.dequeue().await {
                Ok(job) => self.process_job(job).await,
                Err(QueueError::Closed) => {
                    info!("Job worker {} stopping, queue closed", self.worker_id);
                    return;
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
