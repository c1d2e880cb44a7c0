// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::backends::traits::LocalBackend;
use crate::domain::models::{BackendKind, DispatchResult, JobRequest, ProgressRecord};
use crate::queue::progress_store::ProgressStore;
use crate::queue::task_queue::{QueueError, QueuedJob, TaskQueue};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// 本地工作器后端
///
/// 把任务放入进程内队列，由 [`crate::workers::manager::WorkerManager`] 启动的工作器执行。
/// 它是状态查询的最后兜底，查询永远不会失败。
pub struct LocalWorkerBackend<Q>
where
    Q: TaskQueue,
{
    queue: Arc<Q>,
    store: Arc<ProgressStore>,
}

impl<Q> LocalWorkerBackend<Q>
where
    Q: TaskQueue,
{
    pub fn new(queue: Arc<Q>, store: Arc<ProgressStore>) -> Self {
        Self { queue, store }
    }
}

#[async_trait]
impl<Q> LocalBackend for LocalWorkerBackend<Q>
where
    Q: TaskQueue,
{
    async fn submit_local(&self, request: JobRequest) -> Result<DispatchResult, QueueError> {
        let task_id = Uuid::new_v4().to_string();
        self.store.register(&task_id);

        let job = QueuedJob {
            task_id: task_id.clone(),
            request: request.clone(),
        };
        if let Err(e) = self.queue.enqueue(job).await {
            error!(task_id = %task_id, "Local worker queue unreachable: {}", e);
            self.store.remove(&task_id);
            return Err(e);
        }

        debug!(task_id = %task_id, kind = %request.kind(), "Job queued locally");
        Ok(DispatchResult::from_request(task_id, &request, BackendKind::Local))
    }

    async fn query_local(&self, task_id: &str) -> ProgressRecord {
        self.store
            .snapshot(task_id)
            .unwrap_or_else(|| ProgressRecord::unknown(task_id))
    }
}
