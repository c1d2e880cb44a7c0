// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::progress_store::ProgressStore;
use crate::queue::task_queue::TaskQueue;
use crate::workers::executor::ExecutorRegistry;
use crate::workers::expiration_worker::ExpirationWorker;
use crate::workers::job_worker::JobWorker;
use crate::workers::worker::Worker;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{info, warn};

/// 关闭时未结束任务的失败说明
pub const SHUTDOWN_MESSAGE: &str = "Worker shut down";

/// 工作管理器
///
/// 管理本地工作器池和结果过期清理工作器的生命周期
pub struct WorkerManager<Q>
where
    Q: TaskQueue + 'static,
{
    queue: Arc<Q>,
    store: Arc<ProgressStore>,
    executors: Arc<ExecutorRegistry>,
    in_flight: Arc<DashMap<String, AbortHandle>>,
    handles: Vec<JoinHandle<()>>,
}

impl<Q> WorkerManager<Q>
where
    Q: TaskQueue + 'static,
{
    pub fn new(queue: Arc<Q>, store: Arc<ProgressStore>, executors: Arc<ExecutorRegistry>) -> Self {
        Self {
            queue,
            store,
            executors,
            in_flight: Arc::new(DashMap::new()),
            handles: Vec::new(),
        }
    }

    /// 启动作业工作器
    ///
    /// 创建并启动指定数量的作业工作器，至少一个
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作器数量
    pub fn start_workers(&mut self, count: usize) {
        for _ in 0..count.max(1) {
            let worker = JobWorker::new(
                self.queue.clone(),
                self.store.clone(),
                self.executors.clone(),
                self.in_flight.clone(),
            );
            self.spawn(worker);
        }
        info!("Started {} job workers", count.max(1));
    }

    /// 启动结果过期清理工作器
    pub fn start_expiration_worker(&mut self, ttl: Duration, interval: Duration) {
        let worker = ExpirationWorker::new(self.store.clone(), ttl, interval);
        self.spawn(worker);
    }

    fn spawn<W: Worker + 'static>(&mut self, worker: W) {
        let handle = tokio::spawn(async move {
            worker.run().await;
            info!("Worker {} exited", worker.name());
        });
        self.handles.push(handle);
    }

    /// 关闭队列并停止所有工作器
    ///
    /// 先停止工作器循环，再中止正在执行的任务。排队中和执行中的任务
    /// 都被标记为失败，说明为 [`SHUTDOWN_MESSAGE`]；关闭后新的本地提交会失败。
    pub async fn shutdown(&mut self) {
        info!("Shutting down workers...");
        self.queue.close().await;

        for handle in self.handles.drain(..) {
            handle.abort();
            // 等待循环真正退出，之后不会再有新的执行任务登记
            let _ = handle.await;
        }

        for entry in self.in_flight.iter() {
            entry.value().abort();
        }
        self.in_flight.clear();

        let failed = self.store.fail_unfinished(SHUTDOWN_MESSAGE);
        if failed > 0 {
            warn!(failed, "Unfinished local tasks marked as failed on shutdown");
        }

        info!("Workers shut down successfully");
    }
}
