// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::backends::circuit_breaker::CircuitBreaker;
use crate::backends::local::LocalWorkerBackend;
use crate::backends::remote_client::RemoteBackendClient;
use crate::backends::traits::LocalBackend;
use crate::config::settings::{BackendConfig, Settings};
use crate::domain::models::{DispatchResult, DomainProfile, ProgressRecord};
use crate::domain::services::{StatusAggregator, TaskDomain};
use crate::queue::progress_store::ProgressStore;
use crate::queue::task_queue::LocalTaskQueue;
use crate::utils::errors::TaskError;
use crate::workers::executor::ExecutorRegistry;
use crate::workers::manager::WorkerManager;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// 任务编排器
///
/// 进程内唯一的入口：持有所有作业域、状态聚合器和本地工作器池。
/// 作业域按优先级排列，爬虫在前，文本分析在后。
pub struct TaskOrchestrator {
    domains: Vec<Arc<TaskDomain>>,
    aggregator: StatusAggregator,
    workers: Mutex<WorkerManager<LocalTaskQueue>>,
}

impl TaskOrchestrator {
    /// 按配置启动编排器
    ///
    /// 必须在 tokio 运行时内调用，本地工作器和过期清理工作器会立即启动
    ///
    /// # 参数
    ///
    /// * `settings` - 应用配置
    /// * `executors` - 本地任务执行器注册表
    ///
    /// # 返回值
    ///
    /// * `Ok(TaskOrchestrator)` - 启动完成
    /// * `Err(anyhow::Error)` - 远程后端配置无效
    pub fn start(settings: &Settings, executors: ExecutorRegistry) -> anyhow::Result<Self> {
        let circuit_breaker = settings.circuit_breaker.enabled.then(|| {
            Arc::new(CircuitBreaker::with_default_config(
                settings.circuit_breaker.to_circuit_config(),
            ))
        });

        let store = Arc::new(ProgressStore::new());
        let queue = Arc::new(LocalTaskQueue::new(settings.local_worker.queue_capacity));
        let local: Arc<dyn LocalBackend> =
            Arc::new(LocalWorkerBackend::new(queue.clone(), store.clone()));

        let domains = vec![
            Arc::new(build_domain(
                DomainProfile::crawl(),
                &settings.crawl,
                local.clone(),
                circuit_breaker.clone(),
            )?),
            Arc::new(build_domain(
                DomainProfile::analysis(),
                &settings.analysis,
                local.clone(),
                circuit_breaker,
            )?),
        ];

        for domain in &domains {
            info!(
                domain = domain.name(),
                remote = domain.remote_name().unwrap_or("disabled"),
                "Task domain ready"
            );
        }

        let mut workers = WorkerManager::new(queue, store, Arc::new(executors));
        workers.start_workers(settings.local_worker.concurrency);
        workers.start_expiration_worker(
            settings.local_worker.result_ttl(),
            settings.local_worker.sweep_interval(),
        );

        Ok(Self {
            aggregator: StatusAggregator::new(domains.clone(), local),
            domains,
            workers: Mutex::new(workers),
        })
    }

    /// 按名称查找作业域
    pub fn domain(&self, name: &str) -> Option<&Arc<TaskDomain>> {
        self.domains.iter().find(|domain| domain.name() == name)
    }

    /// 向指定作业域提交任务
    ///
    /// # 返回值
    ///
    /// * `Err(TaskError::Validation)` - 作业域不存在或参数不合法
    /// * 其余同 [`TaskDomain::submit`]
    pub async fn submit(
        &self,
        domain: &str,
        kind: &str,
        keyword: &str,
        page_count: i64,
        item_limit: i64,
    ) -> Result<DispatchResult, TaskError> {
        let target = self
            .domain(domain)
            .ok_or_else(|| TaskError::Validation(format!("unknown task domain '{}'", domain)))?;
        target.submit(kind, keyword, page_count, item_limit).await
    }

    /// 查询任务进度，永不失败
    pub async fn query_progress(&self, task_id: &str) -> ProgressRecord {
        self.aggregator.query_progress(task_id).await
    }

    /// 停止本地工作器池，未结束的本地任务标记为失败，之后的本地提交返回队列错误
    pub async fn shutdown(&self) {
        self.workers.lock().await.shutdown().await;
    }
}

fn build_domain(
    profile: DomainProfile,
    config: &BackendConfig,
    local: Arc<dyn LocalBackend>,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
) -> anyhow::Result<TaskDomain> {
    let remote_name = format!("{}-remote", profile.name());
    let mut domain = TaskDomain::new(profile, config.clone(), local);

    if config.remote_enabled {
        let client = RemoteBackendClient::new(remote_name, config)?;
        domain = domain.with_remote(Arc::new(client));
    }
    if let Some(cb) = circuit_breaker {
        domain = domain.with_circuit_breaker(cb);
    }
    Ok(domain)
}
