// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use jobrelay::backends::local::LocalWorkerBackend;
use jobrelay::config::settings::BackendConfig;
use jobrelay::domain::models::{JobRequest, ProgressRecord};
use jobrelay::queue::progress_store::ProgressStore;
use jobrelay::queue::task_queue::LocalTaskQueue;
use jobrelay::workers::executor::{JobExecutor, ProgressReporter};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// 远程后端配置
#[allow(dead_code)]
pub fn backend_config(base_url: &str, remote_enabled: bool, fallback: bool) -> BackendConfig {
    BackendConfig {
        remote_enabled,
        remote_base_url: base_url.to_string(),
        remote_timeout_secs: 2,
        fallback_to_local_on_error: fallback,
        auth_token: None,
    }
}

/// 不启动工作器的本地后端，任务停留在等待中
#[allow(dead_code)]
pub struct IdleLocal {
    pub backend: Arc<LocalWorkerBackend<LocalTaskQueue>>,
    pub store: Arc<ProgressStore>,
    pub queue: Arc<LocalTaskQueue>,
}

#[allow(dead_code)]
pub fn idle_local() -> IdleLocal {
    let store = Arc::new(ProgressStore::new());
    let queue = Arc::new(LocalTaskQueue::new(16));
    let backend = Arc::new(LocalWorkerBackend::new(queue.clone(), store.clone()));
    IdleLocal {
        backend,
        store,
        queue,
    }
}

/// 分两步上报进度后返回固定结果的执行器
pub struct StubExecutor;

#[async_trait]
impl JobExecutor for StubExecutor {
    async fn execute(&self, request: &JobRequest, progress: ProgressReporter) -> anyhow::Result<Value> {
        let pages = u64::from(request.page_count());
        for page in 1..=pages {
            progress.report(page, pages, format!("Crawled page {}/{}", page, pages));
        }
        Ok(json!({"pages": pages, "keyword": request.keyword()}))
    }
}

/// 总是失败的执行器
pub struct FailingExecutor;

#[async_trait]
impl JobExecutor for FailingExecutor {
    async fn execute(&self, _request: &JobRequest, _progress: ProgressReporter) -> anyhow::Result<Value> {
        anyhow::bail!("upstream site returned captcha")
    }
}

/// 轮询直到任务进入终态
#[allow(dead_code)]
pub async fn wait_for_terminal<F, Fut>(mut poll: F) -> ProgressRecord
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ProgressRecord>,
{
    let mut record = poll().await;
    for _ in 0..200 {
        if record.state.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        record = poll().await;
    }
    record
}

/// 执行中 panic 的执行器
pub struct PanickingExecutor;

#[async_trait]
impl JobExecutor for PanickingExecutor {
    async fn execute(&self, _request: &JobRequest, progress: ProgressReporter) -> anyhow::Result<Value> {
        progress.report(1, 2, "Halfway");
        panic!("parser state corrupted");
    }
}

/// 上报一半进度后长时间运行的执行器，完成时置位 `finished`
pub struct SlowExecutor {
    pub delay: Duration,
    pub finished: Arc<std::sync::atomic::AtomicBool>,
}

#[async_trait]
impl JobExecutor for SlowExecutor {
    async fn execute(&self, _request: &JobRequest, progress: ProgressReporter) -> anyhow::Result<Value> {
        progress.report(1, 2, "Halfway");
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(json!({"done": true}))
    }
}
