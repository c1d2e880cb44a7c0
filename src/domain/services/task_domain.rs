// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::backends::circuit_breaker::CircuitBreaker;
use crate::backends::traits::{LocalBackend, RemoteBackend};
use crate::config::settings::BackendConfig;
use crate::domain::models::{DispatchResult, DomainProfile, JobRequest, ProgressRecord};
use crate::domain::services::result_normalizer::{normalize_dispatch, normalize_progress};
use crate::utils::errors::{RemoteError, TaskError};
use metrics::counter;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 作业域
///
/// 每个作业域（爬虫、文本分析……）一个实例，各自持有后端配置、远程客户端和本地后端。
/// 负责提交时的参数归一化、后端选择和回退策略。
pub struct TaskDomain {
    profile: DomainProfile,
    config: BackendConfig,
    remote: Option<Arc<dyn RemoteBackend>>,
    local: Arc<dyn LocalBackend>,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
}

impl TaskDomain {
    /// 创建只带本地后端的作业域
    pub fn new(profile: DomainProfile, config: BackendConfig, local: Arc<dyn LocalBackend>) -> Self {
        Self {
            profile,
            config,
            remote: None,
            local,
            circuit_breaker: None,
        }
    }

    /// 挂接远程后端，是否使用仍由 `remote_enabled` 决定
    pub fn with_remote(mut self, remote: Arc<dyn RemoteBackend>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = Some(circuit_breaker);
        self
    }

    pub fn name(&self) -> &str {
        self.profile.name()
    }

    /// 已启用的远程后端
    fn active_remote(&self) -> Option<&Arc<dyn RemoteBackend>> {
        self.remote.as_ref().filter(|_| self.config.remote_enabled)
    }

    /// 已启用的远程后端名称
    pub fn remote_name(&self) -> Option<&str> {
        self.active_remote().map(|remote| remote.name())
    }

    /// 提交任务
    ///
    /// # 参数
    ///
    /// * `kind` - 任务类型，无法识别时使用作业域默认类型
    /// * `keyword` - 关键词
    /// * `page_count` - 页数，饱和到 [1, 10]
    /// * `item_limit` - 条目数，饱和到 [1, 100]
    ///
    /// # 返回值
    ///
    /// * `Ok(DispatchResult)` - 远程或本地后端接收了任务
    /// * `Err(TaskError::Validation)` - 需要关键词的任务关键词为空
    /// * `Err(TaskError::RemoteUnavailable)` - 远程失败且未启用回退
    /// * `Err(TaskError::Queue)` - 本地队列不可达
    #[instrument(skip(self), fields(domain = %self.name()))]
    pub async fn submit(
        &self,
        kind: &str,
        keyword: &str,
        page_count: i64,
        item_limit: i64,
    ) -> Result<DispatchResult, TaskError> {
        let request = JobRequest::build(&self.profile, kind, keyword, page_count, item_limit)?;

        if let Some(remote) = self.active_remote() {
            match self.submit_remote(remote.as_ref(), &request).await {
                Ok(result) => {
                    info!(task_id = %result.task_id, backend = remote.name(), "Job dispatched to remote backend");
                    counter!("jobrelay_dispatch_total", "domain" => self.name().to_string(), "backend" => "remote")
                        .increment(1);
                    return Ok(result);
                }
                Err(e) if self.config.fallback_to_local_on_error => {
                    warn!(backend = remote.name(), error = %e, "Remote backend unavailable, falling back to local worker");
                    counter!("jobrelay_dispatch_fallback_total", "domain" => self.name().to_string())
                        .increment(1);
                }
                Err(e) => {
                    warn!(backend = remote.name(), error = %e, "Remote backend unavailable and fallback disabled");
                    return Err(TaskError::RemoteUnavailable {
                        domain: self.name().to_string(),
                        source: e,
                    });
                }
            }
        }

        let result = self.local.submit_local(request).await?;
        info!(task_id = %result.task_id, "Job dispatched to local worker");
        counter!("jobrelay_dispatch_total", "domain" => self.name().to_string(), "backend" => "local")
            .increment(1);
        Ok(result)
    }

    async fn submit_remote(
        &self,
        remote: &dyn RemoteBackend,
        request: &JobRequest,
    ) -> Result<DispatchResult, RemoteError> {
        self.check_circuit(remote)?;

        let outcome = match remote.submit_remote(request).await {
            Ok(raw) => normalize_dispatch(&raw, request, &self.profile),
            Err(e) => Err(e),
        };
        self.record_outcome(remote, &outcome);
        outcome
    }

    /// 向远程后端查询任务状态
    ///
    /// # 返回值
    ///
    /// * `None` - 本域未启用远程后端
    /// * `Some(Ok(ProgressRecord))` - 远程后端认领了该任务
    /// * `Some(Err(RemoteError))` - 未找到、熔断或后端故障
    pub async fn query_remote(&self, task_id: &str) -> Option<Result<ProgressRecord, RemoteError>> {
        let remote = self.active_remote()?;

        if let Err(e) = self.check_circuit(remote.as_ref()) {
            return Some(Err(e));
        }

        let outcome = match remote.query_remote(task_id).await {
            Ok(raw) => normalize_progress(&raw, task_id),
            Err(e) => Err(e),
        };
        self.record_outcome(remote.as_ref(), &outcome);
        Some(outcome)
    }

    fn check_circuit(&self, remote: &dyn RemoteBackend) -> Result<(), RemoteError> {
        match &self.circuit_breaker {
            Some(cb) if cb.is_open(remote.name()) => {
                Err(RemoteError::CircuitOpen(remote.name().to_string()))
            }
            _ => Ok(()),
        }
    }

    fn record_outcome<T>(&self, remote: &dyn RemoteBackend, outcome: &Result<T, RemoteError>) {
        let Some(cb) = &self.circuit_breaker else {
            return;
        };
        match outcome {
            Err(e) if e.counts_as_failure() => cb.record_failure(remote.name()),
            Err(RemoteError::CircuitOpen(_)) => {}
            Ok(_) | Err(_) => cb.record_success(remote.name()),
        }
    }
}
