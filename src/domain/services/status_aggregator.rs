// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::backends::traits::LocalBackend;
use crate::domain::models::ProgressRecord;
use crate::domain::services::task_domain::TaskDomain;
use crate::utils::errors::RemoteError;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, warn};

/// 状态聚合器
///
/// 按固定优先级依次询问各作业域的远程后端，第一个认领任务的后端胜出；
/// 都不认领时由本地后端给出结果。新增作业域只需要在列表中追加一项。
pub struct StatusAggregator {
    domains: Vec<Arc<TaskDomain>>,
    local: Arc<dyn LocalBackend>,
}

impl StatusAggregator {
    /// # 参数
    ///
    /// * `domains` - 按优先级排列的作业域
    /// * `local` - 兜底的本地后端
    pub fn new(domains: Vec<Arc<TaskDomain>>, local: Arc<dyn LocalBackend>) -> Self {
        Self { domains, local }
    }

    /// 查询任务进度，永不失败
    ///
    /// 远程后端返回"未找到"时静默跳过；其他错误记 WARN 日志后同样跳过，
    /// 一个故障的远程后端不能挡住状态查询
    pub async fn query_progress(&self, task_id: &str) -> ProgressRecord {
        for domain in &self.domains {
            let Some(outcome) = domain.query_remote(task_id).await else {
                continue;
            };
            let backend = domain.remote_name().unwrap_or_default();

            match outcome {
                Ok(record) => {
                    debug!(task_id, domain = domain.name(), backend, state = %record.state, "Task claimed by remote backend");
                    return record;
                }
                Err(RemoteError::NotFound(_)) => {
                    debug!(task_id, domain = domain.name(), backend, "Task not owned by remote backend");
                }
                Err(RemoteError::CircuitOpen(_)) => {
                    debug!(task_id, domain = domain.name(), backend, "Circuit open, skipping remote backend");
                }
                Err(e) => {
                    warn!(task_id, domain = domain.name(), backend, error = %e, "Remote task status query failed");
                    counter!("jobrelay_status_remote_failures_total", "domain" => domain.name().to_string())
                        .increment(1);
                }
            }
        }

        self.local.query_local(task_id).await
    }
}
