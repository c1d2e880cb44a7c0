// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::{JobKind, JobProgress, JobRequest};
use crate::queue::progress_store::ProgressStore;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// 作业执行器特质
///
/// 具体的爬取或分析算法对编排层不透明，通过此特质挂接到本地工作器。
/// 返回值作为成功任务的结果；返回错误时任务进入失败状态，错误描述成为状态说明。
#[async_trait]
pub trait JobExecutor: Send + Sync {
    async fn execute(&self, request: &JobRequest, progress: ProgressReporter) -> Result<Value>;
}

/// 进度上报句柄
#[derive(Clone)]
pub struct ProgressReporter {
    task_id: String,
    store: Arc<ProgressStore>,
}

impl ProgressReporter {
    pub fn new(task_id: impl Into<String>, store: Arc<ProgressStore>) -> Self {
        Self {
            task_id: task_id.into(),
            store,
        }
    }

    /// 上报 `current`/`total` 计数
    ///
    /// 百分比倒退或任务已结束时更新被忽略并返回 false
    pub fn report(&self, current: u64, total: u64, message: impl Into<String>) -> bool {
        self.store.transition(
            &self.task_id,
            JobProgress::Running {
                current,
                total,
                message: message.into(),
            },
        )
    }
}

/// 执行器注册表
///
/// 按任务类型查找执行器
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<JobKind, Arc<dyn JobExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为一种任务类型注册执行器，已存在时覆盖
    pub fn register(mut self, kind: JobKind, executor: Arc<dyn JobExecutor>) -> Self {
        self.executors.insert(kind, executor);
        self
    }

    pub fn get(&self, kind: JobKind) -> Option<Arc<dyn JobExecutor>> {
        self.executors.get(&kind).cloned()
    }
}
