// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::{DispatchResult, JobRequest, ProgressRecord};
use crate::queue::task_queue::QueueError;
use crate::utils::errors::RemoteError;
use async_trait::async_trait;
use serde_json::Value;

/// 远程后端特质
///
/// 返回未经归一化的原始响应，字段拼写由调用方交给结果归一器处理
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// 提交任务
    async fn submit_remote(&self, request: &JobRequest) -> Result<Value, RemoteError>;

    /// 查询任务状态，404 映射为 `RemoteError::NotFound`
    async fn query_remote(&self, task_id: &str) -> Result<Value, RemoteError>;

    /// 后端名称，用于日志和熔断器
    fn name(&self) -> &str;
}

/// 本地后端特质
///
/// 兜底后端：查询永不失败，提交只在队列不可达时失败
#[async_trait]
pub trait LocalBackend: Send + Sync {
    /// 提交任务到本地队列
    async fn submit_local(&self, request: JobRequest) -> Result<DispatchResult, QueueError>;

    /// 查询本地任务进度，未知任务返回等待中
    async fn query_local(&self, task_id: &str) -> ProgressRecord;
}
