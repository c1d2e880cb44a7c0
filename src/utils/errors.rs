// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::task_queue::QueueError;
use thiserror::Error;

/// 远程后端错误类型
///
/// `NotFound` 只表示"该后端不拥有此任务"，状态聚合器据此静默地继续查询下一个后端；
/// 其余变体都表示后端本身出了问题。
#[derive(Error, Debug)]
pub enum RemoteError {
    /// 远程后端不认识该任务 (HTTP 404)
    #[error("Task not found on remote backend: {0}")]
    NotFound(String),

    /// 远程后端返回了错误状态码
    #[error("Remote backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 网络层错误，包括连接失败和超时
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 响应体无法解析为约定的结构
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// 熔断器处于打开状态，请求未发出
    #[error("Circuit open for backend {0}")]
    CircuitOpen(String),

    /// 远程后端配置无效
    #[error("Invalid remote configuration: {0}")]
    InvalidConfig(String),
}

impl RemoteError {
    /// 是否为"任务不属于该后端"
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }

    /// 是否应计入熔断器的失败次数
    pub fn counts_as_failure(&self) -> bool {
        match self {
            RemoteError::NotFound(_) | RemoteError::CircuitOpen(_) => false,
            RemoteError::Status { .. }
            | RemoteError::Transport(_)
            | RemoteError::Malformed(_)
            | RemoteError::InvalidConfig(_) => true,
        }
    }
}

/// 任务编排错误类型
///
/// 提交路径上唯一会暴露给调用方的错误。状态查询从不返回错误。
#[derive(Error, Debug)]
pub enum TaskError {
    /// 调用方输入无效，对应 4xx
    #[error("Validation error: {0}")]
    Validation(String),

    /// 远程后端失败且未启用本地回退，对应 5xx
    #[error("Remote backend for domain '{domain}' unavailable: {source}")]
    RemoteUnavailable {
        domain: String,
        #[source]
        source: RemoteError,
    },

    /// 本地工作队列不可达
    #[error("Local queue error: {0}")]
    Queue(#[from] QueueError),
}

impl TaskError {
    /// 是否为调用方错误
    pub fn is_client_error(&self) -> bool {
        matches!(self, TaskError::Validation(_))
    }
}
