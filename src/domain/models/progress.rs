// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// 未知任务的说明文字
pub const PENDING_MESSAGE: &str = "Task is waiting...";
/// 成功任务的说明文字
pub const COMPLETED_MESSAGE: &str = "Task completed";

/// 任务状态枚举
///
/// 序列化为路由层约定的 `PENDING`/`PROGRESS`/`SUCCESS`/`FAILURE`。
/// 状态转换遵循以下流程：
/// Pending → Running → Succeeded/Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskState {
    /// 已接收，尚未开始
    #[serde(rename = "PENDING")]
    Pending,
    /// 执行中
    #[serde(rename = "PROGRESS")]
    Running,
    /// 成功（终态）
    #[serde(rename = "SUCCESS")]
    Succeeded,
    /// 失败（终态）
    #[serde(rename = "FAILURE")]
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        match self {
            TaskState::Succeeded | TaskState::Failed => true,
            TaskState::Pending | TaskState::Running => false,
        }
    }

    /// 解析远程后端上报的状态字符串
    ///
    /// 兼容 Celery 的中间态命名，无法识别时返回 `None`。
    pub fn parse_remote(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(TaskState::Pending),
            "PROGRESS" | "STARTED" | "RUNNING" | "RETRY" => Some(TaskState::Running),
            "SUCCESS" | "SUCCEEDED" => Some(TaskState::Succeeded),
            "FAILURE" | "FAILED" | "REVOKED" => Some(TaskState::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskState::Pending => write!(f, "PENDING"),
            TaskState::Running => write!(f, "PROGRESS"),
            TaskState::Succeeded => write!(f, "SUCCESS"),
            TaskState::Failed => write!(f, "FAILURE"),
        }
    }
}

/// 进度记录
///
/// 每次轮询临时生成，不做持久化。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressRecord {
    pub task_id: String,
    pub state: TaskState,
    #[serde(rename = "progress")]
    pub progress_percent: u8,
    pub message: String,
    /// 仅在 `Succeeded` 时存在
    #[serde(serialize_with = "serialize_result")]
    pub result: Option<Value>,
}

fn serialize_result<S: Serializer>(result: &Option<Value>, serializer: S) -> Result<S::Ok, S::Error> {
    match result {
        Some(value) => value.serialize(serializer),
        None => Map::new().serialize(serializer),
    }
}

impl ProgressRecord {
    /// 本地后端不认识的任务：等待中、进度为 0
    pub fn unknown(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            state: TaskState::Pending,
            progress_percent: 0,
            message: PENDING_MESSAGE.to_string(),
            result: None,
        }
    }
}

/// 本地任务进度状态机
///
/// 终态之后不接受任何转换；执行中的百分比不会倒退。
#[derive(Debug, Clone, PartialEq)]
pub enum JobProgress {
    Pending,
    Running {
        current: u64,
        total: u64,
        message: String,
    },
    Succeeded {
        result: Value,
    },
    Failed {
        error: String,
    },
}

impl JobProgress {
    /// `floor(current / max(total, 1) * 100)`，上限 100
    pub fn percent(&self) -> u8 {
        match self {
            JobProgress::Pending | JobProgress::Failed { .. } => 0,
            JobProgress::Running { current, total, .. } => {
                let pct = current.saturating_mul(100) / (*total).max(1);
                pct.min(100) as u8
            }
            JobProgress::Succeeded { .. } => 100,
        }
    }

    pub fn state(&self) -> TaskState {
        match self {
            JobProgress::Pending => TaskState::Pending,
            JobProgress::Running { .. } => TaskState::Running,
            JobProgress::Succeeded { .. } => TaskState::Succeeded,
            JobProgress::Failed { .. } => TaskState::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// 尝试转换到下一个状态
    ///
    /// # 返回值
    ///
    /// 转换被接受时返回 true；被拒绝时状态保持不变并返回 false
    pub fn advance(&mut self, next: JobProgress) -> bool {
        let accepted = match (&*self, &next) {
            (JobProgress::Succeeded { .. } | JobProgress::Failed { .. }, _) => false,
            (_, JobProgress::Pending) => false,
            (JobProgress::Pending, _) => true,
            (JobProgress::Running { .. }, JobProgress::Running { .. }) => {
                next.percent() >= self.percent()
            }
            (JobProgress::Running { .. }, JobProgress::Succeeded { .. } | JobProgress::Failed { .. }) => {
                true
            }
        };

        if accepted {
            *self = next;
        }
        accepted
    }

    /// 生成对外的进度记录
    pub fn to_record(&self, task_id: &str) -> ProgressRecord {
        let (message, result) = match self {
            JobProgress::Pending => (PENDING_MESSAGE.to_string(), None),
            JobProgress::Running { message, .. } => (message.clone(), None),
            JobProgress::Succeeded { result } => (COMPLETED_MESSAGE.to_string(), Some(result.clone())),
            JobProgress::Failed { error } => (error.clone(), None),
        };

        ProgressRecord {
            task_id: task_id.to_string(),
            state: self.state(),
            progress_percent: self.percent(),
            message,
            result,
        }
    }
}
