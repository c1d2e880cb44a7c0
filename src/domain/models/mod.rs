// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了编排层的核心数据结构，包括：
/// - 作业请求（job）：任务类型、作业域与参数归一化
/// - 提交结果（dispatch）：提交成功后返回给调用方的任务句柄
/// - 进度记录（progress）：状态查询的统一输出与本地任务状态机
pub mod dispatch;
pub mod job;
pub mod progress;

pub use dispatch::{BackendKind, DispatchResult};
pub use job::{DomainProfile, JobKind, JobRequest};
pub use progress::{JobProgress, ProgressRecord, TaskState};
