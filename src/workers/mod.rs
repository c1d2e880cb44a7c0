// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供本地后台任务处理和工作器管理功能
/// 包括执行器注册、作业执行、结果过期清理和工作器生命周期管理
pub mod executor;
pub mod expiration_worker;
pub mod job_worker;
pub mod manager;
pub mod worker;

pub use executor::{ExecutorRegistry, JobExecutor, ProgressReporter};
pub use worker::Worker;
