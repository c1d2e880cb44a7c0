// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 装配作业域、后端和工作器池的编排器
pub mod application;

/// 后端模块
///
/// 远程HTTP后端、本地工作器后端和熔断器
pub mod backends;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含任务模型、作业域、结果归一器和状态聚合器
pub mod domain;

/// 队列模块
///
/// 进程内任务队列和任务进度存储
pub mod queue;

/// 工具模块
///
/// 错误类型和日志初始化
pub mod utils;

/// 工作器模块
///
/// 实现本地任务执行和工作器管理
pub mod workers;
