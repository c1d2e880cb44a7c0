// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 负责按配置装配作业域、后端和本地工作器池，对外暴露统一的提交和查询入口
pub mod orchestrator;

pub use orchestrator::TaskOrchestrator;
