// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含编排层的核心业务逻辑，包括：
/// - 领域模型（models）：作业请求、提交结果和进度记录
/// - 服务（services）：作业域分发、结果归一化和状态聚合
pub mod models;
pub mod services;
