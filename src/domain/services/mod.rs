// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// - 作业域（task_domain）：参数归一化、后端选择和回退策略
/// - 结果归一器（result_normalizer）：统一远程响应的字段拼写
/// - 状态聚合器（status_aggregator）：按优先级级联查询任务状态
pub mod result_normalizer;
pub mod status_aggregator;
pub mod task_domain;

pub use status_aggregator::StatusAggregator;
pub use task_domain::TaskDomain;
