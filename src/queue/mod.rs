// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供本地工作器后端使用的进程内任务队列和进度存储
pub mod progress_store;
pub mod task_queue;
