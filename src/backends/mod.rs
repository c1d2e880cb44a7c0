// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 后端模块
///
/// 实现任务的两类执行后端：
/// - 远程后端（remote_client）：通过HTTP访问外部任务执行服务
/// - 本地后端（local）：进程内队列和工作器池
///
/// 以及保护远程后端的熔断器（circuit_breaker）
pub mod circuit_breaker;
pub mod local;
pub mod remote_client;
pub mod traits;

pub use local::LocalWorkerBackend;
pub use remote_client::RemoteBackendClient;
pub use traits::{LocalBackend, RemoteBackend};
