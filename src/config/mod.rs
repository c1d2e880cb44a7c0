// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理编排层的配置设置，包括各作业域的远程后端、本地工作器和熔断器配置
pub mod settings;
