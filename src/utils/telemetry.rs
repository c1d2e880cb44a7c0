// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,jobrelay=debug";

/// 初始化日志
///
/// 过滤规则取自 `RUST_LOG`，未设置时使用 `info,jobrelay=debug`。
/// `JOBRELAY_LOG_FORMAT=json` 时输出 JSON 行。重复调用不会 panic。
///
/// # 返回值
///
/// * `true` - 本次调用安装了全局订阅器
/// * `false` - 已存在全局订阅器
pub fn init_telemetry() -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());
    let json = std::env::var("JOBRELAY_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    installed.is_ok()
}
