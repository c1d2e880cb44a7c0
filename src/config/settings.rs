// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::backends::circuit_breaker::CircuitConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 进程启动时读取一次，运行期间不再变化
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 爬虫作业域后端配置
    pub crawl: BackendConfig,
    /// 文本分析作业域后端配置
    pub analysis: BackendConfig,
    /// 本地工作器配置
    pub local_worker: LocalWorkerSettings,
    /// 熔断器配置
    pub circuit_breaker: CircuitBreakerSettings,
}

/// 单个作业域的后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// 是否启用远程后端
    pub remote_enabled: bool,
    /// 远程后端基础URL
    pub remote_base_url: String,
    /// 远程请求超时时间（秒）
    pub remote_timeout_secs: u64,
    /// 远程失败时是否回退到本地工作器
    pub fallback_to_local_on_error: bool,
    /// Bearer 令牌
    pub auth_token: Option<String>,
}

impl BackendConfig {
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    /// 去除空白后非空的令牌
    pub fn bearer_token(&self) -> Option<&str> {
        self.auth_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// 本地工作器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LocalWorkerSettings {
    /// 并发工作器数量
    pub concurrency: usize,
    /// 队列容量
    pub queue_capacity: usize,
    /// 终态任务结果保留时间（秒）
    pub result_ttl_secs: u64,
    /// 过期清理间隔（秒）
    pub sweep_interval_secs: u64,
}

impl LocalWorkerSettings {
    pub fn result_ttl(&self) -> Duration {
        Duration::from_secs(self.result_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// 熔断器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerSettings {
    /// 是否启用熔断器
    pub enabled: bool,
    /// 失败阈值
    pub failure_threshold: u32,
    /// 恢复超时时间（秒）
    pub recovery_timeout_secs: u64,
    /// 失败时间窗口（秒）
    pub failure_window_secs: u64,
}

impl CircuitBreakerSettings {
    pub fn to_circuit_config(&self) -> CircuitConfig {
        CircuitConfig {
            failure_threshold: self.failure_threshold,
            recovery_timeout: Duration::from_secs(self.recovery_timeout_secs),
            failure_window: Duration::from_secs(self.failure_window_secs),
        }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `JOBRELAY__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("JOBRELAY").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅使用内置默认值的配置，不读取文件和环境变量
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Crawl domain
            .set_default("crawl.remote_enabled", false)?
            .set_default("crawl.remote_base_url", "http://127.0.0.1:8090/api/spider")?
            .set_default("crawl.remote_timeout_secs", 10)?
            .set_default("crawl.fallback_to_local_on_error", true)?
            // Analysis domain
            .set_default("analysis.remote_enabled", false)?
            .set_default("analysis.remote_base_url", "http://127.0.0.1:8091/api/nlp")?
            .set_default("analysis.remote_timeout_secs", 10)?
            .set_default("analysis.fallback_to_local_on_error", true)?
            // Local worker
            .set_default("local_worker.concurrency", 4)?
            .set_default("local_worker.queue_capacity", 1024)?
            .set_default("local_worker.result_ttl_secs", 86400)?
            .set_default("local_worker.sweep_interval_secs", 300)?
            // Circuit breaker
            .set_default("circuit_breaker.enabled", true)?
            .set_default("circuit_breaker.failure_threshold", 5)?
            .set_default("circuit_breaker.recovery_timeout_secs", 30)?
            .set_default("circuit_breaker.failure_window_secs", 60)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
