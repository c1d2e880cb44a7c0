// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, gauge};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// 熔断器配置
#[derive(Clone, Debug)]
pub struct CircuitConfig {
    /// 失败阈值
    pub failure_threshold: u32,
    /// 恢复超时时间
    pub recovery_timeout: Duration,
    /// 失败时间窗口
    pub failure_window: Duration,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            failure_window: Duration::from_secs(60),
        }
    }
}

/// 熔断器状态
#[derive(Clone, Debug)]
struct CircuitState {
    status: Status,
    failure_timestamps: VecDeque<Instant>,
    last_failure: Option<Instant>,
    total_requests: u64,
    total_failures: u64,
    total_successes: u64,
}

impl CircuitState {
    fn closed() -> Self {
        Self {
            status: Status::Closed,
            failure_timestamps: VecDeque::new(),
            last_failure: None,
            total_requests: 0,
            total_failures: 0,
            total_successes: 0,
        }
    }
}

/// 熔断器状态枚举
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    /// 关闭状态
    Closed,
    /// 打开状态
    Open,
    /// 半开状态
    HalfOpen,
}

/// 熔断器统计信息
#[derive(Clone, Debug, Default)]
pub struct CircuitStats {
    /// 是否处于打开状态
    pub is_open: bool,
    /// 时间窗口内的失败次数
    pub failure_count: u32,
    /// 总请求数
    pub total_requests: u64,
    /// 总失败数
    pub total_failures: u64,
    /// 总成功数
    pub total_successes: u64,
}

/// 熔断器
///
/// 按远程后端名称独立计数。持续故障的远程后端会进入打开状态，
/// 打开时以 ERROR 日志和 `circuit_breaker_status` 指标告警，
/// 而不是在每次调用中静默回退。
#[derive(Clone)]
pub struct CircuitBreaker {
    states: Arc<RwLock<HashMap<String, CircuitState>>>,
    config: CircuitConfig,
}

impl CircuitBreaker {
    /// 使用指定配置创建熔断器实例
    pub fn with_default_config(config: CircuitConfig) -> Self {
        Self {
            states: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// 检查熔断器是否打开
    ///
    /// 打开状态超过恢复超时后转为半开，放行下一次请求
    ///
    /// # 参数
    ///
    /// * `backend` - 后端名称
    pub fn is_open(&self, backend: &str) -> bool {
        let mut states = self.states.write();
        let state = states
            .entry(backend.to_string())
            .or_insert_with(CircuitState::closed);

        match state.status {
            Status::Closed | Status::HalfOpen => false,
            Status::Open => {
                if let Some(last_failure) = state.last_failure {
                    if last_failure.elapsed() >= self.config.recovery_timeout {
                        state.status = Status::HalfOpen;
                        info!(backend, "Circuit half-open, probing remote backend");
                        update_status_metric(backend, Status::HalfOpen);
                        return false;
                    }
                }
                counter!("circuit_breaker_rejected_total", "backend" => backend.to_string())
                    .increment(1);
                true
            }
        }
    }

    /// 记录成功
    pub fn record_success(&self, backend: &str) {
        let mut states = self.states.write();
        let state = states
            .entry(backend.to_string())
            .or_insert_with(CircuitState::closed);

        state.total_requests += 1;
        state.total_successes += 1;
        counter!("circuit_breaker_successes_total", "backend" => backend.to_string()).increment(1);

        if state.status == Status::HalfOpen {
            state.status = Status::Closed;
            state.failure_timestamps.clear();
            info!(backend, "Circuit closed, remote backend recovered");
            update_status_metric(backend, Status::Closed);
        }
    }

    /// 记录失败
    pub fn record_failure(&self, backend: &str) {
        let mut states = self.states.write();
        let state = states
            .entry(backend.to_string())
            .or_insert_with(CircuitState::closed);

        let now = Instant::now();
        state.total_requests += 1;
        state.total_failures += 1;
        state.last_failure = Some(now);
        state.failure_timestamps.push_back(now);

        // 移除超出时间窗口的失败记录
        while let Some(front) = state.failure_timestamps.front() {
            if now.duration_since(*front) > self.config.failure_window {
                state.failure_timestamps.pop_front();
            } else {
                break;
            }
        }

        counter!("circuit_breaker_failures_total", "backend" => backend.to_string()).increment(1);

        let should_open = match state.status {
            Status::Closed => {
                state.failure_timestamps.len() >= self.config.failure_threshold as usize
            }
            Status::HalfOpen => true,
            Status::Open => false,
        };

        if should_open {
            state.status = Status::Open;
            error!(
                backend,
                failures = state.failure_timestamps.len(),
                "Circuit opened, remote backend is failing persistently"
            );
            update_status_metric(backend, Status::Open);
        }
    }

    /// 获取后端的熔断统计信息
    pub fn stats(&self, backend: &str) -> CircuitStats {
        let states = self.states.read();
        match states.get(backend) {
            Some(state) => CircuitStats {
                is_open: state.status == Status::Open,
                failure_count: state.failure_timestamps.len() as u32,
                total_requests: state.total_requests,
                total_failures: state.total_failures,
                total_successes: state.total_successes,
            },
            None => CircuitStats::default(),
        }
    }
}

fn update_status_metric(backend: &str, status: Status) {
    let val = match status {
        Status::Closed => 0.0,
        Status::Open => 1.0,
        Status::HalfOpen => 0.5,
    };
    gauge!("circuit_breaker_status", "backend" => backend.to_string()).set(val);
}
