// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::progress_store::ProgressStore;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 任务结果过期清理工作器
///
/// 定期清理超过保留时间的终态任务，被清理的任务之后按未知任务处理
pub struct ExpirationWorker {
    store: Arc<ProgressStore>,
    ttl: Duration,
    interval: Duration,
}

impl ExpirationWorker {
    pub fn new(store: Arc<ProgressStore>, ttl: Duration, interval: Duration) -> Self {
        Self {
            store,
            ttl,
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    /// 执行一次清理，返回被清理的任务数量
    pub fn sweep(&self) -> usize {
        match chrono::Duration::from_std(self.ttl) {
            Ok(ttl) => self.store.evict_expired(ttl),
            Err(e) => {
                warn!("Result TTL out of range, skipping sweep: {}", e);
                0
            }
        }
    }
}

#[async_trait]
impl Worker for ExpirationWorker {
    async fn run(&self) {
        info!("Result expiration worker started");

        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;

            let count = self.sweep();
            if count > 0 {
                info!("Evicted {} expired task results", count);
            }
        }
    }

    fn name(&self) -> &str {
        "expiration-worker"
    }
}

#[cfg(test)]
#[path = "expiration_worker_test.rs"]
mod tests;
