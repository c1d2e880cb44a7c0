// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::{JobProgress, ProgressRecord};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

#[derive(Debug)]
struct ProgressEntry {
    progress: JobProgress,
    updated_at: DateTime<Utc>,
}

/// 本地任务进度存储
///
/// 同一任务的所有更新都经过其分片锁并由 [`JobProgress::advance`] 把关，
/// 因此对单个任务的读取是线性一致的；不同任务之间互不约束。
#[derive(Debug, Default)]
pub struct ProgressStore {
    entries: DashMap<String, ProgressEntry>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记新任务为等待中
    pub fn register(&self, task_id: &str) {
        self.entries.insert(
            task_id.to_string(),
            ProgressEntry {
                progress: JobProgress::Pending,
                updated_at: Utc::now(),
            },
        );
    }

    /// 推进任务状态
    ///
    /// # 返回值
    ///
    /// 任务存在且转换被接受时返回 true
    pub fn transition(&self, task_id: &str, next: JobProgress) -> bool {
        let Some(mut entry) = self.entries.get_mut(task_id) else {
            debug!(task_id, "Progress update for unknown task ignored");
            return false;
        };

        let accepted = entry.progress.advance(next);
        if accepted {
            entry.updated_at = Utc::now();
        } else {
            debug!(task_id, state = %entry.progress.state(), "Progress update rejected");
        }
        accepted
    }

    /// 当前进度快照
    pub fn snapshot(&self, task_id: &str) -> Option<ProgressRecord> {
        self.entries
            .get(task_id)
            .map(|entry| entry.progress.to_record(task_id))
    }

    pub fn remove(&self, task_id: &str) {
        self.entries.remove(task_id);
    }

    /// 清理更新时间早于 `ttl` 的终态任务
    ///
    /// # 返回值
    ///
    /// 被清理的任务数量
    pub fn evict_expired(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !(entry.progress.is_terminal() && entry.updated_at < cutoff));
        before.saturating_sub(self.entries.len())
    }

    /// 将所有未结束的任务标记为失败
    ///
    /// # 返回值
    ///
    /// 被标记的任务数量
    pub fn fail_unfinished(&self, error: &str) -> usize {
        let mut failed = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.progress.is_terminal() {
                continue;
            }
            let accepted = entry.progress.advance(JobProgress::Failed {
                error: error.to_string(),
            });
            if accepted {
                entry.updated_at = Utc::now();
                failed += 1;
            }
        }
        failed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
