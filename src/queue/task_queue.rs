// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::JobRequest;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

/// 队列错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// 队列已关闭，工作器池不可达
    #[error("Queue closed")]
    Closed,
}

/// 排队中的任务
#[derive(Debug, Clone)]
pub struct QueuedJob {
    /// 本地分配的任务ID
    pub task_id: String,
    /// 归一化后的请求
    pub request: JobRequest,
}

/// 任务队列特质
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// 入队任务
    async fn enqueue(&self, job: QueuedJob) -> Result<(), QueueError>;

    /// 出队任务，队列关闭且已取空时返回 `QueueError::Closed`
    async fn dequeue(&self) -> Result<QueuedJob, QueueError>;

    /// 关闭队列，之后的入队全部失败
    async fn close(&self);
}

/// 进程内有界任务队列
///
/// 多个生产者（提交）和多个消费者（工作器）共享同一通道；
/// 消费端通过互斥锁串行化 `recv`。所有克隆共享唯一的发送端，
/// 关闭时丢弃它，消费端取空剩余任务后收到 `Closed`。
#[derive(Clone)]
pub struct LocalTaskQueue {
    sender: Arc<RwLock<Option<mpsc::Sender<QueuedJob>>>>,
    receiver: Arc<Mutex<mpsc::Receiver<QueuedJob>>>,
}

impl LocalTaskQueue {
    /// 创建指定容量的队列
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender: Arc::new(RwLock::new(Some(sender))),
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }
}

#[async_trait]
impl TaskQueue for LocalTaskQueue {
    async fn enqueue(&self, job: QueuedJob) -> Result<(), QueueError> {
        let sender = self.sender.read().clone().ok_or(QueueError::Closed)?;
        sender.send(job).await.map_err(|_| QueueError::Closed)
    }

    async fn dequeue(&self) -> Result<QueuedJob, QueueError> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await.ok_or(QueueError::Closed)
    }

    async fn close(&self) {
        self.sender.write().take();
    }
}
