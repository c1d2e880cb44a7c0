// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{JobKind, JobRequest};
use serde::Serialize;
use std::fmt;

/// 接收任务的后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Remote,
    Local,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackendKind::Remote => write!(f, "remote"),
            BackendKind::Local => write!(f, "local"),
        }
    }
}

/// 提交结果
///
/// 每次成功提交产生一个，之后不再修改。`task_id` 是后续轮询状态的唯一凭据。
/// 序列化为路由层约定的 `{task_id, task_label, kind, keyword, page_num, article_limit}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    /// 后端分配的任务ID
    pub task_id: String,
    /// 任务描述
    #[serde(rename = "task_label")]
    pub label: String,
    /// 任务类型
    pub kind: JobKind,
    /// 关键词
    pub keyword: String,
    /// 页数
    #[serde(rename = "page_num")]
    pub page_count: u32,
    /// 条目数
    #[serde(rename = "article_limit")]
    pub item_limit: u32,
    /// 接收任务的后端
    #[serde(skip)]
    pub backend: BackendKind,
}

impl DispatchResult {
    /// 由请求本身构造提交结果，描述使用默认值
    pub fn from_request(task_id: String, request: &JobRequest, backend: BackendKind) -> Self {
        Self {
            task_id,
            label: request.default_label(),
            kind: request.kind(),
            keyword: request.keyword().to_string(),
            page_count: request.page_count(),
            item_limit: request.item_limit(),
            backend,
        }
    }
}
