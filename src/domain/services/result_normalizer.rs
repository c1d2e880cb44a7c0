// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{clamp_item_limit, clamp_page_count};
use crate::domain::models::{
    BackendKind, DispatchResult, DomainProfile, JobRequest, ProgressRecord, TaskState,
};
use crate::utils::errors::RemoteError;
use serde_json::{Map, Value};

const TASK_ID_KEYS: &[&str] = &["task_id", "taskId"];
const LABEL_KEYS: &[&str] = &["task_label", "taskLabel"];
const KIND_KEYS: &[&str] = &["crawl_type", "crawlType", "type", "kind"];
const KEYWORD_KEYS: &[&str] = &["keyword"];
const PAGE_COUNT_KEYS: &[&str] = &["page_num", "pageNum"];
const ITEM_LIMIT_KEYS: &[&str] = &["article_limit", "articleLimit"];
const STATE_KEYS: &[&str] = &["state", "status"];
const PROGRESS_KEYS: &[&str] = &["progress", "progressPercent"];
const MESSAGE_KEYS: &[&str] = &["message", "msg"];

/// 取出任务描述对象
///
/// 远程服务可能把描述直接放在顶层，也可能包在 `data` 下
fn unwrap_envelope(raw: &Value) -> Result<&Map<String, Value>, RemoteError> {
    let payload = raw
        .as_object()
        .ok_or_else(|| RemoteError::Malformed("response is not a JSON object".to_string()))?;

    match payload.get("data") {
        Some(Value::Object(data)) => Ok(data),
        _ => Ok(payload),
    }
}

/// 按顺序查找第一个非空字符串，整数也按字符串接受
fn first_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// 按顺序查找第一个正整数，数字字符串也接受
fn first_positive(map: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| {
        let value = match map.get(*key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }?;
        (value > 0).then_some(value)
    })
}

/// 将远程提交响应归一为 [`DispatchResult`]
///
/// 缺失的字段使用 `fallback` 中的值，任务类型重新经过作业域归一化，
/// 页数和条目数重新饱和到合法区间
///
/// # 错误
///
/// * 响应不是对象，或者任何拼写下都没有任务ID时返回 `RemoteError::Malformed`
pub fn normalize_dispatch(
    raw: &Value,
    fallback: &JobRequest,
    profile: &DomainProfile,
) -> Result<DispatchResult, RemoteError> {
    let payload = unwrap_envelope(raw)?;

    let task_id = first_string(payload, TASK_ID_KEYS)
        .ok_or_else(|| RemoteError::Malformed("response does not contain a task id".to_string()))?;

    let kind = match first_string(payload, KIND_KEYS) {
        Some(raw_kind) => profile.normalize_kind(&raw_kind),
        None => fallback.kind(),
    };
    let keyword = first_string(payload, KEYWORD_KEYS).unwrap_or_else(|| fallback.keyword().to_string());
    let label = first_string(payload, LABEL_KEYS).unwrap_or_else(|| kind.default_label(&keyword));

    let page_count = first_positive(payload, PAGE_COUNT_KEYS)
        .map(clamp_page_count)
        .unwrap_or(fallback.page_count());
    let item_limit = first_positive(payload, ITEM_LIMIT_KEYS)
        .map(clamp_item_limit)
        .unwrap_or(fallback.item_limit());

    Ok(DispatchResult {
        task_id,
        label,
        kind,
        keyword,
        page_count,
        item_limit,
        backend: BackendKind::Remote,
    })
}

/// 将远程状态响应归一为 [`ProgressRecord`]
///
/// # 错误
///
/// * 响应不是对象、缺少状态或状态无法识别时返回 `RemoteError::Malformed`
pub fn normalize_progress(raw: &Value, task_id: &str) -> Result<ProgressRecord, RemoteError> {
    let payload = unwrap_envelope(raw)?;

    let raw_state = first_string(payload, STATE_KEYS)
        .ok_or_else(|| RemoteError::Malformed("status response does not contain a state".to_string()))?;
    let state = TaskState::parse_remote(&raw_state)
        .ok_or_else(|| RemoteError::Malformed(format!("unrecognized task state '{}'", raw_state)))?;

    let reported = PROGRESS_KEYS.iter().find_map(|key| match payload.get(*key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    });

    let (progress_percent, result) = match state {
        TaskState::Succeeded => {
            let result = match payload.get("result") {
                Some(Value::Null) | None => Value::Object(Map::new()),
                Some(value) => value.clone(),
            };
            (100, Some(result))
        }
        TaskState::Pending | TaskState::Running | TaskState::Failed => {
            let pct = reported.unwrap_or(0.0).clamp(0.0, 100.0).floor() as u8;
            (pct, None)
        }
    };

    Ok(ProgressRecord {
        task_id: first_string(payload, TASK_ID_KEYS).unwrap_or_else(|| task_id.to_string()),
        state,
        progress_percent,
        message: first_string(payload, MESSAGE_KEYS).unwrap_or_default(),
        result,
    })
}
