// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::TaskError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// 页数下限
pub const MIN_PAGE_COUNT: u32 = 1;
/// 页数上限
pub const MAX_PAGE_COUNT: u32 = 10;
/// 条目数下限
pub const MIN_ITEM_LIMIT: u32 = 1;
/// 条目数上限
pub const MAX_ITEM_LIMIT: u32 = 100;

/// 任务类型枚举
///
/// 覆盖所有作业域中可识别的任务类型。序列化时使用远程服务约定的短名称。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    /// 刷新热门内容
    #[serde(rename = "hot")]
    CrawlHot,
    /// 关键词搜索
    #[serde(rename = "search")]
    CrawlSearch,
    /// 爬取评论
    #[serde(rename = "comments")]
    CrawlComments,
    /// 文本情感分析
    #[serde(rename = "analyze")]
    AnalyzeText,
    /// 模型重训练
    #[serde(rename = "retrain")]
    RetrainModel,
}

impl JobKind {
    /// 该类型是否必须携带关键词
    pub fn requires_keyword(&self) -> bool {
        match self {
            JobKind::CrawlSearch | JobKind::AnalyzeText => true,
            JobKind::CrawlHot | JobKind::CrawlComments | JobKind::RetrainModel => false,
        }
    }

    /// 后端没有提供描述时使用的默认任务描述
    pub fn default_label(&self, keyword: &str) -> String {
        match self {
            JobKind::CrawlHot => "Refresh hot feed".to_string(),
            JobKind::CrawlSearch => format!("Keyword search: {}", keyword),
            JobKind::CrawlComments => "Crawl comments".to_string(),
            JobKind::AnalyzeText => "Sentiment analysis".to_string(),
            JobKind::RetrainModel => "Model retraining".to_string(),
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobKind::CrawlHot => write!(f, "hot"),
            JobKind::CrawlSearch => write!(f, "search"),
            JobKind::CrawlComments => write!(f, "comments"),
            JobKind::AnalyzeText => write!(f, "analyze"),
            JobKind::RetrainModel => write!(f, "retrain"),
        }
    }
}

impl FromStr for JobKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" | "crawl_hot" => Ok(JobKind::CrawlHot),
            "search" | "crawl_search" => Ok(JobKind::CrawlSearch),
            "comments" | "crawl_comments" => Ok(JobKind::CrawlComments),
            "analyze" | "analyze_text" => Ok(JobKind::AnalyzeText),
            "retrain" | "retrain_model" => Ok(JobKind::RetrainModel),
            _ => Err(()),
        }
    }
}

/// 作业域描述
///
/// 一个作业域（例如爬虫、文本分析）拥有一组可识别的任务类型和一个默认类型。
/// 无法识别或不属于本域的类型会被静默归一为默认类型。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainProfile {
    name: String,
    kinds: Vec<JobKind>,
    default_kind: JobKind,
}

impl DomainProfile {
    /// 创建新的作业域描述，默认类型总是属于可识别集合
    pub fn new(name: impl Into<String>, kinds: Vec<JobKind>, default_kind: JobKind) -> Self {
        let mut kinds = kinds;
        if !kinds.contains(&default_kind) {
            kinds.push(default_kind);
        }
        Self {
            name: name.into(),
            kinds,
            default_kind,
        }
    }

    /// 爬虫作业域
    pub fn crawl() -> Self {
        Self::new(
            "crawl",
            vec![JobKind::CrawlHot, JobKind::CrawlSearch, JobKind::CrawlComments],
            JobKind::CrawlHot,
        )
    }

    /// 文本分析作业域
    pub fn analysis() -> Self {
        Self::new(
            "analysis",
            vec![JobKind::AnalyzeText, JobKind::RetrainModel],
            JobKind::AnalyzeText,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_kind(&self) -> JobKind {
        self.default_kind
    }

    pub fn accepts(&self, kind: JobKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// 将任意输入归一为本域可识别的任务类型
    pub fn normalize_kind(&self, raw: &str) -> JobKind {
        raw.parse::<JobKind>()
            .ok()
            .filter(|kind| self.accepts(*kind))
            .unwrap_or(self.default_kind)
    }
}

/// 将页数饱和到 [1, 10]
pub fn clamp_page_count(value: i64) -> u32 {
    value.clamp(MIN_PAGE_COUNT as i64, MAX_PAGE_COUNT as i64) as u32
}

/// 将条目数饱和到 [1, 100]
pub fn clamp_item_limit(value: i64) -> u32 {
    value.clamp(MIN_ITEM_LIMIT as i64, MAX_ITEM_LIMIT as i64) as u32
}

/// 作业请求
///
/// 提交时的不可变输入。只能通过 [`JobRequest::build`] 构造，
/// 因此类型总是归一化过的，页数和条目数总在合法区间内。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRequest {
    kind: JobKind,
    keyword: String,
    page_count: u32,
    item_limit: u32,
}

impl JobRequest {
    /// 归一化并校验调用方输入
    ///
    /// # 参数
    ///
    /// * `profile` - 所属作业域
    /// * `kind` - 原始任务类型字符串
    /// * `keyword` - 关键词，会被去除首尾空白
    /// * `page_count` - 页数，越界时饱和而不是拒绝
    /// * `item_limit` - 条目数，越界时饱和而不是拒绝
    ///
    /// # 返回值
    ///
    /// * `Ok(JobRequest)` - 归一化后的请求
    /// * `Err(TaskError::Validation)` - 需要关键词的类型收到了空关键词
    pub fn build(
        profile: &DomainProfile,
        kind: &str,
        keyword: &str,
        page_count: i64,
        item_limit: i64,
    ) -> Result<Self, TaskError> {
        let kind = profile.normalize_kind(kind);
        let keyword = keyword.trim();

        if kind.requires_keyword() && keyword.is_empty() {
            return Err(TaskError::Validation(format!(
                "keyword must not be empty for '{}' jobs",
                kind
            )));
        }

        Ok(Self::from_parts(
            kind,
            keyword.to_string(),
            clamp_page_count(page_count),
            clamp_item_limit(item_limit),
        ))
    }

    pub(crate) fn from_parts(kind: JobKind, keyword: String, page_count: u32, item_limit: u32) -> Self {
        Self {
            kind,
            keyword,
            page_count,
            item_limit,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn item_limit(&self) -> u32 {
        self.item_limit
    }

    pub fn default_label(&self) -> String {
        self.kind.default_label(&self.keyword)
    }

    /// 远程提交接口的请求体
    pub fn to_wire_body(&self) -> Value {
        json!({
            "type": self.kind.to_string(),
            "keyword": self.keyword,
            "page_num": self.page_count,
            "article_limit": self.item_limit,
        })
    }
}
