// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::backends::traits::RemoteBackend;
use crate::config::settings::BackendConfig;
use crate::domain::models::JobRequest;
use crate::utils::errors::RemoteError;
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// 远程后端HTTP客户端
///
/// # 功能
///
/// 与外部任务执行服务交互：
/// - `POST {base}/tasks` 提交任务
/// - `GET {base}/tasks/{id}/status` 查询状态
///
/// 配置了令牌时注入 `Authorization: Bearer` 请求头，请求超时取自 [`BackendConfig`]。
pub struct RemoteBackendClient {
    name: String,
    client: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl RemoteBackendClient {
    /// 创建新的远程客户端
    ///
    /// # 参数
    ///
    /// * `name` - 后端名称
    /// * `config` - 作业域后端配置
    ///
    /// # 返回值
    ///
    /// * `Ok(RemoteBackendClient)` - 客户端实例
    /// * `Err(RemoteError::InvalidConfig)` - 基础URL无效
    pub fn new(name: impl Into<String>, config: &BackendConfig) -> Result<Self, RemoteError> {
        let base_url = Url::parse(config.remote_base_url.trim()).map_err(|e| {
            RemoteError::InvalidConfig(format!("{}: {}", config.remote_base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidConfig(format!(
                "{} cannot be used as a base URL",
                config.remote_base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.remote_timeout())
            .build()?;

        Ok(Self {
            name: name.into(),
            client,
            base_url,
            auth_token: config.bearer_token().map(str::to_string),
        })
    }

    /// 在基础URL后追加路径段，路径段会被转义
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RemoteError::InvalidConfig(format!("{} cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// 解析响应：404 为未找到，其他 4xx/5xx 为状态错误，非JSON响应体为格式错误
    async fn read_payload(response: Response, subject: &str) -> Result<Value, RemoteError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(subject.to_string()));
        }
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RemoteError::Malformed(format!("response body is not JSON: {}", e)))
    }
}

#[async_trait]
impl RemoteBackend for RemoteBackendClient {
    async fn submit_remote(&self, request: &JobRequest) -> Result<Value, RemoteError> {
        let url = self.endpoint(&["tasks"])?;
        debug!(backend = %self.name, %url, kind = %request.kind(), "Submitting remote task");

        let response = self
            .authorize(self.client.post(url))
            .json(&request.to_wire_body())
            .send()
            .await?;

        Self::read_payload(response, "tasks").await
    }

    async fn query_remote(&self, task_id: &str) -> Result<Value, RemoteError> {
        let url = self.endpoint(&["tasks", task_id, "status"])?;
        debug!(backend = %self.name, %url, task_id, "Querying remote task status");

        let response = self.authorize(self.client.get(url)).send().await?;

        Self::read_payload(response, task_id).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
