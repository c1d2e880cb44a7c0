// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{backend_config, idle_local, IdleLocal};
use jobrelay::backends::circuit_breaker::{CircuitBreaker, CircuitConfig};
use jobrelay::backends::remote_client::RemoteBackendClient;
use jobrelay::domain::models::{BackendKind, DomainProfile, JobKind, TaskState};
use jobrelay::domain::services::TaskDomain;
use jobrelay::utils::errors::{RemoteError, TaskError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn crawl_domain(server: &MockServer, remote_enabled: bool, fallback: bool, local: &IdleLocal) -> TaskDomain {
    let config = backend_config(&format!("{}/api/spider", server.uri()), remote_enabled, fallback);
    let remote = RemoteBackendClient::new("crawl-remote", &config).unwrap();
    TaskDomain::new(DomainProfile::crawl(), config, local.backend.clone()).with_remote(Arc::new(remote))
}

async fn failing_submit(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/spider/tasks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_local_dispatch_clamps_counts() {
    let server = MockServer::start().await;
    let local = idle_local();
    let domain = crawl_domain(&server, false, true, &local);

    let low = domain.submit("hot", "", 0, 0).await.unwrap();
    assert_eq!((low.page_count, low.item_limit), (1, 1));

    let high = domain.submit("hot", "", 99, 1_000).await.unwrap();
    assert_eq!((high.page_count, high.item_limit), (10, 100));
    assert_eq!(high.backend, BackendKind::Local);
}

#[tokio::test]
async fn test_unrecognized_kind_dispatches_default() {
    let server = MockServer::start().await;
    let local = idle_local();
    let domain = crawl_domain(&server, false, true, &local);

    let result = domain.submit("bogus", "", 1, 10).await.unwrap();
    assert_eq!(result.kind, JobKind::CrawlHot);
    assert_eq!(result.label, "Refresh hot feed");
}

#[tokio::test]
async fn test_validation_happens_before_any_backend() {
    let server = MockServer::start().await;
    failing_submit(&server, 0).await;
    let local = idle_local();
    let domain = crawl_domain(&server, true, true, &local);

    let err = domain.submit("search", "", 1, 10).await.unwrap_err();
    assert!(matches!(err, TaskError::Validation(_)));
    assert!(local.store.is_empty());
}

#[tokio::test]
async fn test_remote_success_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/spider/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"taskId": "remote-1", "crawlType": "search", "pageNum": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let local = idle_local();
    let domain = crawl_domain(&server, true, false, &local);

    let result = domain.submit("search", "rust", 3, 50).await.unwrap();
    assert_eq!(result.task_id, "remote-1");
    assert_eq!(result.kind, JobKind::CrawlSearch);
    assert_eq!(result.label, "Keyword search: rust");
    assert_eq!(result.item_limit, 50);
    assert_eq!(result.backend, BackendKind::Remote);
    assert!(local.store.is_empty());
}

#[tokio::test]
async fn test_remote_failure_falls_back_to_local() {
    let server = MockServer::start().await;
    failing_submit(&server, 1).await;
    let local = idle_local();
    let domain = crawl_domain(&server, true, true, &local);

    let result = domain.submit("hot", "", 2, 20).await.unwrap();
    assert_eq!(result.backend, BackendKind::Local);
    assert_eq!(local.store.len(), 1);
    let record = local.store.snapshot(&result.task_id).unwrap();
    assert_eq!(record.state, TaskState::Pending);
}

#[tokio::test]
async fn test_remote_failure_without_fallback_is_surfaced() {
    let server = MockServer::start().await;
    failing_submit(&server, 1).await;
    let local = idle_local();
    let domain = crawl_domain(&server, true, false, &local);

    let err = domain.submit("hot", "", 2, 20).await.unwrap_err();
    match err {
        TaskError::RemoteUnavailable { domain, source } => {
            assert_eq!(domain, "crawl");
            assert!(matches!(source, RemoteError::Status { status: 500, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(local.store.is_empty());
}

#[tokio::test]
async fn test_malformed_remote_reply_triggers_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/spider/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;
    let local = idle_local();
    let domain = crawl_domain(&server, true, true, &local);

    let result = domain.submit("hot", "", 1, 1).await.unwrap();
    assert_eq!(result.backend, BackendKind::Local);
}

#[tokio::test]
async fn test_open_circuit_skips_remote_submission() {
    let server = MockServer::start().await;
    failing_submit(&server, 1).await;
    let local = idle_local();
    let breaker = Arc::new(CircuitBreaker::with_default_config(CircuitConfig {
        failure_threshold: 1,
        recovery_timeout: Duration::from_secs(60),
        failure_window: Duration::from_secs(60),
    }));
    let domain = crawl_domain(&server, true, true, &local).with_circuit_breaker(breaker.clone());

    domain.submit("hot", "", 1, 1).await.unwrap();
    assert!(breaker.stats("crawl-remote").is_open);

    let second = domain.submit("hot", "", 1, 1).await.unwrap();
    assert_eq!(second.backend, BackendKind::Local);
    assert_eq!(local.store.len(), 2);
}
