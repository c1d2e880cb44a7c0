// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{backend_config, idle_local, IdleLocal};
use jobrelay::backends::circuit_breaker::{CircuitBreaker, CircuitConfig};
use jobrelay::backends::remote_client::RemoteBackendClient;
use jobrelay::backends::traits::LocalBackend;
use jobrelay::domain::models::{DomainProfile, JobProgress, JobRequest, TaskState};
use jobrelay::domain::services::{StatusAggregator, TaskDomain};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn domain(
    profile: DomainProfile,
    base_url: String,
    remote_enabled: bool,
    local: &IdleLocal,
) -> Arc<TaskDomain> {
    let config = backend_config(&base_url, remote_enabled, true);
    let name = format!("{}-remote", profile.name());
    let remote = RemoteBackendClient::new(name, &config).unwrap();
    Arc::new(TaskDomain::new(profile, config, local.backend.clone()).with_remote(Arc::new(remote)))
}

fn aggregator(server: &MockServer, remote_enabled: bool, local: &IdleLocal) -> StatusAggregator {
    let domains = vec![
        domain(DomainProfile::crawl(), format!("{}/api/spider", server.uri()), remote_enabled, local),
        domain(DomainProfile::analysis(), format!("{}/api/nlp", server.uri()), remote_enabled, local),
    ];
    StatusAggregator::new(domains, local.backend.clone())
}

async fn mount_status(server: &MockServer, prefix: &str, task_id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("{}/tasks/{}/status", prefix, task_id)))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_first_domain_not_found_second_claims() {
    let server = MockServer::start().await;
    mount_status(&server, "/api/spider", "t-1", ResponseTemplate::new(404)).await;
    mount_status(
        &server,
        "/api/nlp",
        "t-1",
        ResponseTemplate::new(200).set_body_json(json!({
            "taskId": "t-1",
            "status": "PROGRESS",
            "progressPercent": 45,
            "message": "Scoring comments"
        })),
    )
    .await;
    let local = idle_local();

    let record = aggregator(&server, true, &local).query_progress("t-1").await;
    assert_eq!(record.state, TaskState::Running);
    assert_eq!(record.progress_percent, 45);
    assert_eq!(record.message, "Scoring comments");
}

#[tokio::test]
async fn test_first_claim_wins() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        "/api/spider",
        "t-1",
        ResponseTemplate::new(200).set_body_json(json!({"state": "SUCCESS", "result": null})),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/nlp/tasks/t-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "FAILURE"})))
        .expect(0)
        .mount(&server)
        .await;
    let local = idle_local();

    let record = aggregator(&server, true, &local).query_progress("t-1").await;
    assert_eq!(record.state, TaskState::Succeeded);
    assert_eq!(record.progress_percent, 100);
    assert_eq!(record.result, Some(json!({})));
}

#[tokio::test]
async fn test_remote_outages_fall_through_to_local() {
    let server = MockServer::start().await;
    let local = idle_local();
    let request = JobRequest::build(&DomainProfile::crawl(), "hot", "", 1, 1).unwrap();
    let submitted = local.backend.submit_local(request).await.unwrap();
    local.store.transition(
        &submitted.task_id,
        JobProgress::Running {
            current: 1,
            total: 4,
            message: "Crawling".to_string(),
        },
    );

    mount_status(&server, "/api/spider", &submitted.task_id, ResponseTemplate::new(502)).await;
    mount_status(
        &server,
        "/api/nlp",
        &submitted.task_id,
        ResponseTemplate::new(200).set_body_string("not json"),
    )
    .await;

    let record = aggregator(&server, true, &local).query_progress(&submitted.task_id).await;
    assert_eq!(record.state, TaskState::Running);
    assert_eq!(record.progress_percent, 25);
}

#[tokio::test]
async fn test_disabled_remotes_are_not_contacted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let local = idle_local();

    let record = aggregator(&server, false, &local).query_progress("unknown").await;
    assert_eq!(record.task_id, "unknown");
    assert_eq!(record.state, TaskState::Pending);
    assert_eq!(record.progress_percent, 0);
}

#[tokio::test]
async fn test_open_circuit_skips_remote_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/spider/tasks/t-1/status"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let local = idle_local();

    let breaker = Arc::new(CircuitBreaker::with_default_config(CircuitConfig {
        failure_threshold: 1,
        recovery_timeout: Duration::from_secs(60),
        failure_window: Duration::from_secs(60),
    }));
    let config = backend_config(&format!("{}/api/spider", server.uri()), true, true);
    let remote = RemoteBackendClient::new("crawl-remote", &config).unwrap();
    let crawl = Arc::new(
        TaskDomain::new(DomainProfile::crawl(), config, local.backend.clone())
            .with_remote(Arc::new(remote))
            .with_circuit_breaker(breaker.clone()),
    );
    let aggregator = StatusAggregator::new(vec![crawl], local.backend.clone());

    assert_eq!(aggregator.query_progress("t-1").await.state, TaskState::Pending);
    assert!(breaker.stats("crawl-remote").is_open);
    assert_eq!(aggregator.query_progress("t-1").await.state, TaskState::Pending);
}

#[tokio::test]
async fn test_not_found_does_not_trip_circuit() {
    let server = MockServer::start().await;
    mount_status(&server, "/api/spider", "t-1", ResponseTemplate::new(404)).await;
    let local = idle_local();

    let breaker = Arc::new(CircuitBreaker::with_default_config(CircuitConfig {
        failure_threshold: 1,
        ..CircuitConfig::default()
    }));
    let config = backend_config(&format!("{}/api/spider", server.uri()), true, true);
    let remote = RemoteBackendClient::new("crawl-remote", &config).unwrap();
    let crawl = Arc::new(
        TaskDomain::new(DomainProfile::crawl(), config, local.backend.clone())
            .with_remote(Arc::new(remote))
            .with_circuit_breaker(breaker.clone()),
    );
    let aggregator = StatusAggregator::new(vec![crawl], local.backend.clone());

    aggregator.query_progress("t-1").await;
    aggregator.query_progress("t-1").await;
    let stats = breaker.stats("crawl-remote");
    assert!(!stats.is_open);
    assert_eq!(stats.total_failures, 0);
    assert_eq!(stats.total_requests, 2);
}
