use repo_pulse::config::AzureDevOpsSettings;
use repo_pulse::devops::{ApiError, AzureDevOpsClient, DevOpsApi, PullRequestUpdate};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PULL_REQUESTS: &str = "/org/proj/_apis/git/repositories/svc-a/pullrequests";

fn client(server: &MockServer) -> AzureDevOpsClient {
    let settings = AzureDevOpsSettings {
        base_url: server.uri(),
        organization: "org".to_string(),
        project: Some("proj".to_string()),
        personal_access_token: String::new(),
    };
    AzureDevOpsClient::new(&settings, "pat").unwrap()
}

#[tokio::test]
async fn lists_active_pull_requests_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PULL_REQUESTS))
        .and(query_param("api-version", "7.1"))
        .and(query_param("searchCriteria.status", "active"))
        .and(header("authorization", "Basic OnBhdA=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "value": [{
                "pullRequestId": 17,
                "title": "Update dependency serde to v1.0.200",
                "createdBy": { "displayName": "Renovate[bot]", "uniqueName": "renovate@org" },
                "isDraft": true,
                "sourceRefName": "refs/heads/renovate/serde-1.x",
                "targetRefName": "refs/heads/main",
                "status": "active",
                "lastMergeSourceCommit": { "commitId": "abc123" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let prs = client(&server).list_pull_requests("proj", "svc-a").await.unwrap();

    assert_eq!(prs.len(), 1);
    assert_eq!(prs[0].pull_request_id, 17);
    assert!(prs[0].is_draft);
    assert_eq!(
        prs[0].last_merge_source_commit.as_ref().unwrap().commit_id,
        "abc123"
    );
}

#[tokio::test]
async fn server_error_becomes_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PULL_REQUESTS))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let result = client(&server).list_pull_requests("proj", "svc-a").await;

    match result {
        Err(ApiError::Status {
            status, message, ..
        }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn sign_in_page_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PULL_REQUESTS))
        .respond_with(ResponseTemplate::new(203).set_body_string("<html>sign in</html>"))
        .mount(&server)
        .await;

    let result = client(&server).list_pull_requests("proj", "svc-a").await;

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[tokio::test]
async fn retries_once_after_throttling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PULL_REQUESTS))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PULL_REQUESTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0, "value": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let prs = client(&server).list_pull_requests("proj", "svc-a").await.unwrap();

    assert!(prs.is_empty());
}

#[tokio::test]
async fn publish_sends_draft_flag_only() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{PULL_REQUESTS}/17")))
        .and(body_json(json!({ "isDraft": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pullRequestId": 17,
            "title": "Update X",
            "isDraft": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pr = client(&server)
        .update_pull_request("proj", "svc-a", 17, &PullRequestUpdate::publish())
        .await
        .unwrap();

    assert!(!pr.is_draft);
}

#[tokio::test]
async fn latest_build_queries_newest_run_for_ref() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/org/proj/_apis/build/builds"))
        .and(query_param("definitions", "42"))
        .and(query_param("branchName", "refs/pull/17/merge"))
        .and(query_param("queryOrder", "queueTimeDescending"))
        .and(query_param("$top", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "value": [{
                "id": 812,
                "status": "completed",
                "result": "succeeded",
                "_links": { "web": { "href": "https://dev.azure.com/org/proj/_build/results?buildId=812" } }
            }]
        })))
        .mount(&server)
        .await;

    let build = client(&server)
        .latest_build("proj", "42", "refs/pull/17/merge")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(build.id, 812);
    assert_eq!(
        build.web_url(),
        Some("https://dev.azure.com/org/proj/_build/results?buildId=812")
    );
}

#[tokio::test]
async fn queue_build_posts_definition_and_branch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/org/proj/_apis/build/builds"))
        .and(body_json(json!({
            "definition": { "id": 42 },
            "sourceBranch": "refs/heads/main"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 900,
            "status": "notStarted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let build = client(&server)
        .queue_build("proj", "42", "refs/heads/main")
        .await
        .unwrap();

    assert_eq!(build.id, 900);
}
