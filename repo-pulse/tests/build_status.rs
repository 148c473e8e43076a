mod support;

use repo_pulse::{
    aggregate_pull_requests, resolve_build_statuses, resolve_repository_statuses, BuildOutcome,
};
use support::{build, config, pr, FakeApi, BOT};

#[tokio::test]
async fn prefers_merge_ref_build() {
    let config = config(&[("svc-a", "7")]);
    let api = FakeApi::new()
        .with_pull_requests("svc-a", vec![pr(17, "Update X", BOT, false)])
        .with_build("7", "refs/pull/17/merge", build(1, Some("completed"), Some("succeeded")))
        .with_build("7", "refs/heads/main", build(2, Some("completed"), Some("failed")));

    let mut aggregates = aggregate_pull_requests(&api, &config, 4).await.aggregates;
    resolve_build_statuses(&api, &config, &mut aggregates, 4).await;

    let status = aggregates[0].repositories[0].build_status.as_ref().unwrap();
    assert_eq!(status.id, 1);
    assert_eq!(status.outcome, BuildOutcome::Succeeded);
    assert_eq!(status.source_ref, "refs/pull/17/merge");
}

#[tokio::test]
async fn falls_back_through_candidate_refs_in_order() {
    let config = config(&[("svc-a", "7")]);
    let api = FakeApi::new()
        .with_pull_requests("svc-a", vec![pr(17, "Update X", BOT, false)])
        .with_build("7", "refs/heads/main", build(2, Some("inProgress"), None));

    let mut aggregates = aggregate_pull_requests(&api, &config, 4).await.aggregates;
    resolve_build_statuses(&api, &config, &mut aggregates, 4).await;

    let status = aggregates[0].repositories[0].build_status.as_ref().unwrap();
    assert_eq!(status.outcome, BuildOutcome::InProgress);
    assert_eq!(status.source_ref, "refs/heads/main");

    let build_calls: Vec<_> = api
        .calls()
        .into_iter()
        .filter(|call| call.starts_with("build "))
        .collect();
    assert_eq!(
        build_calls,
        vec![
            "build proj/7@refs/pull/17/merge",
            "build proj/7@refs/heads/renovate/pr-17",
            "build proj/7@refs/heads/main",
        ]
    );
}

#[tokio::test]
async fn no_build_on_any_ref_leaves_status_empty() {
    let config = config(&[("svc-a", "7")]);
    let api = FakeApi::new().with_pull_requests("svc-a", vec![pr(17, "Update X", BOT, false)]);

    let mut aggregates = aggregate_pull_requests(&api, &config, 4).await.aggregates;
    let failed = resolve_build_statuses(&api, &config, &mut aggregates, 4).await;

    assert!(failed.is_empty());
    assert!(aggregates[0].repositories[0].build_status.is_none());
}

#[tokio::test]
async fn failed_lookup_leaves_status_empty_and_keeps_others() {
    let config = config(&[("svc-a", "7"), ("svc-b", "8")]);
    let api = FakeApi::new()
        .with_pull_requests("svc-a", vec![pr(17, "Update X", BOT, false)])
        .with_pull_requests("svc-b", vec![pr(18, "Update X", BOT, false)])
        .failing_build("7", "refs/pull/17/merge")
        .with_build("7", "refs/heads/main", build(3, Some("completed"), Some("succeeded")))
        .with_build("8", "refs/pull/18/merge", build(4, Some("completed"), Some("canceled")));

    let mut aggregates = aggregate_pull_requests(&api, &config, 4).await.aggregates;
    let failed = resolve_build_statuses(&api, &config, &mut aggregates, 4).await;

    assert_eq!(failed, vec!["svc-a"]);
    let aggregate = &aggregates[0];
    assert!(aggregate.entry("svc-a").unwrap().build_status.is_none());
    assert_eq!(
        aggregate.entry("svc-b").unwrap().build_status.as_ref().unwrap().outcome,
        BuildOutcome::Canceled
    );
    assert!(!api
        .calls()
        .contains(&"build proj/7@refs/heads/main".to_string()));
}

#[tokio::test]
async fn reports_latest_run_per_repository() {
    let config = config(&[("svc-a", "7"), ("svc-b", "8")]);
    let api = FakeApi::new().with_build(
        "7",
        "refs/heads/main",
        build(9, Some("completed"), Some("partiallySucceeded")),
    );

    let statuses = resolve_repository_statuses(&api, &config, 2).await;

    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].name, "svc-a");
    assert_eq!(statuses[0].outcome(), BuildOutcome::PartiallySucceeded);
    assert_eq!(statuses[0].web_url, "https://dev.azure.com/org/proj/_git/svc-a");
    assert_eq!(statuses[1].name, "svc-b");
    assert!(statuses[1].build.is_none());
    assert!(!statuses[1].is_failed());
    assert_eq!(statuses[1].outcome(), BuildOutcome::Unknown);
}

#[tokio::test]
async fn failed_repository_status_carries_the_error() {
    let config = config(&[("svc-a", "7"), ("svc-b", "8")]);
    let api = FakeApi::new()
        .failing_build("7", "refs/heads/main")
        .with_build("8", "refs/heads/main", build(9, Some("completed"), Some("succeeded")));

    let statuses = resolve_repository_statuses(&api, &config, 2).await;

    assert!(statuses[0].is_failed());
    assert!(statuses[0].error.as_deref().unwrap().contains("503"));
    assert!(statuses[0].build.is_none());
    assert!(!statuses[1].is_failed());
    assert_eq!(statuses[1].outcome(), BuildOutcome::Succeeded);
}
