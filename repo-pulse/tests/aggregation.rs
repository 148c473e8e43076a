mod support;

use repo_pulse::{aggregate_pull_requests, PullRequestStatus};
use support::{config, pr, FakeApi, BOT};

#[tokio::test]
async fn disabled_renovate_makes_no_calls() {
    let mut config = config(&[("svc-a", "1"), ("svc-b", "2")]);
    config.renovate.enabled = false;
    let api = FakeApi::new().with_pull_requests("svc-a", vec![pr(1, "Update X", BOT, true)]);

    let aggregates = aggregate_pull_requests(&api, &config, 4).await.aggregates;

    assert!(aggregates.is_empty());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn groups_draft_and_active_pull_requests_by_title() {
    let config = config(&[("svc-a", "1"), ("svc-b", "2")]);
    let api = FakeApi::new()
        .with_pull_requests("svc-a", vec![pr(11, "Update X", BOT, true)])
        .with_pull_requests("svc-b", vec![pr(22, "Update X", BOT, false)]);

    let aggregates = aggregate_pull_requests(&api, &config, 4).await.aggregates;

    assert_eq!(aggregates.len(), 1);
    let aggregate = &aggregates[0];
    assert_eq!(aggregate.title, "Update X");
    assert_eq!(aggregate.id, 11);
    assert_eq!(aggregate.repositories.len(), 2);

    let svc_a = aggregate.entry("svc-a").unwrap();
    assert_eq!(svc_a.status, PullRequestStatus::Draft);
    assert_eq!(svc_a.pull_request_id, 11);
    assert_eq!(
        svc_a.pr_url,
        "https://dev.azure.com/org/proj/_git/svc-a/pullrequest/11"
    );
    assert_eq!(
        aggregate.entry("svc-b").unwrap().status,
        PullRequestStatus::Active
    );
    assert_eq!(
        aggregate.last_merge_source_commit.get("svc-b").map(String::as_str),
        Some("commit-22")
    );
    assert!(svc_a.build_status.is_none());
}

#[tokio::test]
async fn failing_repository_does_not_affect_others() {
    let config = config(&[("svc-a", "1"), ("svc-b", "2")]);
    let api = FakeApi::new()
        .with_pull_requests("svc-a", vec![pr(11, "Update X", BOT, true)])
        .failing_list("svc-a")
        .with_pull_requests("svc-b", vec![pr(22, "Update X", BOT, false)]);

    let aggregation = aggregate_pull_requests(&api, &config, 4).await;

    let aggregates = &aggregation.aggregates;
    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].repositories.len(), 1);
    assert_eq!(aggregates[0].repositories[0].name, "svc-b");
    assert_eq!(aggregation.failed_repositories, vec!["svc-a"]);
    assert!(aggregation.has_failures());
    assert_eq!(api.calls().len(), 2);
}

#[tokio::test]
async fn excludes_pull_requests_from_other_authors() {
    let config = config(&[("svc-a", "1")]);
    let api = FakeApi::new().with_pull_requests(
        "svc-a",
        vec![
            pr(1, "Update X", "Jane Developer", false),
            pr(2, "Update Y", "RENOVATE[BOT]", false),
        ],
    );

    let aggregates = aggregate_pull_requests(&api, &config, 4).await.aggregates;

    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].title, "Update Y");
}

#[tokio::test]
async fn grouping_does_not_depend_on_repository_order() {
    let api = FakeApi::new()
        .with_pull_requests(
            "svc-a",
            vec![pr(1, "Update X", BOT, false), pr(2, "Update Y", BOT, true)],
        )
        .with_pull_requests("svc-b", vec![pr(3, "Update Y", BOT, false)])
        .with_pull_requests("svc-c", vec![pr(4, "Update X", BOT, true)]);

    let forward = aggregate_pull_requests(
        &api,
        &config(&[("svc-a", "1"), ("svc-b", "2"), ("svc-c", "3")]),
        1,
    )
    .await
    .aggregates;
    let reverse = aggregate_pull_requests(
        &api,
        &config(&[("svc-c", "3"), ("svc-b", "2"), ("svc-a", "1")]),
        3,
    )
    .await
    .aggregates;

    let mut forward_titles: Vec<_> = forward
        .iter()
        .map(|a| {
            let mut names: Vec<_> = a.repositories.iter().map(|e| e.name.clone()).collect();
            names.sort();
            (a.title.clone(), names)
        })
        .collect();
    let mut reverse_titles: Vec<_> = reverse
        .iter()
        .map(|a| {
            let mut names: Vec<_> = a.repositories.iter().map(|e| e.name.clone()).collect();
            names.sort();
            (a.title.clone(), names)
        })
        .collect();
    forward_titles.sort();
    reverse_titles.sort();

    assert_eq!(forward_titles, reverse_titles);
    assert_eq!(
        forward_titles,
        vec![
            (
                "Update X".to_string(),
                vec!["svc-a".to_string(), "svc-c".to_string()]
            ),
            (
                "Update Y".to_string(),
                vec!["svc-a".to_string(), "svc-b".to_string()]
            ),
        ]
    );
}

#[tokio::test]
async fn keeps_one_entry_per_repository() {
    let config = config(&[("svc-a", "1")]);
    let api = FakeApi::new().with_pull_requests(
        "svc-a",
        vec![pr(1, "Update X", BOT, true), pr(2, "Update X", BOT, false)],
    );

    let aggregates = aggregate_pull_requests(&api, &config, 4).await.aggregates;

    assert_eq!(aggregates[0].repositories.len(), 1);
    assert_eq!(aggregates[0].repositories[0].pull_request_id, 1);
    assert_eq!(
        aggregates[0].last_merge_source_commit.get("svc-a").map(String::as_str),
        Some("commit-1")
    );
}
