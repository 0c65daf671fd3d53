//! End-to-end driver flows against a stubbed scanner API.

mod common;

use common::StubScanner;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zapgate_core::{JobId, ScanParameters, ScannerEndpoint};
use zapgate_driver::{workflow, StepOutcome, ZapDriver};

fn driver_for(stub: &StubScanner) -> ZapDriver {
    ZapDriver::new(stub.endpoint()).expect("build driver")
}

#[tokio::test]
async fn crawl_start_is_single_shot_until_reset() {
    let stub = StubScanner::start(&[("spider/action/scan", &[r#"{"scan":"1"}"#])]).await;
    let mut driver = driver_for(&stub);

    assert!(driver.start_crawl("http://127.0.0.1:8081").await);
    assert_eq!(driver.crawl_id(), Some(JobId::new(1)));

    // Second dispatch refuses while a crawl is active, without an API call
    assert!(!driver.start_crawl("http://127.0.0.1:8081").await);
    assert_eq!(stub.count_calls("spider/action/scan"), 1);

    driver.reset_crawl();
    assert!(driver.start_crawl("http://127.0.0.1:8081").await);
    assert_eq!(stub.count_calls("spider/action/scan"), 2);
}

#[tokio::test]
async fn crawl_start_failure_leaves_no_crawl_id() {
    // Response carries no job id
    let stub = StubScanner::start(&[("spider/action/scan", &[r#"{"Result":"OK"}"#])]).await;
    let mut driver = driver_for(&stub);

    assert!(!driver.start_crawl("http://127.0.0.1:8081").await);
    assert_eq!(driver.crawl_id(), None);
}

#[tokio::test]
async fn crawl_status_reports_progress_and_absorbs_failures() {
    let stub = StubScanner::start(&[
        ("spider/action/scan", &[r#"{"scan":"1"}"#]),
        ("spider/view/status", &[r#"{"status":"42"}"#, "not json"]),
    ])
    .await;
    let mut driver = driver_for(&stub);
    assert!(driver.start_crawl("http://127.0.0.1:8081").await);

    assert_eq!(driver.crawl_status().await, 42);
    // Unparseable status body counts as complete
    assert_eq!(driver.crawl_status().await, 100);
}

#[tokio::test]
async fn attack_dispatches_each_distinct_site_once() {
    let stub = StubScanner::start(&[
        (
            "core/view/sites",
            &[r#"{"sites":["http://127.0.0.1:8081","http://127.0.0.1:8081","http://127.0.0.1:8082"]}"#],
        ),
        ("ascan/action/scan", &[r#"{"scan":"10"}"#, r#"{"scan":"11"}"#]),
    ])
    .await;
    let mut driver = driver_for(&stub);

    assert!(driver.run_attack(&ScanParameters::unauthenticated()).await);
    assert_eq!(driver.attack_ids(), &[JobId::new(10), JobId::new(11)]);
    assert_eq!(stub.count_calls("ascan/action/scan"), 2);
}

#[tokio::test]
async fn attack_fails_only_on_missing_site_list() {
    let stub = StubScanner::start(&[("core/view/sites", &["{}"])]).await;
    let mut driver = driver_for(&stub);

    assert!(!driver.run_attack(&ScanParameters::unauthenticated()).await);
    assert!(driver.attack_ids().is_empty());
    assert_eq!(stub.count_calls("ascan/action/scan"), 0);
}

#[tokio::test]
async fn attack_clears_jobs_from_prior_run() {
    let stub = StubScanner::start(&[
        (
            "core/view/sites",
            &[r#"{"sites":["http://127.0.0.1:8081"]}"#, "{}"],
        ),
        ("ascan/action/scan", &[r#"{"scan":"10"}"#]),
    ])
    .await;
    let mut driver = driver_for(&stub);

    assert!(driver.run_attack(&ScanParameters::unauthenticated()).await);
    assert_eq!(driver.attack_ids().len(), 1);

    // Second run fails to fetch sites; jobs from the first run are gone
    assert!(!driver.run_attack(&ScanParameters::unauthenticated()).await);
    assert!(driver.attack_ids().is_empty());
}

#[tokio::test]
async fn guard_rejection_issues_no_attack_call() {
    // TEST-NET address, not loopback; empty allow-list means loopback-only
    let stub = StubScanner::start(&[(
        "core/view/sites",
        &[r#"{"sites":["http://203.0.113.10/"]}"#],
    )])
    .await;
    let mut driver = driver_for(&stub);

    assert!(driver.run_attack(&ScanParameters::unauthenticated()).await);
    assert!(driver.attack_ids().is_empty());
    assert_eq!(stub.count_calls("ascan/action/scan"), 0);
}

#[tokio::test]
async fn attack_status_is_truncated_mean_with_failures_as_complete() {
    let stub = StubScanner::start(&[
        (
            "core/view/sites",
            &[r#"{"sites":["http://127.0.0.1:8081","http://127.0.0.1:8082","http://127.0.0.1:8083"]}"#],
        ),
        (
            "ascan/action/scan",
            &[r#"{"scan":"1"}"#, r#"{"scan":"2"}"#, r#"{"scan":"3"}"#],
        ),
        ("scanId=1", &[r#"{"status":"20"}"#]),
        ("scanId=2", &[r#"{"status":"60"}"#]),
        // Job 3's status query yields garbage and counts as 100
        ("scanId=3", &["garbage"]),
    ])
    .await;
    let mut driver = driver_for(&stub);

    assert!(driver.run_attack(&ScanParameters::unauthenticated()).await);
    assert_eq!(driver.attack_ids().len(), 3);
    assert_eq!(driver.attack_status().await, 60);
}

#[tokio::test]
async fn authenticated_attack_uses_scan_as_user() {
    let stub = StubScanner::start(&[
        ("core/view/sites", &[r#"{"sites":["http://127.0.0.1:8081"]}"#]),
        ("ascan/action/scanAsUser", &[r#"{"scan":"7"}"#]),
    ])
    .await;
    let mut driver = driver_for(&stub);

    let params = ScanParameters::unauthenticated()
        .as_user(5)
        .with_policy("weekly");
    assert!(driver.run_attack(&params).await);
    assert_eq!(driver.attack_ids(), &[JobId::new(7)]);

    let attack_request = stub
        .requests()
        .into_iter()
        .find(|path| path.contains("ascan/action/scanAsUser"))
        .expect("attack request issued");
    assert!(attack_request.contains("userId=5"));
    assert!(attack_request.contains("scanPolicyName=weekly"));
}

#[tokio::test]
async fn policy_import_accepts_ok_and_already_exists() {
    let stub = StubScanner::start(&[(
        "ascan/action/importScanPolicy",
        &[
            r#"{"Result":"OK"}"#,
            r#"{"code":"already_exists"}"#,
            r#"{"code":"does_not_exist"}"#,
        ],
    )])
    .await;
    let driver = driver_for(&stub);

    assert!(driver.load_policy("/policies/weekly.policy").await);
    assert!(driver.load_policy("/policies/weekly.policy").await);
    assert!(!driver.load_policy("/policies/broken.policy").await);
}

#[tokio::test]
async fn session_load_and_url_import_check_result_field() {
    let stub = StubScanner::start(&[
        ("core/action/loadSession", &[r#"{"Result":"OK"}"#]),
        ("importurls/action/importurls", &[r#"{"Result":"Fail"}"#]),
    ])
    .await;
    let driver = driver_for(&stub);

    assert!(driver.load_session("/sessions/previous.session").await);
    assert!(!driver.import_urls("/tmp/urls.txt").await);
}

#[tokio::test]
async fn mode_and_shutdown_succeed_on_any_json_response() {
    let stub = StubScanner::start(&[]).await;
    let driver = driver_for(&stub);

    assert!(driver.set_mode("attack").await);
    assert!(driver.shutdown().await);
}

#[tokio::test]
async fn api_failure_is_absorbed_when_scanner_is_down() {
    // Find a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let endpoint = ScannerEndpoint::new("127.0.0.1", port, Duration::from_secs(5));
    let mut driver = ZapDriver::new(endpoint).expect("build driver");

    assert!(!driver.set_mode("attack").await);
    assert!(!driver.start_crawl("http://127.0.0.1:8081").await);
    assert_eq!(driver.crawl_id(), None);
    assert!(!driver.run_attack(&ScanParameters::unauthenticated()).await);
}

#[tokio::test]
async fn workflow_crawl_runs_to_completion() {
    let stub = StubScanner::start(&[
        ("spider/action/scan", &[r#"{"scan":"1"}"#]),
        ("spider/view/status", &[r#"{"status":"100"}"#]),
    ])
    .await;
    let mut driver = driver_for(&stub);
    let cancel = CancellationToken::new();

    let outcome = workflow::run_crawl(&mut driver, "http://127.0.0.1:8081", &cancel).await;
    assert_eq!(outcome, StepOutcome::Completed);
}

#[tokio::test]
async fn workflow_attack_reports_dispatch_failure() {
    let stub = StubScanner::start(&[("core/view/sites", &["{}"])]).await;
    let mut driver = driver_for(&stub);
    let cancel = CancellationToken::new();

    let outcome =
        workflow::run_attack(&mut driver, &ScanParameters::unauthenticated(), &cancel).await;
    assert_eq!(outcome, StepOutcome::DispatchFailed);
}
