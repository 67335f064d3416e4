//! End-to-end lifecycle scenarios driven through the HTTP surface.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn sum_task_succeeds_on_first_attempt() {
    let app = TestApp::spawn(2);

    let (_, created) = app
        .post_job(json!({"task": "sum", "payload": {"numbers": [1, 2, 3]}}))
        .await;
    let job_id = created["job_id"].as_str().unwrap();

    let body = app.wait_for_terminal(job_id, Duration::from_secs(2)).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["result"], "Sum is 6");
    assert_eq!(body["attempts"], 0);
    assert_eq!(body["error"], json!(null));
}

#[tokio::test]
async fn failing_task_exhausts_its_retries() {
    let app = TestApp::spawn(2);

    let (_, created) = app
        .post_job(json!({"task": "fail", "payload": {}, "max_retries": 3}))
        .await;
    let job_id = created["job_id"].as_str().unwrap();

    let body = app.wait_for_terminal(job_id, Duration::from_secs(2)).await;

    assert_eq!(body["status"], "failed");
    assert_eq!(body["attempts"], 3);
    assert_eq!(body["max_retries"], 3);
    assert_eq!(body["error"], "This task always fails!");
    // Exactly one of result/error is populated at a terminal state.
    assert_eq!(body["result"], json!(null));
}

#[tokio::test]
async fn unknown_task_name_fails_after_retries() {
    let app = TestApp::spawn(1);

    let (_, created) = app
        .post_job(json!({"task": "no_such_task", "max_retries": 1}))
        .await;
    let job_id = created["job_id"].as_str().unwrap();

    let body = app.wait_for_terminal(job_id, Duration::from_secs(2)).await;

    assert_eq!(body["status"], "failed");
    assert_eq!(body["attempts"], 1);
    assert_eq!(body["error"], "unknown task: no_such_task");
}

#[tokio::test]
async fn timeout_beats_a_slow_task() {
    let app = TestApp::spawn(1);

    let (_, created) = app
        .post_job(json!({
            "task": "sleep",
            "payload": {"seconds": 10},
            "timeout": 0.2,
            "max_retries": 0,
        }))
        .await;
    let job_id = created["job_id"].as_str().unwrap();

    // Terminal well before the 10s sleep would finish.
    let body = app.wait_for_terminal(job_id, Duration::from_secs(2)).await;

    assert_eq!(body["status"], "failed");
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("timeout"), "unexpected error: {error}");
}

#[tokio::test]
async fn billing_job_computes_the_bill() {
    let app = TestApp::spawn(2);

    let (_, created) = app
        .post_job(json!({
            "task": "generate_monthly_bill",
            "payload": {
                "user_id": "user_123",
                "billing_period": "2026-01",
                "subscription_plan": "premium",
                "base_price": 14.99,
                "purchases": [
                    {"price": 3.99},
                    {"price": 5.99},
                ],
            },
        }))
        .await;
    let job_id = created["job_id"].as_str().unwrap();

    let body = app.wait_for_terminal(job_id, Duration::from_secs(2)).await;

    assert_eq!(body["status"], "success");
    let bill = &body["result"];
    assert_eq!(bill["subscription_charge"], 14.99);
    assert_eq!(bill["purchases_total"], 9.98);
    assert_eq!(bill["total_charge"], 24.97);
}

#[tokio::test]
async fn idempotent_billing_runs_once() {
    let app = TestApp::spawn(2);

    let payload = json!({
        "task": "generate_monthly_bill",
        "payload": {
            "user_id": "user_123",
            "billing_period": "2026-01",
            "subscription_plan": "premium",
            "base_price": 14.99,
            "purchases": [],
        },
        "client_job_id": "billing-user_123-2026-01",
    });

    let (_, first) = app.post_job(payload.clone()).await;
    let (_, second) = app.post_job(payload).await;

    assert_eq!(first["job_id"], second["job_id"]);
    assert_eq!(app.store.job_count(), 1);

    let job_id = first["job_id"].as_str().unwrap();
    let body = app.wait_for_terminal(job_id, Duration::from_secs(2)).await;
    assert_eq!(body["status"], "success");
    // A single execution: no attempt was ever counted.
    assert_eq!(body["attempts"], 0);
}

#[tokio::test]
async fn invalid_billing_payload_reaches_terminal_failure() {
    let app = TestApp::spawn(1);

    let (_, created) = app
        .post_job(json!({
            "task": "generate_monthly_bill",
            "payload": {"user_id": "user_123"},
            "max_retries": 1,
        }))
        .await;
    let job_id = created["job_id"].as_str().unwrap();

    let body = app.wait_for_terminal(job_id, Duration::from_secs(2)).await;

    assert_eq!(body["status"], "failed");
    let error = body["error"].as_str().unwrap();
    assert!(
        error.starts_with("Missing required field"),
        "unexpected error: {error}"
    );
}

#[tokio::test]
async fn terminal_jobs_stay_put() {
    let app = TestApp::spawn(1);

    let (_, created) = app
        .post_job(json!({"task": "sum", "payload": {"numbers": [4]}}))
        .await;
    let job_id = created["job_id"].as_str().unwrap();

    let first = app.wait_for_terminal(job_id, Duration::from_secs(2)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let (status, second) = app.get_job(job_id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], second["status"]);
    assert_eq!(first["updated_at"], second["updated_at"]);
    assert_eq!(first["result"], second["result"]);
}

#[tokio::test]
async fn many_jobs_fan_out_across_workers() {
    let app = TestApp::spawn(4);

    let mut job_ids = Vec::new();
    for n in 0..20 {
        let (status, created) = app
            .post_job(json!({"task": "sum", "payload": {"numbers": [n, 1]}}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        job_ids.push(created["job_id"].as_str().unwrap().to_string());
    }

    for (n, job_id) in job_ids.iter().enumerate() {
        let body = app.wait_for_terminal(job_id, Duration::from_secs(5)).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["result"], format!("Sum is {}", n + 1));
    }
}
