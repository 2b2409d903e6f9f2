use std::time::Duration;

use ::common::SubmissionStatus;
use ::common::store::CodeStore;
use mq::StreamBroker;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn test_create_requires_auth() {
    let app = TestApp::spawn().await;
    let (problem_id, _) = app.seed_problem().await;

    let res = app
        .post_without_token(
            routes::SUBMISSIONS,
            &serde_json::json!({
                "problem_id": problem_id,
                "language_id": 1,
                "source_code": "print(5)",
            }),
        )
        .await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn test_create_validates_payload() {
    let app = TestApp::spawn().await;
    let (problem_id, _) = app.seed_problem().await;
    let token = app.create_authenticated_user("alice", "password123").await;

    let res = app
        .post_with_token(
            routes::SUBMISSIONS,
            &serde_json::json!({
                "problem_id": problem_id,
                "language_id": 1,
                "source_code": "   ",
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");

    let res = app
        .post_with_token(
            routes::SUBMISSIONS,
            &serde_json::json!({
                "problem_id": -1,
                "language_id": 1,
                "source_code": "print(5)",
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn test_create_inserts_row_then_enqueues() {
    let app = TestApp::spawn().await;
    let (problem_id, _) = app.seed_problem().await;
    let token = app.create_authenticated_user("alice", "password123").await;

    let id = app.create_submission(problem_id, &token, "print(5)").await;

    // The row must exist in PROCESSING before any worker can see the message.
    let model = app.store.get_submission(id).await.unwrap();
    assert_eq!(model.status, SubmissionStatus::Processing);

    let messages = app
        .broker
        .read_group("test-consumer", Duration::from_millis(50), 10)
        .await
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].submission_id(), Some(id));
}

#[tokio::test]
async fn test_get_own_submission() {
    let app = TestApp::spawn().await;
    let (problem_id, _) = app.seed_problem().await;
    let token = app.create_authenticated_user("alice", "password123").await;

    let id = app.create_submission(problem_id, &token, "print(5)").await;

    let res = app.get_with_token(&routes::submission(id), &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["status"], "PROCESSING");
    assert_eq!(res.body["source_code"], "print(5)");
    assert!(res.body.get("program_output").is_none());
}

#[tokio::test]
async fn test_get_other_users_submission_is_hidden() {
    let app = TestApp::spawn().await;
    let (problem_id, _) = app.seed_problem().await;
    let alice = app.create_authenticated_user("alice", "password123").await;
    let mallory = app.create_authenticated_user("mallory", "password123").await;

    let id = app.create_submission(problem_id, &alice, "print(5)").await;

    let res = app.get_with_token(&routes::submission(id), &mallory).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn test_failed_verdict_includes_test_case_details() {
    let app = TestApp::spawn().await;
    let (problem_id, test_case_id) = app.seed_problem().await;
    let token = app.create_authenticated_user("alice", "password123").await;

    let id = app.create_submission(problem_id, &token, "print(-1)").await;

    // Simulate the worker recording a wrong-answer verdict.
    let updated = app
        .store
        .update_submission_status(id, SubmissionStatus::WrongAnswer, Some(test_case_id), Some("-1"))
        .await
        .unwrap();
    assert!(updated);

    let res = app.get_with_token(&routes::submission(id), &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["status"], "WRONG_ANSWER");
    assert_eq!(res.body["program_output"], "-1");
    assert_eq!(res.body["wrong_testcase"], "2 3\n");
    assert_eq!(res.body["expected_output"], "5\n");
}

#[tokio::test]
async fn test_list_problem_submissions() {
    let app = TestApp::spawn().await;
    let (problem_id, _) = app.seed_problem().await;
    let alice = app.create_authenticated_user("alice", "password123").await;
    let bob = app.create_authenticated_user("bob", "password123").await;

    let first = app.create_submission(problem_id, &alice, "print(5)").await;
    let second = app.create_submission(problem_id, &alice, "print(2+3)").await;
    app.create_submission(problem_id, &bob, "print(0)").await;

    let res = app
        .get_with_token(&routes::problem_submissions(problem_id), &alice)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let submissions = res.body["submissions"].as_array().unwrap();
    // Only the caller's submissions are listed.
    assert_eq!(submissions.len(), 2);
    let ids: Vec<i64> = submissions
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert!(ids.contains(&(first as i64)));
    assert!(ids.contains(&(second as i64)));
}
