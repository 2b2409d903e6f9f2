use crate::common::{TestApp, routes};

#[tokio::test]
async fn test_list_problems() {
    let app = TestApp::spawn().await;
    let (problem_id, _) = app.seed_problem().await;

    let res = app.get_without_token(routes::PROBLEMS).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let problems = res.body["problems"].as_array().unwrap();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0]["id"], problem_id);
    assert_eq!(problems[0]["title"], "Sum of Two Numbers");
    assert_eq!(problems[0]["difficulty"], "easy");
    // The listing must not leak full problem bodies.
    assert!(problems[0].get("description").is_none());
}

#[tokio::test]
async fn test_get_problem_detail() {
    let app = TestApp::spawn().await;
    let (problem_id, _) = app.seed_problem().await;

    let res = app.get_without_token(&routes::problem(problem_id)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["title"], "Sum of Two Numbers");
    assert_eq!(res.body["sample_input"], "2 3\n");
    assert_eq!(res.body["sample_output"], "5\n");
}

#[tokio::test]
async fn test_get_missing_problem() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(&routes::problem(12345)).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}
