use crate::common::{TestApp, routes};

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "password123").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = TestApp::spawn().await;
    app.create_authenticated_user("alice", "password123").await;

    let res = app
        .post_without_token(
            routes::REGISTER,
            &serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "password123",
            }),
        )
        .await;
    assert_eq!(res.status, 409, "{}", res.text);
    assert_eq!(res.body["code"], "USERNAME_TAKEN");
}

#[tokio::test]
async fn test_register_validates_input() {
    let app = TestApp::spawn().await;

    let res = app
        .post_without_token(
            routes::REGISTER,
            &serde_json::json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "short",
            }),
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");

    let res = app
        .post_without_token(
            routes::REGISTER,
            &serde_json::json!({
                "username": "bob",
                "email": "not-an-email",
                "password": "password123",
            }),
        )
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::spawn().await;
    app.create_authenticated_user("alice", "password123").await;

    let res = app
        .post_without_token(
            routes::LOGIN,
            &serde_json::json!({
                "email": "alice@example.com",
                "password": "wrong-password",
            }),
        )
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::ME).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");

    let res = app.get_with_token(routes::ME, "garbage-token").await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "password123").await;

    let res = app.get_with_token(routes::ME, &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["username"], "alice");
}
