use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use sea_orm::{ActiveModelTrait, ConnectOptions, DatabaseConnection, Set};
use serde_json::Value;

// Leading `::` disambiguates the workspace crate from this `common` module.
use ::common::store::entity::{problem, system_code, test_case};
use ::common::store::{CodeStore, SqlCodeStore, init_db_with};
use mq::{MemoryBroker, MqConfig, StreamBroker};
use server::config::{AppConfig, AuthConfig, DatabaseConfig, ServerConfig, SubmissionConfig};
use server::state::AppState;

pub mod routes {
    pub const REGISTER: &str = "/auth/register";
    pub const LOGIN: &str = "/auth/login";
    pub const ME: &str = "/auth/me";
    pub const PROBLEMS: &str = "/problems";
    pub const SUBMISSIONS: &str = "/submissions";

    pub fn problem(id: i32) -> String {
        format!("/problems/{id}")
    }

    pub fn problem_submissions(id: i32) -> String {
        format!("/problems/{id}/submissions")
    }

    pub fn submission(id: i32) -> String {
        format!("/submissions/{id}")
    }
}

/// A running test server over an in-memory SQLite database and an in-process
/// broker.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub store: Arc<dyn CodeStore>,
    pub broker: Arc<MemoryBroker>,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).sqlx_logging(false);
        let db = init_db_with(opt)
            .await
            .expect("Failed to initialize test database");

        let store: Arc<dyn CodeStore> = Arc::new(SqlCodeStore::new(db.clone()));
        let broker = Arc::new(MemoryBroker::new());

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: None,
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-for-integration-tests".to_string(),
            },
            submission: SubmissionConfig::default(),
            mq: MqConfig::default(),
        };

        let state = AppState {
            db: db.clone(),
            store: Arc::clone(&store),
            broker: Some(Arc::clone(&broker) as Arc<dyn StreamBroker>),
            config,
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            store,
            broker,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    /// Register a user and log in, returning the auth token.
    pub async fn create_authenticated_user(&self, username: &str, password: &str) -> String {
        let email = format!("{username}@example.com");
        let reg = self
            .post_without_token(
                routes::REGISTER,
                &serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": password,
                }),
            )
            .await;
        assert_eq!(reg.status, 201, "Registration failed: {}", reg.text);

        let res = self
            .post_without_token(
                routes::LOGIN,
                &serde_json::json!({
                    "email": email,
                    "password": password,
                }),
            )
            .await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);

        res.body["token"]
            .as_str()
            .expect("Login response should contain a token")
            .to_string()
    }

    /// Seed a problem with one test case and python system code, returning
    /// `(problem_id, test_case_id)`.
    pub async fn seed_problem(&self) -> (i32, i32) {
        let problem = problem::ActiveModel {
            title: Set("Sum of Two Numbers".into()),
            description: Set("Read two integers and print their sum.".into()),
            difficulty: Set("easy".into()),
            sample_input: Set("2 3\n".into()),
            sample_output: Set("5\n".into()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to seed problem");

        let tc = test_case::ActiveModel {
            problem_id: Set(problem.id),
            input: Set("2 3\n".into()),
            expected_output: Set("5\n".into()),
            position: Set(1),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to seed test case");

        system_code::ActiveModel {
            problem_id: Set(problem.id),
            language_id: Set(1),
            code: Set("if __name__ == '__main__':\n    main()".into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to seed system code");

        (problem.id, tc.id)
    }

    /// Create a submission via the API and return its id.
    pub async fn create_submission(&self, problem_id: i32, token: &str, code: &str) -> i32 {
        let res = self
            .post_with_token(
                routes::SUBMISSIONS,
                &serde_json::json!({
                    "problem_id": problem_id,
                    "language_id": 1,
                    "source_code": code,
                }),
                token,
            )
            .await;
        assert_eq!(res.status, 202, "create_submission failed: {}", res.text);

        res.body["submission_id"]
            .as_i64()
            .expect("response should contain 'submission_id'") as i32
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }
}
