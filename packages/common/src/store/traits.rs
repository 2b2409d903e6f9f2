use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::entity::submission;
use super::error::StoreError;
use crate::SubmissionStatus;

/// A single test case as consumed by the code runner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: i32,
    /// Stdin fed to the program.
    pub input: String,
    /// Expected stdout, compared after trimming.
    pub expected_output: String,
}

/// Data needed to insert a new submission.
#[derive(Clone, Debug)]
pub struct NewSubmission {
    pub user_id: i32,
    pub problem_id: i32,
    pub language_id: i32,
    pub source_code: String,
}

/// Owner-facing view of a submission, with the failing test case's input and
/// expected output joined in when the verdict names one.
#[derive(Clone, Debug, Serialize)]
pub struct SubmissionDetail {
    pub status: SubmissionStatus,
    pub source_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrong_testcase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
}

/// The store contract the adjudication pipeline depends on.
///
/// Reads keyed by `(problem, language)` may be served from a cache; the
/// pipeline only requires them to reflect the schema at the time the job
/// started.
#[async_trait]
pub trait CodeStore: Send + Sync {
    async fn get_submission(&self, submission_id: i32) -> Result<submission::Model, StoreError>;

    /// Test cases for a problem in execution order. May be empty.
    async fn get_test_cases(&self, problem_id: i32) -> Result<Vec<TestCase>, StoreError>;

    /// The per-problem test harness. Missing harness is a `NotFound` error:
    /// a problem without system code cannot accept submissions for that
    /// language.
    async fn get_system_code(
        &self,
        problem_id: i32,
        language_id: i32,
    ) -> Result<String, StoreError>;

    /// The per-problem import preamble. A missing row is not an error and
    /// yields the empty string.
    async fn get_language_imports(
        &self,
        problem_id: i32,
        language_id: i32,
    ) -> Result<String, StoreError>;

    async fn create_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<submission::Model, StoreError>;

    /// Record a terminal verdict. The write only applies while the row is
    /// still `PROCESSING`; returns whether the row transitioned. A `false`
    /// return means another delivery of the same job already finished it.
    async fn update_submission_status(
        &self,
        submission_id: i32,
        status: SubmissionStatus,
        wrong_testcase: Option<i32>,
        program_output: Option<&str>,
    ) -> Result<bool, StoreError>;

    /// Owner-scoped read used by `GET /submissions/:id`.
    async fn get_submission_for_user(
        &self,
        submission_id: i32,
        user_id: i32,
    ) -> Result<SubmissionDetail, StoreError>;

    /// The caller's submissions for one problem, newest first.
    async fn list_submissions(
        &self,
        user_id: i32,
        problem_id: i32,
    ) -> Result<Vec<submission::Model>, StoreError>;
}
