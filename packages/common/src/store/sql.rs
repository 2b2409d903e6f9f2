use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::cache::Cache;
use super::entity::{language_import, submission, system_code, test_case};
use super::error::StoreError;
use super::traits::{CodeStore, NewSubmission, SubmissionDetail, TestCase};
use crate::SubmissionStatus;

/// Lookups keyed by (problem, language) change rarely; an hour of staleness
/// is acceptable for jobs that only need schema-at-job-start freshness.
const CACHE_TTL: Duration = Duration::from_secs(3600);

/// SeaORM-backed store with an optional read-through cache in front of the
/// per-problem lookups.
pub struct SqlCodeStore {
    db: DatabaseConnection,
    cache: Option<Arc<dyn Cache>>,
}

impl SqlCodeStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, cache: None }
    }

    pub fn with_cache(db: DatabaseConnection, cache: Arc<dyn Cache>) -> Self {
        Self {
            db,
            cache: Some(cache),
        }
    }

    async fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.cache.as_ref()?.get(key).await?;
        serde_json::from_str(&raw).ok()
    }

    async fn cache_set<T: Serialize>(&self, key: &str, value: &T) {
        let Some(cache) = &self.cache else {
            return;
        };
        match serde_json::to_string(value) {
            Ok(raw) => cache.set(key, &raw, CACHE_TTL).await,
            Err(e) => debug!(key, error = %e, "failed to serialize cache value"),
        }
    }
}

#[async_trait]
impl CodeStore for SqlCodeStore {
    async fn get_submission(&self, submission_id: i32) -> Result<submission::Model, StoreError> {
        submission::Entity::find_by_id(submission_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("submission not found: {submission_id}")))
    }

    async fn get_test_cases(&self, problem_id: i32) -> Result<Vec<TestCase>, StoreError> {
        let cache_key = format!("problem:{problem_id}:testcases");
        if let Some(cached) = self.cache_get::<Vec<TestCase>>(&cache_key).await {
            debug!(problem_id, "test cases served from cache");
            return Ok(cached);
        }

        let rows = test_case::Entity::find()
            .filter(test_case::Column::ProblemId.eq(problem_id))
            .order_by_asc(test_case::Column::Position)
            .all(&self.db)
            .await?;

        let test_cases: Vec<TestCase> = rows
            .into_iter()
            .map(|tc| TestCase {
                id: tc.id,
                input: tc.input,
                expected_output: tc.expected_output,
            })
            .collect();

        self.cache_set(&cache_key, &test_cases).await;

        Ok(test_cases)
    }

    async fn get_system_code(
        &self,
        problem_id: i32,
        language_id: i32,
    ) -> Result<String, StoreError> {
        let cache_key = format!("problem:{problem_id}:lang:{language_id}:system_code");
        if let Some(cached) = self.cache_get::<String>(&cache_key).await {
            debug!(problem_id, language_id, "system code served from cache");
            return Ok(cached);
        }

        let row = system_code::Entity::find()
            .filter(system_code::Column::ProblemId.eq(problem_id))
            .filter(system_code::Column::LanguageId.eq(language_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                StoreError::NotFound(format!(
                    "system code not found for problem {problem_id} and language {language_id}"
                ))
            })?;

        self.cache_set(&cache_key, &row.code).await;

        Ok(row.code)
    }

    async fn get_language_imports(
        &self,
        problem_id: i32,
        language_id: i32,
    ) -> Result<String, StoreError> {
        let cache_key = format!("problem:{problem_id}:lang:{language_id}:imports");
        if let Some(cached) = self.cache_get::<String>(&cache_key).await {
            debug!(problem_id, language_id, "imports served from cache");
            return Ok(cached);
        }

        // A missing preamble is the normal case, so cache the empty string too.
        let code = language_import::Entity::find()
            .filter(language_import::Column::ProblemId.eq(problem_id))
            .filter(language_import::Column::LanguageId.eq(language_id))
            .one(&self.db)
            .await?
            .map(|row| row.code)
            .unwrap_or_default();

        self.cache_set(&cache_key, &code).await;

        Ok(code)
    }

    async fn create_submission(
        &self,
        new: NewSubmission,
    ) -> Result<submission::Model, StoreError> {
        let model = submission::ActiveModel {
            user_id: Set(new.user_id),
            problem_id: Set(new.problem_id),
            language_id: Set(new.language_id),
            source_code: Set(new.source_code),
            status: Set(SubmissionStatus::Processing),
            submitted_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(model)
    }

    async fn update_submission_status(
        &self,
        submission_id: i32,
        status: SubmissionStatus,
        wrong_testcase: Option<i32>,
        program_output: Option<&str>,
    ) -> Result<bool, StoreError> {
        // Check-and-set: only a PROCESSING row may transition, which makes a
        // redelivered job's second write a no-op.
        let result = submission::Entity::update_many()
            .col_expr(submission::Column::Status, Expr::value(status))
            .col_expr(submission::Column::WrongTestcase, Expr::value(wrong_testcase))
            .col_expr(
                submission::Column::ProgramOutput,
                Expr::value(program_output.map(str::to_owned)),
            )
            .filter(submission::Column::Id.eq(submission_id))
            .filter(submission::Column::Status.eq(SubmissionStatus::Processing))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn get_submission_for_user(
        &self,
        submission_id: i32,
        user_id: i32,
    ) -> Result<SubmissionDetail, StoreError> {
        let model = submission::Entity::find_by_id(submission_id)
            .filter(submission::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                StoreError::NotFound(format!(
                    "submission not found or access denied: {submission_id}"
                ))
            })?;

        let mut detail = SubmissionDetail {
            status: model.status,
            source_code: model.source_code,
            program_output: model.program_output,
            wrong_testcase: None,
            expected_output: None,
        };

        if let Some(tc_id) = model.wrong_testcase {
            // The failing test case may have been deleted since judging.
            if let Some(tc) = test_case::Entity::find_by_id(tc_id).one(&self.db).await? {
                detail.wrong_testcase = Some(tc.input);
                detail.expected_output = Some(tc.expected_output);
            }
        }

        Ok(detail)
    }

    async fn list_submissions(
        &self,
        user_id: i32,
        problem_id: i32,
    ) -> Result<Vec<submission::Model>, StoreError> {
        let rows = submission::Entity::find()
            .filter(submission::Column::UserId.eq(user_id))
            .filter(submission::Column::ProblemId.eq(problem_id))
            .order_by_desc(submission::Column::SubmittedAt)
            .all(&self.db)
            .await?;

        Ok(rows)
    }
}
