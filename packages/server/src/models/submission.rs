use chrono::{DateTime, Utc};
use common::SubmissionStatus;
use common::store::entity::submission;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize)]
pub struct CreateSubmissionRequest {
    pub problem_id: i32,
    pub language_id: i32,
    pub source_code: String,
}

#[derive(Serialize)]
pub struct CreateSubmissionResponse {
    pub message: &'static str,
    pub submission_id: i32,
}

#[derive(Serialize)]
pub struct SubmissionListItem {
    pub id: i32,
    pub language_id: i32,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct SubmissionListResponse {
    pub submissions: Vec<SubmissionListItem>,
}

impl From<submission::Model> for SubmissionListItem {
    fn from(model: submission::Model) -> Self {
        Self {
            id: model.id,
            language_id: model.language_id,
            status: model.status,
            submitted_at: model.submitted_at,
        }
    }
}

pub fn validate_create_submission(
    payload: &CreateSubmissionRequest,
    max_size: usize,
) -> Result<(), AppError> {
    if payload.problem_id <= 0 {
        return Err(AppError::Validation(
            "problem ID must be a positive integer".into(),
        ));
    }
    if payload.language_id <= 0 {
        return Err(AppError::Validation(
            "language ID must be a positive integer".into(),
        ));
    }
    if payload.source_code.trim().is_empty() {
        return Err(AppError::Validation("source code cannot be empty".into()));
    }
    if payload.source_code.len() > max_size {
        return Err(AppError::Validation(format!(
            "source code exceeds maximum size of {max_size} bytes"
        )));
    }
    Ok(())
}
