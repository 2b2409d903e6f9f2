use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use mq::submission_fields;
use tracing::{debug, error, info, instrument};

use common::store::{NewSubmission, SubmissionDetail};

use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::submission::{
    CreateSubmissionRequest, CreateSubmissionResponse, SubmissionListItem, SubmissionListResponse,
    validate_create_submission,
};
use crate::state::AppState;

/// Accept a submission: INSERT the row in `PROCESSING`, then append its id
/// to the stream. A worker must never read a message whose row does not
/// exist yet. If the append fails the row stays orphaned in `PROCESSING`
/// and the caller is told to resubmit.
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_submission(&payload, state.config.submission.max_size)?;

    let model = state
        .store
        .create_submission(NewSubmission {
            user_id: auth_user.user_id,
            problem_id: payload.problem_id,
            language_id: payload.language_id,
            source_code: payload.source_code,
        })
        .await?;

    match &state.broker {
        Some(broker) => {
            if let Err(e) = broker.append(&submission_fields(model.id)).await {
                error!(
                    submission_id = model.id,
                    error = %e,
                    "failed to append submission to stream"
                );
                return Err(AppError::QueueFailure);
            }
        }
        None => {
            debug!(submission_id = model.id, "broker unavailable, skipping enqueue");
        }
    }

    info!(
        submission_id = model.id,
        problem_id = payload.problem_id,
        language_id = payload.language_id,
        "submission queued for processing"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(CreateSubmissionResponse {
            message: "Submission queued for processing",
            submission_id: model.id,
        }),
    ))
}

/// Owner-scoped read: status, source, and for failed verdicts the captured
/// output plus the failing test case's input and expected output.
#[instrument(skip(state, auth_user), fields(submission_id = %id))]
pub async fn get_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionDetail>, AppError> {
    let detail = state
        .store
        .get_submission_for_user(id, auth_user.user_id)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                AppError::NotFound("Submission not found".into())
            } else {
                AppError::from(e)
            }
        })?;

    Ok(Json(detail))
}

/// The caller's submissions for one problem, newest first.
#[instrument(skip(state, auth_user), fields(problem_id = %problem_id, user_id = auth_user.user_id))]
pub async fn list_problem_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(problem_id): Path<i32>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    let submissions = state
        .store
        .list_submissions(auth_user.user_id, problem_id)
        .await?
        .into_iter()
        .map(SubmissionListItem::from)
        .collect();

    Ok(Json(SubmissionListResponse { submissions }))
}
