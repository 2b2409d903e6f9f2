use axum::{
    Json,
    extract::{Path, State},
};
use sea_orm::EntityTrait;
use tracing::instrument;

use common::store::entity::problem;

use crate::error::AppError;
use crate::models::problem::{ProblemDetail, ProblemListItem, ProblemListResponse};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn list_problems(
    State(state): State<AppState>,
) -> Result<Json<ProblemListResponse>, AppError> {
    let problems = problem::Entity::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(ProblemListItem::from)
        .collect();

    Ok(Json(ProblemListResponse { problems }))
}

#[instrument(skip(state), fields(problem_id = %id))]
pub async fn get_problem(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProblemDetail>, AppError> {
    let model = problem::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Problem not found".into()))?;

    Ok(Json(ProblemDetail::from(model)))
}
