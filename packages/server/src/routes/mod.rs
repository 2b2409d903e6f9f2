use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
        .route("/problems", get(handlers::problem::list_problems))
        .route("/problems/{id}", get(handlers::problem::get_problem))
        .route(
            "/problems/{id}/submissions",
            get(handlers::submission::list_problem_submissions),
        )
        .route(
            "/submissions",
            post(handlers::submission::create_submission),
        )
        .route(
            "/submissions/{id}",
            get(handlers::submission::get_submission),
        )
}
