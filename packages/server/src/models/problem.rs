use common::store::entity::problem;
use serde::Serialize;

#[derive(Serialize)]
pub struct ProblemListItem {
    pub id: i32,
    pub title: String,
    pub difficulty: String,
}

#[derive(Serialize)]
pub struct ProblemListResponse {
    pub problems: Vec<ProblemListItem>,
}

#[derive(Serialize)]
pub struct ProblemDetail {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub sample_input: String,
    pub sample_output: String,
}

impl From<problem::Model> for ProblemListItem {
    fn from(model: problem::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            difficulty: model.difficulty,
        }
    }
}

impl From<problem::Model> for ProblemDetail {
    fn from(model: problem::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            difficulty: model.difficulty,
            sample_input: model.sample_input,
            sample_output: model.sample_output,
        }
    }
}
