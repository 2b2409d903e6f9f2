use crate::SubmissionStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    pub problem_id: i32,
    pub language_id: i32,

    #[sea_orm(column_type = "Text")]
    pub source_code: String,

    pub status: SubmissionStatus,

    /// Id of the first failing test case; NULL unless the verdict names one.
    pub wrong_testcase: Option<i32>,
    /// Captured program or compiler output for non-accepted verdicts.
    #[sea_orm(column_type = "Text", nullable)]
    pub program_output: Option<String>,

    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,
    #[sea_orm(belongs_to, from = "problem_id", to = "id")]
    pub problem: HasOne<super::problem::Entity>,

    pub submitted_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
