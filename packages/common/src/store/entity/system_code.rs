use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-problem, per-language test harness appended to the user solution.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_code")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub problem_id: i32,
    pub language_id: i32,

    #[sea_orm(column_type = "Text")]
    pub code: String,

    #[sea_orm(belongs_to, from = "problem_id", to = "id")]
    pub problem: HasOne<super::problem::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
