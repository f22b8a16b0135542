use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::contract::model::Question;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub question: String,
    pub question_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Question {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            question: m.question,
            question_type: m.question_type,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
