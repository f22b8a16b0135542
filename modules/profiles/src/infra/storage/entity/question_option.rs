use sea_orm::entity::prelude::*;

use crate::contract::model::QuestionOption;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "question_options")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub question_id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for QuestionOption {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            question_id: m.question_id,
            name: m.name,
        }
    }
}
