use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::contract::model::Skill;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "skills")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub icon: Option<String>,
    pub skill_category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Skill {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            icon: m.icon,
            skill_category_id: m.skill_category_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
