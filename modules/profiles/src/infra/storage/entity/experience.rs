use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

use crate::contract::model::Experience;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "experiences")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub position: String,
    pub company: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_currently_working: bool,
    pub responsibilities: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Experience {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            position: m.position,
            company: m.company,
            description: m.description,
            start_date: m.start_date,
            end_date: m.end_date,
            is_currently_working: m.is_currently_working,
            responsibilities: m.responsibilities,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
