use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::contract::model::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub video_url: Option<String>,
    pub certifications: Option<String>,
    pub user_category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            mobile_number: m.mobile_number,
            bio: m.bio,
            location: m.location,
            video_url: m.video_url,
            certifications: m.certifications,
            user_category_id: m.user_category_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
