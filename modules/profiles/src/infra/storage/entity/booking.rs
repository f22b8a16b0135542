use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::contract::model::Booking;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub booking_date_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Booking {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            booking_date_time: m.booking_date_time,
            meeting_link: m.meeting_link,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
