//! The three reference tables share one shape: `{id, name, created_at, updated_at}`.

use crate::contract::model::ReferenceEntity;

macro_rules! reference_table {
    ($module:ident, $table:tt) => {
        pub mod $module {
            use chrono::{DateTime, Utc};
            use sea_orm::entity::prelude::*;

            #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
            #[sea_orm(table_name = $table)]
            pub struct Model {
                #[sea_orm(primary_key)]
                pub id: i32,
                pub name: String,
                pub created_at: DateTime<Utc>,
                pub updated_at: DateTime<Utc>,
            }

            #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
            pub enum Relation {}

            impl ActiveModelBehavior for ActiveModel {}
        }

        impl From<$module::Model> for ReferenceEntity {
            fn from(m: $module::Model) -> Self {
                Self {
                    id: m.id,
                    name: m.name,
                    created_at: Some(m.created_at),
                    updated_at: Some(m.updated_at),
                }
            }
        }
    };
}

reference_table!(user_category, "user_categories");
reference_table!(role, "roles");
reference_table!(skill_category, "skill_categories");
