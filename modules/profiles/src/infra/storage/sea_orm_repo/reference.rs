use anyhow::Context;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ConnectionTrait, DbBackend, EntityTrait, Set, Statement,
};
use tracing::debug;

use crate::contract::model::{ReferenceEntity, ReferenceKind};
use crate::domain::reconcile::ReferenceStore;
use crate::infra::storage::entity::{role, skill_category, user_category};

/// Reference store over one of the three lookup tables.
pub struct SeaOrmReferenceStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
    kind: ReferenceKind,
}

impl<C> SeaOrmReferenceStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C, kind: ReferenceKind) -> Self {
        Self { conn, kind }
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }
}

/// Postgres `SERIAL` sequences do not move on explicit-id inserts. Other
/// backends track the max id on their own and get `None`.
pub(crate) fn sequence_reset_sql(backend: DbBackend, table: &str) -> Option<String> {
    if backend != DbBackend::Postgres {
        return None;
    }
    Some(format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
         COALESCE((SELECT MAX(id) FROM {table}), 1), \
         (SELECT MAX(id) FROM {table}) IS NOT NULL)"
    ))
}

#[async_trait::async_trait]
impl<C> ReferenceStore for SeaOrmReferenceStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<ReferenceEntity>> {
        let found = match self.kind {
            ReferenceKind::UserCategory => user_category::Entity::find_by_id(id)
                .one(&self.conn)
                .await
                .map(|m| m.map(Into::into)),
            ReferenceKind::Role => role::Entity::find_by_id(id)
                .one(&self.conn)
                .await
                .map(|m| m.map(Into::into)),
            ReferenceKind::SkillCategory => skill_category::Entity::find_by_id(id)
                .one(&self.conn)
                .await
                .map(|m| m.map(Into::into)),
        };
        found.with_context(|| format!("find_by_id on {} failed", self.kind))
    }

    async fn insert(&self, e: &ReferenceEntity) -> anyhow::Result<()> {
        let now = Utc::now();
        let res = match self.kind {
            ReferenceKind::UserCategory => user_category::ActiveModel {
                id: Set(e.id),
                name: Set(e.name.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&self.conn)
            .await
            .map(drop),
            ReferenceKind::Role => role::ActiveModel {
                id: Set(e.id),
                name: Set(e.name.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&self.conn)
            .await
            .map(drop),
            ReferenceKind::SkillCategory => skill_category::ActiveModel {
                id: Set(e.id),
                name: Set(e.name.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&self.conn)
            .await
            .map(drop),
        };
        res.with_context(|| format!("insert into {} failed", self.kind))
    }

    async fn update_by_id(&self, id: i32, e: &ReferenceEntity) -> anyhow::Result<()> {
        let now = Utc::now();
        let res = match self.kind {
            ReferenceKind::UserCategory => user_category::ActiveModel {
                id: Unchanged(id),
                name: Set(e.name.clone()),
                updated_at: Set(now),
                ..Default::default()
            }
            .update(&self.conn)
            .await
            .map(drop),
            ReferenceKind::Role => role::ActiveModel {
                id: Unchanged(id),
                name: Set(e.name.clone()),
                updated_at: Set(now),
                ..Default::default()
            }
            .update(&self.conn)
            .await
            .map(drop),
            ReferenceKind::SkillCategory => skill_category::ActiveModel {
                id: Unchanged(id),
                name: Set(e.name.clone()),
                updated_at: Set(now),
                ..Default::default()
            }
            .update(&self.conn)
            .await
            .map(drop),
        };
        res.with_context(|| format!("update of {} failed", self.kind))
    }

    async fn sync_id_sequence(&self) -> anyhow::Result<()> {
        let backend = self.conn.get_database_backend();
        let Some(sql) = sequence_reset_sql(backend, self.kind.table()) else {
            return Ok(());
        };
        self.conn
            .execute(Statement::from_string(backend, sql))
            .await
            .with_context(|| format!("id sequence sync for {} failed", self.kind))?;
        debug!(kind = %self.kind, "Id sequence moved past seeded rows");
        Ok(())
    }
}
