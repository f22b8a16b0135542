use std::collections::HashMap;

use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::contract::model::*;
use crate::domain::paging::PageRequest;
use crate::domain::repo::ExperienceRepository;
use crate::infra::storage::entity::{experience, experience_skill, user_experience};

use super::{fetch_page, skills::live_skills};

pub struct SeaOrmExperienceRepository {
    conn: DatabaseConnection,
}

impl SeaOrmExperienceRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

fn experience_order_column(field: &str) -> experience::Column {
    match field {
        "id" => experience::Column::Id,
        "position" => experience::Column::Position,
        "company" => experience::Column::Company,
        "start_date" => experience::Column::StartDate,
        "end_date" => experience::Column::EndDate,
        "updated_at" => experience::Column::UpdatedAt,
        _ => experience::Column::CreatedAt,
    }
}

async fn experience_ids_of_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> anyhow::Result<Vec<i32>> {
    let links = user_experience::Entity::find()
        .filter(user_experience::Column::UserId.eq(user_id))
        .all(conn)
        .await
        .context("load user experience links failed")?;
    Ok(links.into_iter().map(|l| l.experience_id).collect())
}

/// Attach linked skills to each experience.
async fn with_skills<C: ConnectionTrait>(
    conn: &C,
    experiences: Vec<Experience>,
) -> anyhow::Result<Vec<ExperienceDetails>> {
    if experiences.is_empty() {
        return Ok(Vec::new());
    }
    let links = experience_skill::Entity::find()
        .filter(experience_skill::Column::ExperienceId.is_in(experiences.iter().map(|e| e.id)))
        .all(conn)
        .await
        .context("load experience skills failed")?;

    let skills = live_skills(conn, links.iter().map(|l| l.skill_id).collect()).await?;
    let skills: HashMap<i32, Skill> = skills.into_iter().map(|s| (s.id, s)).collect();

    let mut by_experience: HashMap<i32, Vec<Skill>> = HashMap::new();
    for link in links {
        if let Some(skill) = skills.get(&link.skill_id) {
            by_experience
                .entry(link.experience_id)
                .or_default()
                .push(skill.clone());
        }
    }

    Ok(experiences
        .into_iter()
        .map(|experience| ExperienceDetails {
            skills: by_experience.remove(&experience.id).unwrap_or_default(),
            experience,
        })
        .collect())
}

pub(crate) async fn experiences_of_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> anyhow::Result<Vec<ExperienceDetails>> {
    let ids = experience_ids_of_user(conn, user_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = experience::Entity::find()
        .filter(experience::Column::Id.is_in(ids))
        .filter(experience::Column::DeletedAt.is_null())
        .order_by_desc(experience::Column::StartDate)
        .all(conn)
        .await
        .context("load experiences failed")?;
    with_skills(conn, rows.into_iter().map(Into::into).collect()).await
}

#[async_trait::async_trait]
impl ExperienceRepository for SeaOrmExperienceRepository {
    async fn insert(
        &self,
        user_id: i32,
        skill_id: Option<i32>,
        new: NewExperience,
    ) -> anyhow::Result<ExperienceDetails> {
        let now = Utc::now();
        let txn = self.conn.begin().await.context("begin failed")?;

        let created = experience::ActiveModel {
            id: NotSet,
            position: Set(new.position),
            company: Set(new.company),
            description: Set(new.description),
            start_date: Set(new.start_date),
            end_date: Set(new.end_date),
            is_currently_working: Set(new.is_currently_working),
            responsibilities: Set(new.responsibilities),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await
        .context("insert experience failed")?;

        user_experience::Entity::insert(user_experience::ActiveModel {
            user_id: Set(user_id),
            experience_id: Set(created.id),
        })
        .exec_without_returning(&txn)
        .await
        .context("link experience to user failed")?;

        if let Some(skill_id) = skill_id {
            experience_skill::Entity::insert(experience_skill::ActiveModel {
                experience_id: Set(created.id),
                skill_id: Set(skill_id),
            })
            .exec_without_returning(&txn)
            .await
            .context("link skill to experience failed")?;
        }

        let mut details = with_skills(&txn, vec![created.into()]).await?;
        txn.commit().await.context("commit failed")?;
        details
            .pop()
            .context("inserted experience missing from its own transaction")
    }

    async fn find(&self, id: i32) -> anyhow::Result<Option<Experience>> {
        let found = experience::Entity::find_by_id(id)
            .filter(experience::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("find experience failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_for_user(
        &self,
        user_id: i32,
        id: i32,
    ) -> anyhow::Result<Option<ExperienceDetails>> {
        let linked = user_experience::Entity::find_by_id((user_id, id))
            .one(&self.conn)
            .await
            .context("find experience link failed")?;
        if linked.is_none() {
            return Ok(None);
        }
        let Some(found) = self.find(id).await? else {
            return Ok(None);
        };
        let mut details = with_skills(&self.conn, vec![found]).await?;
        Ok(details.pop())
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        req: &PageRequest,
    ) -> anyhow::Result<(Vec<ExperienceDetails>, u64)> {
        let ids = experience_ids_of_user(&self.conn, user_id).await?;
        let select = experience::Entity::find()
            .filter(experience::Column::Id.is_in(ids))
            .filter(experience::Column::DeletedAt.is_null());
        let (rows, total) = fetch_page(
            select,
            &self.conn,
            req,
            experience_order_column(&req.order.field),
            experience::Column::Id,
        )
        .await?;
        let details = with_skills(&self.conn, rows.into_iter().map(Into::into).collect()).await?;
        Ok((details, total))
    }

    async fn update(&self, e: &Experience) -> anyhow::Result<()> {
        experience::ActiveModel {
            id: Unchanged(e.id),
            position: Set(e.position.clone()),
            company: Set(e.company.clone()),
            description: Set(e.description.clone()),
            start_date: Set(e.start_date),
            end_date: Set(e.end_date),
            is_currently_working: Set(e.is_currently_working),
            responsibilities: Set(e.responsibilities.clone()),
            created_at: NotSet,
            updated_at: Set(e.updated_at),
            deleted_at: NotSet,
        }
        .update(&self.conn)
        .await
        .context("update experience failed")?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let now = Utc::now();
        let txn = self.conn.begin().await.context("begin failed")?;
        let res = experience::Entity::update_many()
            .col_expr(experience::Column::DeletedAt, Expr::value(now))
            .col_expr(experience::Column::UpdatedAt, Expr::value(now))
            .filter(experience::Column::Id.eq(id))
            .filter(experience::Column::DeletedAt.is_null())
            .exec(&txn)
            .await
            .context("soft delete experience failed")?;
        if res.rows_affected == 0 {
            txn.rollback().await.context("rollback failed")?;
            return Ok(false);
        }
        user_experience::Entity::delete_many()
            .filter(user_experience::Column::ExperienceId.eq(id))
            .exec(&txn)
            .await
            .context("unlink experience from users failed")?;
        experience_skill::Entity::delete_many()
            .filter(experience_skill::Column::ExperienceId.eq(id))
            .exec(&txn)
            .await
            .context("unlink experience skills failed")?;
        txn.commit().await.context("commit failed")?;
        Ok(true)
    }

    async fn delete_for_user(&self, user_id: i32) -> anyhow::Result<u64> {
        let now = Utc::now();
        let txn = self.conn.begin().await.context("begin failed")?;
        let ids = experience_ids_of_user(&txn, user_id).await?;
        if ids.is_empty() {
            txn.rollback().await.context("rollback failed")?;
            return Ok(0);
        }
        let res = experience::Entity::update_many()
            .col_expr(experience::Column::DeletedAt, Expr::value(now))
            .col_expr(experience::Column::UpdatedAt, Expr::value(now))
            .filter(experience::Column::Id.is_in(ids.clone()))
            .filter(experience::Column::DeletedAt.is_null())
            .exec(&txn)
            .await
            .context("soft delete experiences failed")?;
        user_experience::Entity::delete_many()
            .filter(user_experience::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .context("unlink user experiences failed")?;
        experience_skill::Entity::delete_many()
            .filter(experience_skill::Column::ExperienceId.is_in(ids))
            .exec(&txn)
            .await
            .context("unlink experience skills failed")?;
        txn.commit().await.context("commit failed")?;
        Ok(res.rows_affected)
    }
}
