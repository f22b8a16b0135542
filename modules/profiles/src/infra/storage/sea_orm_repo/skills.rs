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
use crate::domain::repo::SkillsRepository;
use crate::infra::storage::entity::{skill, skill_category, user_skill};

use super::{contains_ci, fetch_page};

pub struct SeaOrmSkillsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmSkillsRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

fn skill_order_column(field: &str) -> skill::Column {
    match field {
        "id" => skill::Column::Id,
        "name" => skill::Column::Name,
        "updated_at" => skill::Column::UpdatedAt,
        _ => skill::Column::CreatedAt,
    }
}

fn category_order_column(field: &str) -> skill_category::Column {
    match field {
        "id" => skill_category::Column::Id,
        "name" => skill_category::Column::Name,
        "updated_at" => skill_category::Column::UpdatedAt,
        _ => skill_category::Column::CreatedAt,
    }
}

/// Load categories for a set of skills in one query.
async fn categories_by_id<C: ConnectionTrait>(
    conn: &C,
    skills: &[Skill],
) -> anyhow::Result<HashMap<i32, ReferenceEntity>> {
    let mut ids: Vec<i32> = skills.iter().map(|s| s.skill_category_id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = skill_category::Entity::find()
        .filter(skill_category::Column::Id.is_in(ids))
        .all(conn)
        .await
        .context("load skill categories failed")?;
    Ok(rows.into_iter().map(|m| (m.id, m.into())).collect())
}

async fn with_categories<C: ConnectionTrait>(
    conn: &C,
    skills: Vec<Skill>,
) -> anyhow::Result<Vec<SkillDetails>> {
    let categories = categories_by_id(conn, &skills).await?;
    Ok(skills
        .into_iter()
        .map(|skill| SkillDetails {
            category: categories.get(&skill.skill_category_id).cloned(),
            skill,
        })
        .collect())
}

/// Live skills with the given ids, ordered by id.
pub(crate) async fn live_skills<C: ConnectionTrait>(
    conn: &C,
    ids: Vec<i32>,
) -> anyhow::Result<Vec<Skill>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = skill::Entity::find()
        .filter(skill::Column::Id.is_in(ids))
        .filter(skill::Column::DeletedAt.is_null())
        .order_by_asc(skill::Column::Id)
        .all(conn)
        .await
        .context("load skills failed")?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub(crate) async fn skills_of_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> anyhow::Result<Vec<UserSkill>> {
    let links = user_skill::Entity::find()
        .filter(user_skill::Column::UserId.eq(user_id))
        .all(conn)
        .await
        .context("load user skills failed")?;
    let levels: HashMap<i32, Option<String>> = links
        .into_iter()
        .map(|l| (l.skill_id, l.skill_level))
        .collect();

    let skills = live_skills(conn, levels.keys().copied().collect()).await?;
    let details = with_categories(conn, skills).await?;
    Ok(details
        .into_iter()
        .map(|d| UserSkill {
            skill_level: levels.get(&d.skill.id).cloned().flatten(),
            skill: d.skill,
            category: d.category,
        })
        .collect())
}

#[async_trait::async_trait]
impl SkillsRepository for SeaOrmSkillsRepository {
    async fn insert_categories(&self, names: &[String]) -> anyhow::Result<Vec<ReferenceEntity>> {
        let now = Utc::now();
        let txn = self.conn.begin().await.context("begin failed")?;
        let mut created = Vec::with_capacity(names.len());
        for name in names {
            let m = skill_category::ActiveModel {
                id: NotSet,
                name: Set(name.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .with_context(|| format!("insert skill category '{name}' failed"))?;
            created.push(m.into());
        }
        txn.commit().await.context("commit failed")?;
        Ok(created)
    }

    async fn find_category(&self, id: i32) -> anyhow::Result<Option<ReferenceEntity>> {
        let found = skill_category::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find skill category failed")?;
        Ok(found.map(Into::into))
    }

    async fn list_categories(
        &self,
        req: &PageRequest,
    ) -> anyhow::Result<(Vec<ReferenceEntity>, u64)> {
        let mut select = skill_category::Entity::find();
        if let Some(keyword) = &req.keyword {
            select = select.filter(contains_ci(skill_category::Column::Name, keyword));
        }
        let (rows, total) = fetch_page(
            select,
            &self.conn,
            req,
            category_order_column(&req.order.field),
            skill_category::Column::Id,
        )
        .await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn rename_category(
        &self,
        id: i32,
        name: &str,
    ) -> anyhow::Result<Option<ReferenceEntity>> {
        let res = skill_category::Entity::update_many()
            .col_expr(skill_category::Column::Name, Expr::value(name))
            .col_expr(skill_category::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(skill_category::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("rename skill category failed")?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        self.find_category(id).await
    }

    async fn delete_category(&self, id: i32) -> anyhow::Result<bool> {
        let res = skill_category::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete skill category failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn insert(&self, new: NewSkill) -> anyhow::Result<Skill> {
        let now = Utc::now();
        let txn = self.conn.begin().await.context("begin failed")?;
        let created = skill::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            icon: Set(new.icon),
            skill_category_id: Set(new.skill_category_id),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await
        .context("insert skill failed")?;

        if let Some(user_id) = new.user_id {
            user_skill::Entity::insert(user_skill::ActiveModel {
                user_id: Set(user_id),
                skill_id: Set(created.id),
                skill_level: Set(new.skill_level),
            })
            .exec_without_returning(&txn)
            .await
            .context("link skill to user failed")?;
        }
        txn.commit().await.context("commit failed")?;
        Ok(created.into())
    }

    async fn find(&self, id: i32) -> anyhow::Result<Option<SkillDetails>> {
        let mut found = live_skills(&self.conn, vec![id]).await?;
        let Some(skill) = found.pop() else {
            return Ok(None);
        };
        let mut details = with_categories(&self.conn, vec![skill]).await?;
        Ok(details.pop())
    }

    async fn list(&self, req: &PageRequest) -> anyhow::Result<(Vec<SkillDetails>, u64)> {
        let mut select = skill::Entity::find().filter(skill::Column::DeletedAt.is_null());
        if let Some(keyword) = &req.keyword {
            select = select.filter(contains_ci(skill::Column::Name, keyword));
        }
        let (rows, total) = fetch_page(
            select,
            &self.conn,
            req,
            skill_order_column(&req.order.field),
            skill::Column::Id,
        )
        .await?;
        let skills = rows.into_iter().map(Into::into).collect();
        Ok((with_categories(&self.conn, skills).await?, total))
    }

    async fn update(&self, s: &Skill) -> anyhow::Result<()> {
        skill::ActiveModel {
            id: Unchanged(s.id),
            name: Set(s.name.clone()),
            icon: Set(s.icon.clone()),
            skill_category_id: Set(s.skill_category_id),
            created_at: NotSet,
            updated_at: Set(s.updated_at),
            deleted_at: NotSet,
        }
        .update(&self.conn)
        .await
        .context("update skill failed")?;
        Ok(())
    }

    async fn soft_delete(&self, id: i32) -> anyhow::Result<bool> {
        let now = Utc::now();
        let res = skill::Entity::update_many()
            .col_expr(skill::Column::DeletedAt, Expr::value(now))
            .col_expr(skill::Column::UpdatedAt, Expr::value(now))
            .filter(skill::Column::Id.eq(id))
            .filter(skill::Column::DeletedAt.is_null())
            .exec(&self.conn)
            .await
            .context("soft delete skill failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn existing_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<i32>> {
        let skills = live_skills(&self.conn, ids.to_vec()).await?;
        Ok(skills.into_iter().map(|s| s.id).collect())
    }
}
