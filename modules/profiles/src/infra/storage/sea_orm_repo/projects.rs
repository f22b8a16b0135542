use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::contract::model::{NewProject, Project};
use crate::domain::paging::PageRequest;
use crate::domain::repo::ProjectsRepository;
use crate::infra::storage::entity::{project, user_project};

use super::{contains_ci, fetch_page};

pub struct SeaOrmProjectsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmProjectsRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

fn project_order_column(field: &str) -> project::Column {
    match field {
        "id" => project::Column::Id,
        "name" => project::Column::Name,
        "updated_at" => project::Column::UpdatedAt,
        _ => project::Column::CreatedAt,
    }
}

async fn project_ids_of_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> anyhow::Result<Vec<i32>> {
    let links = user_project::Entity::find()
        .filter(user_project::Column::UserId.eq(user_id))
        .all(conn)
        .await
        .context("load user project links failed")?;
    Ok(links.into_iter().map(|l| l.project_id).collect())
}

pub(crate) async fn projects_of_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> anyhow::Result<Vec<Project>> {
    let ids = project_ids_of_user(conn, user_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = project::Entity::find()
        .filter(project::Column::Id.is_in(ids))
        .filter(project::Column::DeletedAt.is_null())
        .order_by_asc(project::Column::Id)
        .all(conn)
        .await
        .context("load projects failed")?;
    Ok(rows.into_iter().map(Into::into).collect())
}

#[async_trait::async_trait]
impl ProjectsRepository for SeaOrmProjectsRepository {
    async fn insert(&self, user_id: i32, new: NewProject) -> anyhow::Result<Project> {
        let now = Utc::now();
        let txn = self.conn.begin().await.context("begin failed")?;
        let created = project::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            description: Set(new.description),
            link: Set(new.link),
            technologies: Set(new.technologies),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await
        .context("insert project failed")?;

        user_project::Entity::insert(user_project::ActiveModel {
            user_id: Set(user_id),
            project_id: Set(created.id),
        })
        .exec_without_returning(&txn)
        .await
        .context("link project to user failed")?;

        txn.commit().await.context("commit failed")?;
        Ok(created.into())
    }

    async fn find(&self, id: i32) -> anyhow::Result<Option<Project>> {
        let found = project::Entity::find_by_id(id)
            .filter(project::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("find project failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_for_user(&self, user_id: i32, id: i32) -> anyhow::Result<Option<Project>> {
        let linked = user_project::Entity::find_by_id((user_id, id))
            .one(&self.conn)
            .await
            .context("find project link failed")?;
        match linked {
            Some(_) => self.find(id).await,
            None => Ok(None),
        }
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        req: &PageRequest,
    ) -> anyhow::Result<(Vec<Project>, u64)> {
        let ids = project_ids_of_user(&self.conn, user_id).await?;
        let mut select = project::Entity::find()
            .filter(project::Column::Id.is_in(ids))
            .filter(project::Column::DeletedAt.is_null());
        if let Some(keyword) = &req.keyword {
            select = select.filter(contains_ci(project::Column::Name, keyword));
        }
        let (rows, total) = fetch_page(
            select,
            &self.conn,
            req,
            project_order_column(&req.order.field),
            project::Column::Id,
        )
        .await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn update(&self, p: &Project) -> anyhow::Result<()> {
        project::ActiveModel {
            id: Unchanged(p.id),
            name: Set(p.name.clone()),
            description: Set(p.description.clone()),
            link: Set(p.link.clone()),
            technologies: Set(p.technologies.clone()),
            created_at: NotSet,
            updated_at: Set(p.updated_at),
            deleted_at: NotSet,
        }
        .update(&self.conn)
        .await
        .context("update project failed")?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let now = Utc::now();
        let txn = self.conn.begin().await.context("begin failed")?;
        let res = project::Entity::update_many()
            .col_expr(project::Column::DeletedAt, Expr::value(now))
            .col_expr(project::Column::UpdatedAt, Expr::value(now))
            .filter(project::Column::Id.eq(id))
            .filter(project::Column::DeletedAt.is_null())
            .exec(&txn)
            .await
            .context("soft delete project failed")?;
        if res.rows_affected == 0 {
            txn.rollback().await.context("rollback failed")?;
            return Ok(false);
        }
        user_project::Entity::delete_many()
            .filter(user_project::Column::ProjectId.eq(id))
            .exec(&txn)
            .await
            .context("unlink project from users failed")?;
        txn.commit().await.context("commit failed")?;
        Ok(true)
    }

    async fn delete_for_user(&self, user_id: i32) -> anyhow::Result<u64> {
        let now = Utc::now();
        let txn = self.conn.begin().await.context("begin failed")?;
        let ids = project_ids_of_user(&txn, user_id).await?;
        if ids.is_empty() {
            txn.rollback().await.context("rollback failed")?;
            return Ok(0);
        }
        let res = project::Entity::update_many()
            .col_expr(project::Column::DeletedAt, Expr::value(now))
            .col_expr(project::Column::UpdatedAt, Expr::value(now))
            .filter(project::Column::Id.is_in(ids))
            .filter(project::Column::DeletedAt.is_null())
            .exec(&txn)
            .await
            .context("soft delete projects failed")?;
        user_project::Entity::delete_many()
            .filter(user_project::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .context("unlink user projects failed")?;
        txn.commit().await.context("commit failed")?;
        Ok(res.rows_affected)
    }
}
