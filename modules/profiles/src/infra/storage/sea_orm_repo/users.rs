use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::contract::model::*;
use crate::domain::paging::PageRequest;
use crate::domain::repo::{EducationRepository, UsersRepository};
use crate::infra::storage::entity::{education, role, user, user_category, user_role};

use super::{bookings, contains_ci, experience, fetch_page, projects, skills};

pub struct SeaOrmUsersRepository {
    conn: DatabaseConnection,
}

impl SeaOrmUsersRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

fn user_order_column(field: &str) -> user::Column {
    match field {
        "id" => user::Column::Id,
        "first_name" => user::Column::FirstName,
        "last_name" => user::Column::LastName,
        "email" => user::Column::Email,
        "updated_at" => user::Column::UpdatedAt,
        _ => user::Column::CreatedAt,
    }
}

pub(crate) async fn find_live_user<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> anyhow::Result<Option<User>> {
    let found = user::Entity::find_by_id(id)
        .filter(user::Column::DeletedAt.is_null())
        .one(conn)
        .await
        .context("find user failed")?;
    Ok(found.map(Into::into))
}

async fn roles_of<C: ConnectionTrait>(conn: &C, user_id: i32) -> anyhow::Result<Vec<ReferenceEntity>> {
    let role_ids: Vec<i32> = user_role::Entity::find()
        .filter(user_role::Column::UserId.eq(user_id))
        .all(conn)
        .await
        .context("load user roles failed")?
        .into_iter()
        .map(|link| link.role_id)
        .collect();
    if role_ids.is_empty() {
        return Ok(Vec::new());
    }
    let roles = role::Entity::find()
        .filter(role::Column::Id.is_in(role_ids))
        .order_by_asc(role::Column::Id)
        .all(conn)
        .await
        .context("load roles failed")?;
    Ok(roles.into_iter().map(Into::into).collect())
}

#[async_trait::async_trait]
impl UsersRepository for SeaOrmUsersRepository {
    async fn insert(&self, u: NewUser) -> anyhow::Result<User> {
        let now = Utc::now();
        let m = user::ActiveModel {
            id: NotSet,
            first_name: Set(u.first_name),
            last_name: Set(u.last_name),
            email: Set(u.email),
            mobile_number: Set(u.mobile_number),
            bio: Set(u.bio),
            location: Set(u.location),
            video_url: Set(u.video_url),
            certifications: Set(u.certifications),
            user_category_id: Set(u.user_category_id),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };
        let created = m.insert(&self.conn).await.context("insert user failed")?;
        Ok(created.into())
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        find_live_user(&self.conn, id).await
    }

    async fn list(&self, req: &PageRequest) -> anyhow::Result<(Vec<User>, u64)> {
        let mut select = user::Entity::find().filter(user::Column::DeletedAt.is_null());
        if let Some(keyword) = &req.keyword {
            select = select.filter(contains_ci(user::Column::FirstName, keyword));
        }
        let (rows, total) = fetch_page(
            select,
            &self.conn,
            req,
            user_order_column(&req.order.field),
            user::Column::Id,
        )
        .await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn update(&self, u: &User) -> anyhow::Result<()> {
        let m = user::ActiveModel {
            id: Unchanged(u.id),
            first_name: Set(u.first_name.clone()),
            last_name: Set(u.last_name.clone()),
            email: Set(u.email.clone()),
            mobile_number: Set(u.mobile_number.clone()),
            bio: Set(u.bio.clone()),
            location: Set(u.location.clone()),
            video_url: Set(u.video_url.clone()),
            certifications: Set(u.certifications.clone()),
            user_category_id: Set(u.user_category_id),
            created_at: NotSet,
            updated_at: Set(u.updated_at),
            deleted_at: NotSet,
        };
        m.update(&self.conn).await.context("update user failed")?;
        Ok(())
    }

    async fn soft_delete(&self, id: i32) -> anyhow::Result<bool> {
        let now = Utc::now();
        let res = user::Entity::update_many()
            .col_expr(user::Column::DeletedAt, Expr::value(now))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::DeletedAt.is_null())
            .exec(&self.conn)
            .await
            .context("soft delete user failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn details(&self, id: i32) -> anyhow::Result<Option<UserDetails>> {
        let conn = &self.conn;
        let Some(user) = find_live_user(conn, id).await? else {
            return Ok(None);
        };

        let category = match user.user_category_id {
            Some(category_id) => user_category::Entity::find_by_id(category_id)
                .one(conn)
                .await
                .context("load user category failed")?
                .map(Into::into),
            None => None,
        };
        let roles = roles_of(conn, id).await?;
        let skills = skills::skills_of_user(conn, id).await?;
        let educations = education::Entity::find()
            .filter(education::Column::UserId.eq(id))
            .order_by_desc(education::Column::StartDate)
            .all(conn)
            .await
            .context("load educations failed")?
            .into_iter()
            .map(Into::into)
            .collect();
        let experiences = experience::experiences_of_user(conn, id).await?;
        let projects = projects::projects_of_user(conn, id).await?;
        let bookings = bookings::bookings_of_user(conn, id).await?;

        Ok(Some(UserDetails {
            user,
            category,
            roles,
            skills,
            educations,
            experiences,
            projects,
            bookings,
        }))
    }

    async fn replace_roles(&self, user_id: i32, role_ids: &[i32]) -> anyhow::Result<()> {
        let txn = self.conn.begin().await.context("begin failed")?;
        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .context("clear user roles failed")?;
        if !role_ids.is_empty() {
            let links = role_ids.iter().map(|role_id| user_role::ActiveModel {
                user_id: Set(user_id),
                role_id: Set(*role_id),
            });
            user_role::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await
                .context("insert user roles failed")?;
        }
        txn.commit().await.context("commit failed")?;
        Ok(())
    }

    async fn roles_for(&self, user_id: i32) -> anyhow::Result<Vec<ReferenceEntity>> {
        roles_of(&self.conn, user_id).await
    }

    async fn existing_role_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = role::Entity::find()
            .filter(role::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await
            .context("role lookup failed")?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    async fn list_roles(&self) -> anyhow::Result<Vec<ReferenceEntity>> {
        let rows = role::Entity::find()
            .order_by_asc(role::Column::Id)
            .all(&self.conn)
            .await
            .context("list roles failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_user_categories(&self) -> anyhow::Result<Vec<ReferenceEntity>> {
        let rows = user_category::Entity::find()
            .order_by_asc(user_category::Column::Id)
            .all(&self.conn)
            .await
            .context("list user categories failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn user_category_exists(&self, id: i32) -> anyhow::Result<bool> {
        let found = user_category::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("user category lookup failed")?;
        Ok(found.is_some())
    }
}

pub struct SeaOrmEducationRepository {
    conn: DatabaseConnection,
}

impl SeaOrmEducationRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

fn education_order_column(field: &str) -> education::Column {
    match field {
        "id" => education::Column::Id,
        "institution_name" => education::Column::InstitutionName,
        "start_date" => education::Column::StartDate,
        "end_date" => education::Column::EndDate,
        "updated_at" => education::Column::UpdatedAt,
        _ => education::Column::CreatedAt,
    }
}

#[async_trait::async_trait]
impl EducationRepository for SeaOrmEducationRepository {
    async fn insert(&self, e: NewEducation) -> anyhow::Result<Education> {
        let now = Utc::now();
        let m = education::ActiveModel {
            id: NotSet,
            user_id: Set(e.user_id),
            institution_name: Set(e.institution_name),
            degree: Set(e.degree),
            field_of_study: Set(e.field_of_study),
            achievements: Set(e.achievements),
            start_date: Set(e.start_date),
            end_date: Set(e.end_date),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = m
            .insert(&self.conn)
            .await
            .context("insert education failed")?;
        Ok(created.into())
    }

    async fn find(&self, user_id: i32, id: i32) -> anyhow::Result<Option<Education>> {
        let found = education::Entity::find_by_id(id)
            .filter(education::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("find education failed")?;
        Ok(found.map(Into::into))
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        req: &PageRequest,
    ) -> anyhow::Result<(Vec<Education>, u64)> {
        let select = education::Entity::find().filter(education::Column::UserId.eq(user_id));
        let (rows, total) = fetch_page(
            select,
            &self.conn,
            req,
            education_order_column(&req.order.field),
            education::Column::Id,
        )
        .await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn update(&self, e: &Education) -> anyhow::Result<()> {
        let m = education::ActiveModel {
            id: Unchanged(e.id),
            user_id: NotSet,
            institution_name: Set(e.institution_name.clone()),
            degree: Set(e.degree.clone()),
            field_of_study: Set(e.field_of_study.clone()),
            achievements: Set(e.achievements.clone()),
            start_date: Set(e.start_date),
            end_date: Set(e.end_date),
            created_at: NotSet,
            updated_at: Set(e.updated_at),
        };
        m.update(&self.conn)
            .await
            .context("update education failed")?;
        Ok(())
    }

    async fn delete(&self, user_id: i32, id: i32) -> anyhow::Result<bool> {
        let res = education::Entity::delete_many()
            .filter(education::Column::Id.eq(id))
            .filter(education::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("delete education failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_for_user(&self, user_id: i32) -> anyhow::Result<u64> {
        let res = education::Entity::delete_many()
            .filter(education::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("delete educations failed")?;
        Ok(res.rows_affected)
    }
}
