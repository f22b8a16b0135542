use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::contract::model::{NewQuestion, Question, QuestionDetails};
use crate::domain::paging::PageRequest;
use crate::domain::repo::QuestionsRepository;
use crate::infra::storage::entity::{question, question_option};

use super::{contains_ci, fetch_page};

pub struct SeaOrmQuestionsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmQuestionsRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

fn question_order_column(field: &str) -> question::Column {
    match field {
        "id" => question::Column::Id,
        "question" => question::Column::Question,
        "question_type" => question::Column::QuestionType,
        "updated_at" => question::Column::UpdatedAt,
        _ => question::Column::CreatedAt,
    }
}

async fn load_details<C: ConnectionTrait>(
    conn: &C,
    found: question::Model,
) -> anyhow::Result<QuestionDetails> {
    let options = question_option::Entity::find()
        .filter(question_option::Column::QuestionId.eq(found.id))
        .order_by_asc(question_option::Column::Id)
        .all(conn)
        .await
        .context("load question options failed")?;
    Ok(QuestionDetails {
        question: found.into(),
        options: options.into_iter().map(Into::into).collect(),
    })
}

#[async_trait::async_trait]
impl QuestionsRepository for SeaOrmQuestionsRepository {
    async fn insert(&self, new: NewQuestion) -> anyhow::Result<QuestionDetails> {
        let now = Utc::now();
        let txn = self.conn.begin().await.context("begin failed")?;
        let created = question::ActiveModel {
            id: NotSet,
            question: Set(new.question),
            question_type: Set(new.question_type),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await
        .context("insert question failed")?;

        for name in new.options {
            question_option::ActiveModel {
                id: NotSet,
                question_id: Set(created.id),
                name: Set(name),
            }
            .insert(&txn)
            .await
            .context("insert question option failed")?;
        }

        let details = load_details(&txn, created).await?;
        txn.commit().await.context("commit failed")?;
        Ok(details)
    }

    async fn find(&self, id: i32) -> anyhow::Result<Option<QuestionDetails>> {
        let found = question::Entity::find_by_id(id)
            .filter(question::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("find question failed")?;
        match found {
            Some(m) => Ok(Some(load_details(&self.conn, m).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self, req: &PageRequest) -> anyhow::Result<(Vec<Question>, u64)> {
        let mut select = question::Entity::find().filter(question::Column::DeletedAt.is_null());
        if let Some(keyword) = &req.keyword {
            select = select.filter(contains_ci(question::Column::Question, keyword));
        }
        let (rows, total) = fetch_page(
            select,
            &self.conn,
            req,
            question_order_column(&req.order.field),
            question::Column::Id,
        )
        .await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn soft_delete(&self, id: i32) -> anyhow::Result<bool> {
        let now = Utc::now();
        let res = question::Entity::update_many()
            .col_expr(question::Column::DeletedAt, Expr::value(now))
            .col_expr(question::Column::UpdatedAt, Expr::value(now))
            .filter(question::Column::Id.eq(id))
            .filter(question::Column::DeletedAt.is_null())
            .exec(&self.conn)
            .await
            .context("soft delete question failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn existing_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = question::Entity::find()
            .filter(question::Column::Id.is_in(ids.to_vec()))
            .filter(question::Column::DeletedAt.is_null())
            .all(&self.conn)
            .await
            .context("question lookup failed")?;
        Ok(rows.into_iter().map(|q| q.id).collect())
    }
}
