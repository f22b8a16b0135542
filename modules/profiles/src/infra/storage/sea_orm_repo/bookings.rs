use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::contract::model::{Booking, BookingDetails, NewBooking};
use crate::domain::paging::PageRequest;
use crate::domain::repo::BookingsRepository;
use crate::infra::storage::entity::{booking, booking_question, booking_skill};

use super::fetch_page;

pub struct SeaOrmBookingsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmBookingsRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

fn booking_order_column(field: &str) -> booking::Column {
    match field {
        "id" => booking::Column::Id,
        "booking_date_time" => booking::Column::BookingDateTime,
        "updated_at" => booking::Column::UpdatedAt,
        _ => booking::Column::CreatedAt,
    }
}

async fn linked_ids<C: ConnectionTrait>(
    conn: &C,
    booking_id: i32,
) -> anyhow::Result<(Vec<i32>, Vec<i32>)> {
    let questions = booking_question::Entity::find()
        .filter(booking_question::Column::BookingId.eq(booking_id))
        .order_by_asc(booking_question::Column::QuestionId)
        .all(conn)
        .await
        .context("load booking questions failed")?
        .into_iter()
        .map(|l| l.question_id)
        .collect();
    let skills = booking_skill::Entity::find()
        .filter(booking_skill::Column::BookingId.eq(booking_id))
        .order_by_asc(booking_skill::Column::SkillId)
        .all(conn)
        .await
        .context("load booking skills failed")?
        .into_iter()
        .map(|l| l.skill_id)
        .collect();
    Ok((questions, skills))
}

pub(crate) async fn bookings_of_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> anyhow::Result<Vec<Booking>> {
    let rows = booking::Entity::find()
        .filter(booking::Column::UserId.eq(user_id))
        .filter(booking::Column::DeletedAt.is_null())
        .order_by_asc(booking::Column::BookingDateTime)
        .all(conn)
        .await
        .context("load bookings failed")?;
    Ok(rows.into_iter().map(Into::into).collect())
}

#[async_trait::async_trait]
impl BookingsRepository for SeaOrmBookingsRepository {
    async fn insert(&self, new: NewBooking) -> anyhow::Result<BookingDetails> {
        let now = Utc::now();
        let txn = self.conn.begin().await.context("begin failed")?;
        let created = booking::ActiveModel {
            id: NotSet,
            user_id: Set(new.user_id),
            booking_date_time: Set(new.booking_date_time),
            meeting_link: Set(new.meeting_link),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await
        .context("insert booking failed")?;

        if !new.question_ids.is_empty() {
            let links = new.question_ids.iter().map(|question_id| booking_question::ActiveModel {
                booking_id: Set(created.id),
                question_id: Set(*question_id),
            });
            booking_question::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await
                .context("link questions to booking failed")?;
        }
        if !new.skill_ids.is_empty() {
            let links = new.skill_ids.iter().map(|skill_id| booking_skill::ActiveModel {
                booking_id: Set(created.id),
                skill_id: Set(*skill_id),
            });
            booking_skill::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await
                .context("link skills to booking failed")?;
        }

        let (question_ids, skill_ids) = linked_ids(&txn, created.id).await?;
        txn.commit().await.context("commit failed")?;
        Ok(BookingDetails {
            booking: created.into(),
            question_ids,
            skill_ids,
        })
    }

    async fn find(&self, id: i32) -> anyhow::Result<Option<BookingDetails>> {
        let Some(found) = booking::Entity::find_by_id(id)
            .filter(booking::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("find booking failed")?
        else {
            return Ok(None);
        };
        let (question_ids, skill_ids) = linked_ids(&self.conn, id).await?;
        Ok(Some(BookingDetails {
            booking: found.into(),
            question_ids,
            skill_ids,
        }))
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        req: &PageRequest,
    ) -> anyhow::Result<(Vec<Booking>, u64)> {
        let select = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .filter(booking::Column::DeletedAt.is_null());
        let (rows, total) = fetch_page(
            select,
            &self.conn,
            req,
            booking_order_column(&req.order.field),
            booking::Column::Id,
        )
        .await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn soft_delete(&self, id: i32) -> anyhow::Result<bool> {
        let now = Utc::now();
        let res = booking::Entity::update_many()
            .col_expr(booking::Column::DeletedAt, Expr::value(now))
            .col_expr(booking::Column::UpdatedAt, Expr::value(now))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::DeletedAt.is_null())
            .exec(&self.conn)
            .await
            .context("soft delete booking failed")?;
        Ok(res.rows_affected > 0)
    }
}
