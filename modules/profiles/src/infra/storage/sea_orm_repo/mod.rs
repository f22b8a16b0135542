//! SeaORM-backed implementations of the domain ports.
//!
//! The reference store is generic over `C: ConnectionTrait`, so it works with
//! a `DatabaseConnection` or a transaction. The CRUD repositories hold a
//! `DatabaseConnection` because they open transactions themselves; inside a
//! transaction every statement goes through the transaction handle.

mod bookings;
mod experience;
mod projects;
mod questions;
mod reference;
mod skills;
mod users;

pub use bookings::SeaOrmBookingsRepository;
pub use experience::SeaOrmExperienceRepository;
pub use projects::SeaOrmProjectsRepository;
pub use questions::SeaOrmQuestionsRepository;
pub use reference::SeaOrmReferenceStore;
pub use skills::SeaOrmSkillsRepository;
pub use users::{SeaOrmEducationRepository, SeaOrmUsersRepository};

use anyhow::Context;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, Order, PaginatorTrait, QueryOrder, QuerySelect,
    Select,
};

use crate::domain::paging::{PageRequest, SortDir};

impl From<SortDir> for Order {
    fn from(dir: SortDir) -> Self {
        match dir {
            SortDir::Asc => Order::Asc,
            SortDir::Desc => Order::Desc,
        }
    }
}

/// Count all matches, then fetch one page ordered by `order_col` with `id_col`
/// as a tiebreaker so pages are stable.
pub(crate) async fn fetch_page<E, C>(
    select: Select<E>,
    conn: &C,
    req: &PageRequest,
    order_col: E::Column,
    id_col: E::Column,
) -> anyhow::Result<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
    C: ConnectionTrait,
{
    let total = select
        .clone()
        .count(conn)
        .await
        .context("count failed")?;
    let rows = select
        .order_by(order_col, req.order.dir.into())
        .order_by(id_col, Order::Asc)
        .limit(req.limit)
        .offset(req.offset)
        .all(conn)
        .await
        .context("page query failed")?;
    Ok((rows, total))
}

/// `LOWER(col) LIKE '%keyword%' ESCAPE '\'`, with the keyword matched literally.
pub(crate) fn contains_ci<T: ColumnTrait>(col: T, keyword: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&keyword.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern).escape('\\'))
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("ada"), "ada");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
