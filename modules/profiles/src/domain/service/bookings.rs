use std::sync::Arc;

use tracing::{info, instrument};

use crate::contract::model::*;
use crate::domain::error::{db_err, DomainError};
use crate::domain::paging::{ListParams, Page};
use crate::domain::repo::{BookingsRepository, QuestionsRepository, SkillsRepository, UsersRepository};
use crate::domain::service::{dedup_ids, ensure_all_exist, ServiceConfig};

pub const BOOKING_ORDER_FIELDS: &[&str] = &["id", "booking_date_time", "created_at", "updated_at"];

#[derive(Clone)]
pub struct BookingsService {
    bookings: Arc<dyn BookingsRepository>,
    users: Arc<dyn UsersRepository>,
    questions: Arc<dyn QuestionsRepository>,
    skills: Arc<dyn SkillsRepository>,
    config: ServiceConfig,
}

impl BookingsService {
    pub fn new(
        bookings: Arc<dyn BookingsRepository>,
        users: Arc<dyn UsersRepository>,
        questions: Arc<dyn QuestionsRepository>,
        skills: Arc<dyn SkillsRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            bookings,
            users,
            questions,
            skills,
            config,
        }
    }

    #[instrument(name = "profiles.service.create_booking", skip(self, new), fields(user_id = %new.user_id))]
    pub async fn create_booking(&self, mut new: NewBooking) -> Result<BookingDetails, DomainError> {
        self.users
            .find_by_id(new.user_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("User", new.user_id))?;

        new.question_ids = dedup_ids(&new.question_ids);
        new.skill_ids = dedup_ids(&new.skill_ids);

        let questions = self
            .questions
            .existing_ids(&new.question_ids)
            .await
            .map_err(db_err)?;
        ensure_all_exist("Question", &new.question_ids, &questions)?;

        let skills = self
            .skills
            .existing_ids(&new.skill_ids)
            .await
            .map_err(db_err)?;
        ensure_all_exist("Skill", &new.skill_ids, &skills)?;

        let created = self.bookings.insert(new).await.map_err(db_err)?;
        info!(booking_id = created.booking.id, "Booking created");
        Ok(created)
    }

    #[instrument(name = "profiles.service.get_booking", skip(self))]
    pub async fn get_booking(&self, id: i32) -> Result<BookingDetails, DomainError> {
        self.bookings
            .find(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Booking", id))
    }

    #[instrument(name = "profiles.service.list_bookings", skip(self))]
    pub async fn list_bookings(
        &self,
        user_id: i32,
        params: ListParams,
    ) -> Result<Page<Booking>, DomainError> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        let req = self.config.page(&params, BOOKING_ORDER_FIELDS)?;
        let (items, total) = self
            .bookings
            .list_for_user(user_id, &req)
            .await
            .map_err(db_err)?;
        Ok(Page::new(items, total, &req))
    }

    #[instrument(name = "profiles.service.delete_booking", skip(self))]
    pub async fn delete_booking(&self, id: i32) -> Result<(), DomainError> {
        if !self.bookings.soft_delete(id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Booking", id));
        }
        Ok(())
    }
}
