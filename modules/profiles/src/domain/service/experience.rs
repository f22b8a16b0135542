use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::contract::model::*;
use crate::domain::error::{db_err, DomainError};
use crate::domain::paging::{ListParams, Page};
use crate::domain::repo::{ExperienceRepository, SkillsRepository, UsersRepository};
use crate::domain::service::{set_if_present, set_opt_if_present, ServiceConfig};

pub const EXPERIENCE_ORDER_FIELDS: &[&str] = &[
    "id",
    "position",
    "company",
    "start_date",
    "end_date",
    "created_at",
    "updated_at",
];

#[derive(Clone)]
pub struct ExperienceService {
    experiences: Arc<dyn ExperienceRepository>,
    users: Arc<dyn UsersRepository>,
    skills: Arc<dyn SkillsRepository>,
    config: ServiceConfig,
}

impl ExperienceService {
    pub fn new(
        experiences: Arc<dyn ExperienceRepository>,
        users: Arc<dyn UsersRepository>,
        skills: Arc<dyn SkillsRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            experiences,
            users,
            skills,
            config,
        }
    }

    #[instrument(name = "profiles.service.add_experience", skip(self, new), fields(user_id = %user_id))]
    pub async fn add_experience(
        &self,
        user_id: i32,
        skill_id: Option<i32>,
        mut new: NewExperience,
    ) -> Result<ExperienceDetails, DomainError> {
        DomainError::require("position", &new.position)?;
        DomainError::require("company", &new.company)?;
        if new.is_currently_working {
            new.end_date = None;
        }
        validate_period(new.start_date, new.end_date, new.is_currently_working)?;

        self.ensure_user(user_id).await?;
        if let Some(skill_id) = skill_id {
            let found = self
                .skills
                .existing_ids(&[skill_id])
                .await
                .map_err(db_err)?;
            if found.is_empty() {
                return Err(DomainError::not_found("Skill", skill_id));
            }
        }

        let created = self
            .experiences
            .insert(user_id, skill_id, new)
            .await
            .map_err(db_err)?;
        info!(experience_id = created.experience.id, "Experience added");
        Ok(created)
    }

    #[instrument(name = "profiles.service.get_experience", skip(self))]
    pub async fn get_experience(
        &self,
        user_id: i32,
        id: i32,
    ) -> Result<ExperienceDetails, DomainError> {
        self.experiences
            .find_for_user(user_id, id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Experience", id))
    }

    #[instrument(name = "profiles.service.list_experiences", skip(self))]
    pub async fn list_experiences(
        &self,
        user_id: i32,
        params: ListParams,
    ) -> Result<Page<ExperienceDetails>, DomainError> {
        self.ensure_user(user_id).await?;
        let req = self.config.page(&params, EXPERIENCE_ORDER_FIELDS)?;
        let (items, total) = self
            .experiences
            .list_for_user(user_id, &req)
            .await
            .map_err(db_err)?;
        Ok(Page::new(items, total, &req))
    }

    #[instrument(name = "profiles.service.update_experience", skip(self, patch))]
    pub async fn update_experience(
        &self,
        id: i32,
        patch: ExperiencePatch,
    ) -> Result<Experience, DomainError> {
        let mut current = self
            .experiences
            .find(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Experience", id))?;

        set_if_present(&mut current.position, patch.position);
        set_if_present(&mut current.company, patch.company);
        set_opt_if_present(&mut current.description, patch.description);
        set_opt_if_present(&mut current.responsibilities, patch.responsibilities);
        if let Some(start) = patch.start_date {
            current.start_date = start;
        }
        if let Some(end) = patch.end_date {
            current.end_date = Some(end);
        }
        if let Some(working) = patch.is_currently_working {
            current.is_currently_working = working;
        }
        if current.is_currently_working {
            current.end_date = None;
        }
        validate_period(
            current.start_date,
            current.end_date,
            current.is_currently_working,
        )?;
        current.updated_at = chrono::Utc::now();

        self.experiences.update(&current).await.map_err(db_err)?;
        Ok(current)
    }

    #[instrument(name = "profiles.service.delete_experience", skip(self))]
    pub async fn delete_experience(&self, id: i32) -> Result<(), DomainError> {
        if !self.experiences.delete(id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Experience", id));
        }
        Ok(())
    }

    /// Fails with not-found when the user has no experience at all.
    #[instrument(name = "profiles.service.delete_experiences", skip(self))]
    pub async fn delete_experiences(&self, user_id: i32) -> Result<u64, DomainError> {
        let removed = self
            .experiences
            .delete_for_user(user_id)
            .await
            .map_err(db_err)?;
        if removed == 0 {
            return Err(DomainError::not_found("Experience", user_id));
        }
        info!(removed, "Experiences deleted");
        Ok(removed)
    }

    async fn ensure_user(&self, user_id: i32) -> Result<(), DomainError> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        Ok(())
    }
}

/// A finished position needs an end date on or after its start.
fn validate_period(
    start: NaiveDate,
    end: Option<NaiveDate>,
    currently_working: bool,
) -> Result<(), DomainError> {
    if currently_working {
        return Ok(());
    }
    match end {
        None => Err(DomainError::validation(
            "end_date",
            "required unless currently working",
        )),
        Some(end) if end < start => Err(DomainError::invalid_date_range(start, end)),
        Some(_) => Ok(()),
    }
}
