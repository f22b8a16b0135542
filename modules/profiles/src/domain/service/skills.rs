use std::sync::Arc;

use tracing::{info, instrument};

use crate::contract::model::*;
use crate::domain::error::{db_err, DomainError};
use crate::domain::paging::{ListParams, Page};
use crate::domain::repo::{SkillsRepository, UsersRepository};
use crate::domain::service::{set_if_present, set_opt_if_present, ServiceConfig};

pub const SKILL_ORDER_FIELDS: &[&str] = &["id", "name", "created_at", "updated_at"];
pub const SKILL_CATEGORY_ORDER_FIELDS: &[&str] = &["id", "name", "created_at", "updated_at"];

/// Skills and skill categories.
#[derive(Clone)]
pub struct SkillsService {
    skills: Arc<dyn SkillsRepository>,
    users: Arc<dyn UsersRepository>,
    config: ServiceConfig,
}

impl SkillsService {
    pub fn new(
        skills: Arc<dyn SkillsRepository>,
        users: Arc<dyn UsersRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            skills,
            users,
            config,
        }
    }

    /// Create several categories at once; either all are stored or none.
    #[instrument(name = "profiles.service.create_skill_categories", skip(self, names), fields(count = names.len()))]
    pub async fn create_categories(
        &self,
        names: Vec<String>,
    ) -> Result<Vec<ReferenceEntity>, DomainError> {
        if names.is_empty() {
            return Err(DomainError::validation("name", "at least one name is required"));
        }
        let names: Vec<String> = names.into_iter().map(|n| n.trim().to_string()).collect();
        if let Some(pos) = names.iter().position(|n| n.is_empty()) {
            return Err(DomainError::validation(
                format!("name[{pos}]"),
                "must not be empty",
            ));
        }

        let created = self
            .skills
            .insert_categories(&names)
            .await
            .map_err(db_err)?;
        info!("Created {} skill categories", created.len());
        Ok(created)
    }

    #[instrument(name = "profiles.service.get_skill_category", skip(self))]
    pub async fn get_category(&self, id: i32) -> Result<ReferenceEntity, DomainError> {
        self.skills
            .find_category(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("SkillCategory", id))
    }

    #[instrument(name = "profiles.service.list_skill_categories", skip(self))]
    pub async fn list_categories(
        &self,
        params: ListParams,
    ) -> Result<Page<ReferenceEntity>, DomainError> {
        let req = self.config.page(&params, SKILL_CATEGORY_ORDER_FIELDS)?;
        let (items, total) = self.skills.list_categories(&req).await.map_err(db_err)?;
        Ok(Page::new(items, total, &req))
    }

    #[instrument(name = "profiles.service.rename_skill_category", skip(self))]
    pub async fn rename_category(
        &self,
        id: i32,
        name: String,
    ) -> Result<ReferenceEntity, DomainError> {
        DomainError::require("name", &name)?;
        self.skills
            .rename_category(id, name.trim())
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("SkillCategory", id))
    }

    #[instrument(name = "profiles.service.delete_skill_category", skip(self))]
    pub async fn delete_category(&self, id: i32) -> Result<(), DomainError> {
        if !self.skills.delete_category(id).await.map_err(db_err)? {
            return Err(DomainError::not_found("SkillCategory", id));
        }
        Ok(())
    }

    #[instrument(name = "profiles.service.create_skill", skip(self, new), fields(name = %new.name))]
    pub async fn create_skill(&self, new: NewSkill) -> Result<SkillDetails, DomainError> {
        DomainError::require("name", &new.name)?;
        let category = self.get_category(new.skill_category_id).await?;
        if let Some(user_id) = new.user_id {
            self.users
                .find_by_id(user_id)
                .await
                .map_err(db_err)?
                .ok_or_else(|| DomainError::not_found("User", user_id))?;
        } else if new.skill_level.is_some() {
            return Err(DomainError::validation(
                "skill_level",
                "requires user_id",
            ));
        }

        let skill = self.skills.insert(new).await.map_err(db_err)?;
        info!(skill_id = skill.id, "Skill created");
        Ok(SkillDetails {
            skill,
            category: Some(category),
        })
    }

    #[instrument(name = "profiles.service.get_skill", skip(self))]
    pub async fn get_skill(&self, id: i32) -> Result<SkillDetails, DomainError> {
        self.skills
            .find(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Skill", id))
    }

    #[instrument(name = "profiles.service.list_skills", skip(self))]
    pub async fn list_skills(&self, params: ListParams) -> Result<Page<SkillDetails>, DomainError> {
        let req = self.config.page(&params, SKILL_ORDER_FIELDS)?;
        let (items, total) = self.skills.list(&req).await.map_err(db_err)?;
        Ok(Page::new(items, total, &req))
    }

    #[instrument(name = "profiles.service.update_skill", skip(self, patch))]
    pub async fn update_skill(&self, id: i32, patch: SkillPatch) -> Result<SkillDetails, DomainError> {
        let SkillDetails { mut skill, category } = self.get_skill(id).await?;

        let category = match patch.skill_category_id {
            Some(category_id) if category_id != skill.skill_category_id => {
                let category = self.get_category(category_id).await?;
                skill.skill_category_id = category_id;
                Some(category)
            }
            _ => category,
        };
        set_if_present(&mut skill.name, patch.name);
        set_opt_if_present(&mut skill.icon, patch.icon);
        skill.updated_at = chrono::Utc::now();

        self.skills.update(&skill).await.map_err(db_err)?;
        Ok(SkillDetails { skill, category })
    }

    #[instrument(name = "profiles.service.delete_skill", skip(self))]
    pub async fn delete_skill(&self, id: i32) -> Result<(), DomainError> {
        if !self.skills.soft_delete(id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Skill", id));
        }
        Ok(())
    }
}
