use std::sync::Arc;

use tracing::{info, instrument};

use crate::contract::model::*;
use crate::domain::error::{db_err, DomainError};
use crate::domain::paging::{ListParams, Page};
use crate::domain::repo::{ProjectsRepository, UsersRepository};
use crate::domain::service::{set_if_present, set_opt_if_present, ServiceConfig};

pub const PROJECT_ORDER_FIELDS: &[&str] = &["id", "name", "created_at", "updated_at"];

#[derive(Clone)]
pub struct ProjectsService {
    projects: Arc<dyn ProjectsRepository>,
    users: Arc<dyn UsersRepository>,
    config: ServiceConfig,
}

impl ProjectsService {
    pub fn new(
        projects: Arc<dyn ProjectsRepository>,
        users: Arc<dyn UsersRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            projects,
            users,
            config,
        }
    }

    #[instrument(name = "profiles.service.add_project", skip(self, new), fields(user_id = %user_id))]
    pub async fn add_project(&self, user_id: i32, new: NewProject) -> Result<Project, DomainError> {
        DomainError::require("name", &new.name)?;
        DomainError::require("technologies", &new.technologies)?;
        self.ensure_user(user_id).await?;

        let project = self.projects.insert(user_id, new).await.map_err(db_err)?;
        info!(project_id = project.id, "Project added");
        Ok(project)
    }

    #[instrument(name = "profiles.service.get_project", skip(self))]
    pub async fn get_project(&self, user_id: i32, id: i32) -> Result<Project, DomainError> {
        self.projects
            .find_for_user(user_id, id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Project", id))
    }

    #[instrument(name = "profiles.service.list_projects", skip(self))]
    pub async fn list_projects(
        &self,
        user_id: i32,
        params: ListParams,
    ) -> Result<Page<Project>, DomainError> {
        self.ensure_user(user_id).await?;
        let req = self.config.page(&params, PROJECT_ORDER_FIELDS)?;
        let (items, total) = self
            .projects
            .list_for_user(user_id, &req)
            .await
            .map_err(db_err)?;
        Ok(Page::new(items, total, &req))
    }

    #[instrument(name = "profiles.service.update_project", skip(self, patch))]
    pub async fn update_project(&self, id: i32, patch: ProjectPatch) -> Result<Project, DomainError> {
        let mut current = self
            .projects
            .find(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Project", id))?;

        set_if_present(&mut current.name, patch.name);
        set_if_present(&mut current.technologies, patch.technologies);
        set_opt_if_present(&mut current.description, patch.description);
        set_opt_if_present(&mut current.link, patch.link);
        current.updated_at = chrono::Utc::now();

        self.projects.update(&current).await.map_err(db_err)?;
        Ok(current)
    }

    #[instrument(name = "profiles.service.delete_project", skip(self))]
    pub async fn delete_project(&self, id: i32) -> Result<(), DomainError> {
        if !self.projects.delete(id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Project", id));
        }
        Ok(())
    }

    /// Fails with not-found when the user has no projects.
    #[instrument(name = "profiles.service.delete_projects", skip(self))]
    pub async fn delete_projects(&self, user_id: i32) -> Result<u64, DomainError> {
        let removed = self
            .projects
            .delete_for_user(user_id)
            .await
            .map_err(db_err)?;
        if removed == 0 {
            return Err(DomainError::not_found("Project", user_id));
        }
        info!(removed, "Projects deleted");
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
