use std::sync::Arc;

use tracing::{debug, info, instrument};
use validator::ValidateEmail;

use crate::contract::model::*;
use crate::domain::error::{db_err, DomainError};
use crate::domain::paging::{ListParams, Page};
use crate::domain::repo::{EducationRepository, UsersRepository};
use crate::domain::service::{dedup_ids, ensure_all_exist, set_if_present, set_opt_if_present, ServiceConfig};

pub const USER_ORDER_FIELDS: &[&str] = &[
    "id",
    "first_name",
    "last_name",
    "email",
    "created_at",
    "updated_at",
];

pub const EDUCATION_ORDER_FIELDS: &[&str] = &[
    "id",
    "institution_name",
    "start_date",
    "end_date",
    "created_at",
    "updated_at",
];

/// Users, their roles, lookups and educations.
#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UsersRepository>,
    educations: Arc<dyn EducationRepository>,
    config: ServiceConfig,
}

impl UsersService {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        educations: Arc<dyn EducationRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            educations,
            config,
        }
    }

    #[instrument(name = "profiles.service.create_user", skip(self, new_user), fields(email = %new_user.email))]
    pub async fn create_user(&self, mut new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");
        DomainError::require("first_name", &new_user.first_name)?;
        DomainError::require("last_name", &new_user.last_name)?;
        new_user.email = checked_email(&new_user.email)?;
        if let Some(category_id) = new_user.user_category_id {
            self.ensure_category(category_id).await?;
        }

        let user = self.users.insert(new_user).await.map_err(db_err)?;
        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(name = "profiles.service.list_users", skip(self))]
    pub async fn list_users(&self, params: ListParams) -> Result<Page<User>, DomainError> {
        let req = self.config.page(&params, USER_ORDER_FIELDS)?;
        let (items, total) = self.users.list(&req).await.map_err(db_err)?;
        debug!("Listed {} of {} users", items.len(), total);
        Ok(Page::new(items, total, &req))
    }

    #[instrument(name = "profiles.service.get_user_details", skip(self), fields(user_id = %id))]
    pub async fn get_user_details(&self, id: i32) -> Result<UserDetails, DomainError> {
        self.users
            .details(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    #[instrument(name = "profiles.service.update_user", skip(self, patch), fields(user_id = %id))]
    pub async fn update_user(&self, id: i32, patch: UserPatch) -> Result<User, DomainError> {
        info!("Updating user");
        let mut current = self.require_user(id).await?;

        let email = match patch.email.as_deref().filter(|e| !e.trim().is_empty()) {
            Some(email) => Some(checked_email(email)?),
            None => None,
        };
        if let Some(category_id) = patch.user_category_id {
            self.ensure_category(category_id).await?;
            current.user_category_id = Some(category_id);
        }

        set_if_present(&mut current.first_name, patch.first_name);
        set_if_present(&mut current.last_name, patch.last_name);
        set_if_present(&mut current.email, email);
        set_opt_if_present(&mut current.mobile_number, patch.mobile_number);
        set_opt_if_present(&mut current.bio, patch.bio);
        set_opt_if_present(&mut current.location, patch.location);
        set_opt_if_present(&mut current.video_url, patch.video_url);
        set_opt_if_present(&mut current.certifications, patch.certifications);
        current.updated_at = chrono::Utc::now();

        self.users.update(&current).await.map_err(db_err)?;
        info!("Successfully updated user");
        Ok(current)
    }

    #[instrument(name = "profiles.service.delete_user", skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: i32) -> Result<(), DomainError> {
        info!("Deleting user");
        if !self.users.soft_delete(id).await.map_err(db_err)? {
            return Err(DomainError::not_found("User", id));
        }
        Ok(())
    }

    /// Replace the user's roles with exactly `role_ids`.
    #[instrument(name = "profiles.service.assign_roles", skip(self), fields(user_id = %user_id))]
    pub async fn assign_roles(
        &self,
        user_id: i32,
        role_ids: &[i32],
    ) -> Result<Vec<ReferenceEntity>, DomainError> {
        self.require_user(user_id).await?;
        let role_ids = dedup_ids(role_ids);
        let existing = self
            .users
            .existing_role_ids(&role_ids)
            .await
            .map_err(db_err)?;
        ensure_all_exist("Role", &role_ids, &existing)?;

        self.users
            .replace_roles(user_id, &role_ids)
            .await
            .map_err(db_err)?;
        info!(count = role_ids.len(), "Roles assigned");
        self.users.roles_for(user_id).await.map_err(db_err)
    }

    #[instrument(name = "profiles.service.list_user_categories", skip(self))]
    pub async fn list_user_categories(&self) -> Result<Vec<ReferenceEntity>, DomainError> {
        self.users.list_user_categories().await.map_err(db_err)
    }

    #[instrument(name = "profiles.service.list_roles", skip(self))]
    pub async fn list_roles(&self) -> Result<Vec<ReferenceEntity>, DomainError> {
        self.users.list_roles().await.map_err(db_err)
    }

    // --- educations ---

    #[instrument(name = "profiles.service.add_education", skip(self, new), fields(user_id = %new.user_id))]
    pub async fn add_education(&self, new: NewEducation) -> Result<Education, DomainError> {
        DomainError::require("institution_name", &new.institution_name)?;
        validate_range(new.start_date, new.end_date)?;
        self.require_user(new.user_id).await?;

        let education = self.educations.insert(new).await.map_err(db_err)?;
        info!(education_id = education.id, "Education added");
        Ok(education)
    }

    #[instrument(name = "profiles.service.get_education", skip(self))]
    pub async fn get_education(&self, user_id: i32, id: i32) -> Result<Education, DomainError> {
        self.educations
            .find(user_id, id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Education", id))
    }

    #[instrument(name = "profiles.service.list_educations", skip(self))]
    pub async fn list_educations(
        &self,
        user_id: i32,
        params: ListParams,
    ) -> Result<Page<Education>, DomainError> {
        self.require_user(user_id).await?;
        let req = self.config.page(&params, EDUCATION_ORDER_FIELDS)?;
        let (items, total) = self
            .educations
            .list_for_user(user_id, &req)
            .await
            .map_err(db_err)?;
        Ok(Page::new(items, total, &req))
    }

    #[instrument(name = "profiles.service.update_education", skip(self, patch))]
    pub async fn update_education(
        &self,
        user_id: i32,
        id: i32,
        patch: EducationPatch,
    ) -> Result<Education, DomainError> {
        let mut current = self.get_education(user_id, id).await?;

        set_if_present(&mut current.institution_name, patch.institution_name);
        set_opt_if_present(&mut current.degree, patch.degree);
        set_opt_if_present(&mut current.field_of_study, patch.field_of_study);
        set_opt_if_present(&mut current.achievements, patch.achievements);
        if let Some(start) = patch.start_date {
            current.start_date = start;
        }
        if let Some(end) = patch.end_date {
            current.end_date = end;
        }
        validate_range(current.start_date, current.end_date)?;
        current.updated_at = chrono::Utc::now();

        self.educations.update(&current).await.map_err(db_err)?;
        Ok(current)
    }

    #[instrument(name = "profiles.service.delete_education", skip(self))]
    pub async fn delete_education(&self, user_id: i32, id: i32) -> Result<(), DomainError> {
        if !self.educations.delete(user_id, id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Education", id));
        }
        Ok(())
    }

    /// Returns how many educations were removed.
    #[instrument(name = "profiles.service.delete_educations", skip(self))]
    pub async fn delete_educations(&self, user_id: i32) -> Result<u64, DomainError> {
        self.require_user(user_id).await?;
        let removed = self
            .educations
            .delete_for_user(user_id)
            .await
            .map_err(db_err)?;
        info!(removed, "Educations deleted");
        Ok(removed)
    }

    // --- helpers ---

    pub(crate) async fn require_user(&self, id: i32) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    async fn ensure_category(&self, id: i32) -> Result<(), DomainError> {
        if !self
            .users
            .user_category_exists(id)
            .await
            .map_err(db_err)?
        {
            return Err(DomainError::not_found("UserCategory", id));
        }
        Ok(())
    }
}

/// Trimmed address, or a validation error naming the rejected value.
fn checked_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim();
    if !email.validate_email() {
        return Err(DomainError::validation("email", format!("'{email}' is not a valid email")));
    }
    Ok(email.to_owned())
}

pub(crate) fn validate_range(
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
) -> Result<(), DomainError> {
    if end < start {
        return Err(DomainError::invalid_date_range(start, end));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn email_is_trimmed_and_checked() {
        assert_eq!(checked_email("  ada@example.com ").unwrap(), "ada@example.com");
        assert!(checked_email("a b@x.y").is_err());
        assert!(checked_email("  not an email@x.y  ").is_err());
        assert!(checked_email("@example.com").is_err());
        assert!(checked_email("no-at-sign").is_err());
    }

    #[test]
    fn date_range_allows_same_day() {
        let d = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        assert!(validate_range(d, d).is_ok());
        assert_eq!(
            validate_range(d, d.pred_opt().unwrap()),
            Err(DomainError::invalid_date_range(d, d.pred_opt().unwrap()))
        );
    }
}
