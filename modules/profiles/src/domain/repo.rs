//! Persistence ports for the domain services.
//!
//! Each service area talks to one trait; the SeaORM implementations live in
//! `infra::storage::sea_orm_repo`. Reads never return soft-deleted rows.
//! Listing methods return the page rows plus the total number of matches.

use async_trait::async_trait;

use crate::contract::model::*;
use crate::domain::paging::PageRequest;

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn insert(&self, new_user: NewUser) -> anyhow::Result<User>;
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>>;
    /// Keyword matches `first_name`, case-insensitively.
    async fn list(&self, req: &PageRequest) -> anyhow::Result<(Vec<User>, u64)>;
    async fn update(&self, user: &User) -> anyhow::Result<()>;
    /// Returns false when no live user has this id.
    async fn soft_delete(&self, id: i32) -> anyhow::Result<bool>;
    async fn details(&self, id: i32) -> anyhow::Result<Option<UserDetails>>;

    /// Replace the user's role set in one transaction.
    async fn replace_roles(&self, user_id: i32, role_ids: &[i32]) -> anyhow::Result<()>;
    async fn roles_for(&self, user_id: i32) -> anyhow::Result<Vec<ReferenceEntity>>;
    async fn existing_role_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<i32>>;
    async fn list_roles(&self) -> anyhow::Result<Vec<ReferenceEntity>>;
    async fn list_user_categories(&self) -> anyhow::Result<Vec<ReferenceEntity>>;
    async fn user_category_exists(&self, id: i32) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait EducationRepository: Send + Sync {
    async fn insert(&self, new: NewEducation) -> anyhow::Result<Education>;
    async fn find(&self, user_id: i32, id: i32) -> anyhow::Result<Option<Education>>;
    async fn list_for_user(
        &self,
        user_id: i32,
        req: &PageRequest,
    ) -> anyhow::Result<(Vec<Education>, u64)>;
    async fn update(&self, education: &Education) -> anyhow::Result<()>;
    async fn delete(&self, user_id: i32, id: i32) -> anyhow::Result<bool>;
    /// Returns the number of rows removed.
    async fn delete_for_user(&self, user_id: i32) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait SkillsRepository: Send + Sync {
    /// Insert all names in one transaction; nothing is written if one fails.
    async fn insert_categories(&self, names: &[String]) -> anyhow::Result<Vec<ReferenceEntity>>;
    async fn find_category(&self, id: i32) -> anyhow::Result<Option<ReferenceEntity>>;
    async fn list_categories(
        &self,
        req: &PageRequest,
    ) -> anyhow::Result<(Vec<ReferenceEntity>, u64)>;
    /// `None` when the category does not exist.
    async fn rename_category(&self, id: i32, name: &str)
        -> anyhow::Result<Option<ReferenceEntity>>;
    async fn delete_category(&self, id: i32) -> anyhow::Result<bool>;

    /// Inserts the skill and, if `user_id` is set, the user link in the same transaction.
    async fn insert(&self, new: NewSkill) -> anyhow::Result<Skill>;
    async fn find(&self, id: i32) -> anyhow::Result<Option<SkillDetails>>;
    /// Keyword matches `name`, case-insensitively.
    async fn list(&self, req: &PageRequest) -> anyhow::Result<(Vec<SkillDetails>, u64)>;
    async fn update(&self, skill: &Skill) -> anyhow::Result<()>;
    async fn soft_delete(&self, id: i32) -> anyhow::Result<bool>;
    async fn existing_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<i32>>;
}

#[async_trait]
pub trait ExperienceRepository: Send + Sync {
    /// Experience row, user link and optional skill link in one transaction.
    async fn insert(
        &self,
        user_id: i32,
        skill_id: Option<i32>,
        new: NewExperience,
    ) -> anyhow::Result<ExperienceDetails>;
    async fn find(&self, id: i32) -> anyhow::Result<Option<Experience>>;
    async fn find_for_user(
        &self,
        user_id: i32,
        id: i32,
    ) -> anyhow::Result<Option<ExperienceDetails>>;
    async fn list_for_user(
        &self,
        user_id: i32,
        req: &PageRequest,
    ) -> anyhow::Result<(Vec<ExperienceDetails>, u64)>;
    async fn update(&self, experience: &Experience) -> anyhow::Result<()>;
    /// Removes link rows and soft-deletes the experience.
    async fn delete(&self, id: i32) -> anyhow::Result<bool>;
    async fn delete_for_user(&self, user_id: i32) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait ProjectsRepository: Send + Sync {
    /// Project row and user link in one transaction.
    async fn insert(&self, user_id: i32, new: NewProject) -> anyhow::Result<Project>;
    async fn find(&self, id: i32) -> anyhow::Result<Option<Project>>;
    async fn find_for_user(&self, user_id: i32, id: i32) -> anyhow::Result<Option<Project>>;
    async fn list_for_user(
        &self,
        user_id: i32,
        req: &PageRequest,
    ) -> anyhow::Result<(Vec<Project>, u64)>;
    async fn update(&self, project: &Project) -> anyhow::Result<()>;
    async fn delete(&self, id: i32) -> anyhow::Result<bool>;
    async fn delete_for_user(&self, user_id: i32) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait BookingsRepository: Send + Sync {
    /// Booking row plus question and skill links in one transaction.
    async fn insert(&self, new: NewBooking) -> anyhow::Result<BookingDetails>;
    async fn find(&self, id: i32) -> anyhow::Result<Option<BookingDetails>>;
    async fn list_for_user(
        &self,
        user_id: i32,
        req: &PageRequest,
    ) -> anyhow::Result<(Vec<Booking>, u64)>;
    async fn soft_delete(&self, id: i32) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait QuestionsRepository: Send + Sync {
    /// Question and its options in one transaction.
    async fn insert(&self, new: NewQuestion) -> anyhow::Result<QuestionDetails>;
    async fn find(&self, id: i32) -> anyhow::Result<Option<QuestionDetails>>;
    async fn list(&self, req: &PageRequest) -> anyhow::Result<(Vec<Question>, u64)>;
    async fn soft_delete(&self, id: i32) -> anyhow::Result<bool>;
    async fn existing_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<i32>>;
}
