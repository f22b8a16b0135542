//! Domain services, one per REST area. Services own validation and existence
//! checks; repositories only persist.

mod bookings;
mod experience;
mod projects;
mod questions;
mod skills;
mod users;

pub use bookings::BookingsService;
pub use experience::ExperienceService;
pub use projects::ProjectsService;
pub use questions::QuestionsService;
pub use skills::SkillsService;
pub use users::UsersService;

use crate::domain::error::DomainError;
use crate::domain::paging::{ListParams, PageRequest};

/// Configuration shared by all services
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 1000,
        }
    }
}

impl ServiceConfig {
    pub(crate) fn page(
        &self,
        params: &ListParams,
        allowed_order: &[&str],
    ) -> Result<PageRequest, DomainError> {
        PageRequest::resolve(
            params,
            self.default_page_size,
            self.max_page_size,
            allowed_order,
        )
    }
}

/// First id in `wanted` that is not in `existing`, as a not-found error.
pub(crate) fn ensure_all_exist(
    entity: &'static str,
    wanted: &[i32],
    existing: &[i32],
) -> Result<(), DomainError> {
    match wanted.iter().find(|id| !existing.contains(id)) {
        Some(missing) => Err(DomainError::not_found(entity, *missing)),
        None => Ok(()),
    }
}

/// Overwrite `target` only with a non-blank value.
pub(crate) fn set_if_present(target: &mut String, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        *target = v;
    }
}

/// Same as [`set_if_present`] for optional columns.
pub(crate) fn set_opt_if_present(target: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        *target = Some(v);
    }
}

/// Sorted, de-duplicated copy of an id list.
pub(crate) fn dedup_ids(ids: &[i32]) -> Vec<i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
