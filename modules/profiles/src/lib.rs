//! Profile management: users and everything hanging off a profile (educations,
//! skills, experience, projects, bookings, questions), plus reconciliation of
//! the reference tables from a seed file.
//!
//! Layout:
//! - `contract` plain records shared by every layer
//! - `domain` services, repository ports, paging and the reconciler
//! - `infra` SeaORM storage and startup seeding
//! - `api::rest` DTOs, handlers and the route table

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
mod module;

pub use config::{ProfilesConfig, SeedConfig};
pub use module::{ProfilesModule, Services};
