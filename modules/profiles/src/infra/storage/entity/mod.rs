//! SeaORM entities, one module per table.

pub mod booking;
pub mod booking_question;
pub mod booking_skill;
pub mod education;
pub mod experience;
pub mod experience_skill;
pub mod project;
pub mod question;
pub mod question_option;
pub mod reference;
pub mod skill;
pub mod user;
pub mod user_experience;
pub mod user_project;
pub mod user_role;
pub mod user_skill;

pub use reference::{role, skill_category, user_category};
