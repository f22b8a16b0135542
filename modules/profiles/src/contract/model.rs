//! Plain domain records shared by the service, storage and REST layers
//! (no serde here; the REST layer has its own DTOs).

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

/// Kinds of reference data kept in sync from the seed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    UserCategory,
    Role,
    SkillCategory,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 3] = [
        ReferenceKind::UserCategory,
        ReferenceKind::Role,
        ReferenceKind::SkillCategory,
    ];

    pub fn table(self) -> &'static str {
        match self {
            ReferenceKind::UserCategory => "user_categories",
            ReferenceKind::Role => "roles",
            ReferenceKind::SkillCategory => "skill_categories",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A named lookup row (user category, role, skill category).
///
/// Timestamps are owned by persistence and never take part in change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntity {
    pub id: i32,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ReferenceEntity {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub video_url: Option<String>,
    pub certifications: Option<String>,
    pub user_category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub video_url: Option<String>,
    pub certifications: Option<String>,
    pub user_category_id: Option<i32>,
}

/// Partial update; `None` and blank strings leave the stored value alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub video_url: Option<String>,
    pub certifications: Option<String>,
    pub user_category_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Education {
    pub id: i32,
    pub user_id: i32,
    pub institution_name: String,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub achievements: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEducation {
    pub user_id: i32,
    pub institution_name: String,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub achievements: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EducationPatch {
    pub institution_name: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub achievements: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub id: i32,
    pub name: String,
    pub icon: Option<String>,
    pub skill_category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Skill together with its category row, if the category still exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillDetails {
    pub skill: Skill,
    pub category: Option<ReferenceEntity>,
}

/// A skill as held by a user, with the user's level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSkill {
    pub skill: Skill,
    pub category: Option<ReferenceEntity>,
    pub skill_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewSkill {
    pub name: String,
    pub icon: Option<String>,
    pub skill_category_id: i32,
    /// When set, the skill is linked to this user in the same transaction.
    pub user_id: Option<i32>,
    pub skill_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkillPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub skill_category_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experience {
    pub id: i32,
    pub position: String,
    pub company: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_currently_working: bool,
    pub responsibilities: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Experience {
    /// Responsibilities as a list: one entry per non-empty line, bullet markers removed.
    pub fn responsibility_list(&self) -> Vec<String> {
        self.responsibilities
            .as_deref()
            .map(split_responsibilities)
            .unwrap_or_default()
    }
}

pub fn split_responsibilities(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceDetails {
    pub experience: Experience,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExperience {
    pub position: String,
    pub company: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_currently_working: bool,
    pub responsibilities: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExperiencePatch {
    pub position: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_currently_working: Option<bool>,
    pub responsibilities: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub technologies: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub technologies: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub technologies: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: i32,
    pub user_id: i32,
    pub booking_date_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetails {
    pub booking: Booking,
    pub question_ids: Vec<i32>,
    pub skill_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub user_id: i32,
    pub booking_date_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    pub question_ids: Vec<i32>,
    pub skill_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i32,
    pub question: String,
    pub question_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOption {
    pub id: i32,
    pub question_id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDetails {
    pub question: Question,
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewQuestion {
    pub question: String,
    pub question_type: String,
    pub options: Vec<String>,
}

/// Everything known about one user, assembled for the details endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub user: User,
    pub category: Option<ReferenceEntity>,
    pub roles: Vec<ReferenceEntity>,
    pub skills: Vec<UserSkill>,
    pub educations: Vec<Education>,
    pub experiences: Vec<ExperienceDetails>,
    pub projects: Vec<Project>,
    pub bookings: Vec<Booking>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responsibilities_drop_bullets_and_blank_lines() {
        let text = "- Led the team\n\n* Shipped v2\n  • Mentored juniors  \nPlain line\n-\n";
        assert_eq!(
            split_responsibilities(text),
            vec!["Led the team", "Shipped v2", "Mentored juniors", "Plain line"]
        );
    }

    #[test]
    fn missing_responsibilities_yield_empty_list() {
        let exp = Experience {
            id: 1,
            position: "Engineer".into(),
            company: "Acme".into(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: None,
            is_currently_working: true,
            responsibilities: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(exp.responsibility_list().is_empty());
    }

    #[test]
    fn reference_kind_names_match_tables() {
        assert_eq!(ReferenceKind::UserCategory.to_string(), "user_categories");
        assert_eq!(ReferenceKind::Role.table(), "roles");
        assert_eq!(ReferenceKind::SkillCategory.table(), "skill_categories");
    }
}
