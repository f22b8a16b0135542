use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError};

use crate::contract::model::*;
use crate::domain::paging::{ListParams, Page};

/// Query parameters accepted by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub order_by: Option<String>,
    pub keyword: Option<String>,
}

impl From<ListQuery> for ListParams {
    fn from(q: ListQuery) -> Self {
        Self {
            limit: q.limit,
            offset: q.offset,
            order_by: q.order_by,
            keyword: q.keyword,
        }
    }
}

/// List envelope: `records_filtered` is the size of this page, `total` counts all matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDto<T> {
    pub total: u64,
    pub records_filtered: usize,
    pub data: Vec<T>,
    pub limit: u64,
    pub offset: u64,
}

impl<T> ListDto<T> {
    pub fn from_page<S>(page: Page<S>) -> Self
    where
        T: From<S>,
    {
        let page = page.map(T::from);
        Self {
            total: page.total,
            records_filtered: page.items.len(),
            data: page.items,
            limit: page.limit,
            offset: page.offset,
        }
    }

    /// Envelope for an unpaginated lookup list.
    pub fn from_items<S>(items: Vec<S>) -> Self
    where
        T: From<S>,
    {
        let data: Vec<T> = items.into_iter().map(T::from).collect();
        let n = data.len();
        Self {
            total: n as u64,
            records_filtered: n,
            data,
            limit: n as u64,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceDto {
    pub id: i32,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ReferenceEntity> for ReferenceDto {
    fn from(e: ReferenceEntity) -> Self {
        Self {
            id: e.id,
            name: e.name,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

// ---- users ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
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

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            mobile_number: u.mobile_number,
            bio: u.bio,
            location: u.location,
            video_url: u.video_url,
            certifications: u.certifications,
            user_category_id: u.user_category_id,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserReq {
    #[validate(length(min = 1, message = "first_name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last_name is required"))]
    pub last_name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub mobile_number: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub video_url: Option<String>,
    pub certifications: Option<String>,
    pub user_category_id: Option<i32>,
}

impl From<CreateUserReq> for NewUser {
    fn from(r: CreateUserReq) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            mobile_number: r.mobile_number,
            bio: r.bio,
            location: r.location,
            video_url: r.video_url,
            certifications: r.certifications,
            user_category_id: r.user_category_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserReq {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(custom(function = "patch_email"))]
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub video_url: Option<String>,
    pub certifications: Option<String>,
    pub user_category_id: Option<i32>,
}

/// Blank means "leave unchanged"; anything else must be an address once trimmed.
fn patch_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() || email.validate_email() {
        return Ok(());
    }
    Err(ValidationError::new("email").with_message("email must be a valid address".into()))
}

impl From<UpdateUserReq> for UserPatch {
    fn from(r: UpdateUserReq) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            mobile_number: r.mobile_number,
            bio: r.bio,
            location: r.location,
            video_url: r.video_url,
            certifications: r.certifications,
            user_category_id: r.user_category_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignRolesReq {
    pub role_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSkillDto {
    #[serde(flatten)]
    pub skill: SkillDto,
    pub skill_level: Option<String>,
}

impl From<UserSkill> for UserSkillDto {
    fn from(s: UserSkill) -> Self {
        Self {
            skill: SkillDto::from(SkillDetails {
                skill: s.skill,
                category: s.category,
            }),
            skill_level: s.skill_level,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetailsDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub user_category: Option<ReferenceDto>,
    pub roles: Vec<ReferenceDto>,
    pub skills: Vec<UserSkillDto>,
    pub educations: Vec<EducationDto>,
    pub experiences: Vec<ExperienceDto>,
    pub projects: Vec<ProjectDto>,
    pub bookings: Vec<BookingDto>,
}

impl From<UserDetails> for UserDetailsDto {
    fn from(d: UserDetails) -> Self {
        Self {
            user: d.user.into(),
            user_category: d.category.map(Into::into),
            roles: d.roles.into_iter().map(Into::into).collect(),
            skills: d.skills.into_iter().map(Into::into).collect(),
            educations: d.educations.into_iter().map(Into::into).collect(),
            experiences: d.experiences.into_iter().map(Into::into).collect(),
            projects: d.projects.into_iter().map(Into::into).collect(),
            bookings: d.bookings.into_iter().map(Into::into).collect(),
        }
    }
}

// ---- educations ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationDto {
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

impl From<Education> for EducationDto {
    fn from(e: Education) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            institution_name: e.institution_name,
            degree: e.degree,
            field_of_study: e.field_of_study,
            achievements: e.achievements,
            start_date: e.start_date,
            end_date: e.end_date,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEducationReq {
    #[validate(length(min = 1, message = "institution_name is required"))]
    pub institution_name: String,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub achievements: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CreateEducationReq {
    pub fn into_new(self, user_id: i32) -> NewEducation {
        NewEducation {
            user_id,
            institution_name: self.institution_name,
            degree: self.degree,
            field_of_study: self.field_of_study,
            achievements: self.achievements,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEducationReq {
    pub institution_name: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub achievements: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<UpdateEducationReq> for EducationPatch {
    fn from(r: UpdateEducationReq) -> Self {
        Self {
            institution_name: r.institution_name,
            degree: r.degree,
            field_of_study: r.field_of_study,
            achievements: r.achievements,
            start_date: r.start_date,
            end_date: r.end_date,
        }
    }
}

// ---- skills ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDto {
    pub id: i32,
    pub name: String,
    pub icon: Option<String>,
    pub skill_category_id: i32,
    pub skill_category: Option<ReferenceDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SkillDetails> for SkillDto {
    fn from(d: SkillDetails) -> Self {
        let SkillDetails { skill, category } = d;
        Self {
            id: skill.id,
            name: skill.name,
            icon: skill.icon,
            skill_category_id: skill.skill_category_id,
            skill_category: category.map(Into::into),
            created_at: skill.created_at,
            updated_at: skill.updated_at,
        }
    }
}

impl From<Skill> for SkillDto {
    fn from(skill: Skill) -> Self {
        SkillDetails {
            skill,
            category: None,
        }
        .into()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSkillCategoriesReq {
    #[validate(length(min = 1, message = "at least one name is required"))]
    pub name: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSkillCategoryReq {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSkillReq {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub icon: Option<String>,
    pub skill_category_id: i32,
    pub user_id: Option<i32>,
    pub skill_level: Option<String>,
}

impl From<CreateSkillReq> for NewSkill {
    fn from(r: CreateSkillReq) -> Self {
        Self {
            name: r.name,
            icon: r.icon,
            skill_category_id: r.skill_category_id,
            user_id: r.user_id,
            skill_level: r.skill_level,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSkillReq {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub skill_category_id: Option<i32>,
}

impl From<UpdateSkillReq> for SkillPatch {
    fn from(r: UpdateSkillReq) -> Self {
        Self {
            name: r.name,
            icon: r.icon,
            skill_category_id: r.skill_category_id,
        }
    }
}

// ---- experience ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceDto {
    pub id: i32,
    pub position: String,
    pub company: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_currently_working: bool,
    pub responsibilities: Vec<String>,
    pub skills: Vec<SkillDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExperienceDetails> for ExperienceDto {
    fn from(d: ExperienceDetails) -> Self {
        let responsibilities = d.experience.responsibility_list();
        let e = d.experience;
        Self {
            id: e.id,
            position: e.position,
            company: e.company,
            description: e.description,
            start_date: e.start_date,
            end_date: e.end_date,
            is_currently_working: e.is_currently_working,
            responsibilities,
            skills: d.skills.into_iter().map(Into::into).collect(),
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

impl From<Experience> for ExperienceDto {
    fn from(experience: Experience) -> Self {
        ExperienceDetails {
            experience,
            skills: Vec::new(),
        }
        .into()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExperienceReq {
    #[validate(length(min = 1, message = "position is required"))]
    pub position: String,
    #[validate(length(min = 1, message = "company is required"))]
    pub company: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_currently_working: bool,
    pub responsibilities: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExperienceReq {
    pub user_id: i32,
    pub skill_id: Option<i32>,
    #[validate(nested)]
    pub experience: ExperienceReq,
}

impl From<ExperienceReq> for NewExperience {
    fn from(r: ExperienceReq) -> Self {
        Self {
            position: r.position,
            company: r.company,
            description: r.description,
            start_date: r.start_date,
            end_date: r.end_date,
            is_currently_working: r.is_currently_working,
            responsibilities: r.responsibilities,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateExperienceReq {
    pub position: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_currently_working: Option<bool>,
    pub responsibilities: Option<String>,
}

impl From<UpdateExperienceReq> for ExperiencePatch {
    fn from(r: UpdateExperienceReq) -> Self {
        Self {
            position: r.position,
            company: r.company,
            description: r.description,
            start_date: r.start_date,
            end_date: r.end_date,
            is_currently_working: r.is_currently_working,
            responsibilities: r.responsibilities,
        }
    }
}

// ---- projects ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub technologies: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectDto {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            link: p.link,
            technologies: p.technologies,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProjectReq {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub link: Option<String>,
    #[validate(length(min = 1, message = "technologies is required"))]
    pub technologies: String,
}

impl From<CreateProjectReq> for NewProject {
    fn from(r: CreateProjectReq) -> Self {
        Self {
            name: r.name,
            description: r.description,
            link: r.link,
            technologies: r.technologies,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProjectReq {
    pub name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub technologies: Option<String>,
}

impl From<UpdateProjectReq> for ProjectPatch {
    fn from(r: UpdateProjectReq) -> Self {
        Self {
            name: r.name,
            description: r.description,
            link: r.link,
            technologies: r.technologies,
        }
    }
}

// ---- bookings ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDto {
    pub id: i32,
    pub user_id: i32,
    pub booking_date_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_ids: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_ids: Option<Vec<i32>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            booking_date_time: b.booking_date_time,
            meeting_link: b.meeting_link,
            question_ids: None,
            skill_ids: None,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

impl From<BookingDetails> for BookingDto {
    fn from(d: BookingDetails) -> Self {
        Self {
            question_ids: Some(d.question_ids),
            skill_ids: Some(d.skill_ids),
            ..BookingDto::from(d.booking)
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingReq {
    pub user_id: i32,
    pub booking_date_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub question_ids: Vec<i32>,
    #[serde(default)]
    pub skill_ids: Vec<i32>,
}

impl From<CreateBookingReq> for NewBooking {
    fn from(r: CreateBookingReq) -> Self {
        Self {
            user_id: r.user_id,
            booking_date_time: r.booking_date_time,
            meeting_link: r.meeting_link,
            question_ids: r.question_ids,
            skill_ids: r.skill_ids,
        }
    }
}

// ---- questions ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOptionDto {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDto {
    pub id: i32,
    pub question: String,
    pub question_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOptionDto>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Question> for QuestionDto {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question: q.question,
            question_type: q.question_type,
            options: None,
            created_at: q.created_at,
            updated_at: q.updated_at,
        }
    }
}

impl From<QuestionDetails> for QuestionDto {
    fn from(d: QuestionDetails) -> Self {
        let options = d
            .options
            .into_iter()
            .map(|o| QuestionOptionDto {
                id: o.id,
                name: o.name,
            })
            .collect();
        Self {
            options: Some(options),
            ..QuestionDto::from(d.question)
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionReq {
    #[validate(length(min = 1, message = "question is required"))]
    pub question: String,
    #[validate(length(min = 1, message = "question_type is required"))]
    pub question_type: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl From<CreateQuestionReq> for NewQuestion {
    fn from(r: CreateQuestionReq) -> Self {
        Self {
            question: r.question,
            question_type: r.question_type,
            options: r.options,
        }
    }
}
