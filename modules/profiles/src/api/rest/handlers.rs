use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use problem_details::ProblemResponse;
use tracing::info;

use crate::api::rest::dto::*;
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{ValidJson, ValidQuery};
use crate::domain::error::DomainError;
use crate::domain::service::{
    BookingsService, ExperienceService, ProjectsService, QuestionsService, SkillsService,
    UsersService,
};

type ApiResult<T> = Result<T, ProblemResponse>;

fn problem(uri: &Uri) -> impl Fn(DomainError) -> ProblemResponse + '_ {
    move |e| map_domain_error(&e, uri.path())
}

// ---- lookups ----

pub async fn list_user_categories(
    Extension(svc): Extension<Arc<UsersService>>,
    uri: Uri,
) -> ApiResult<Json<ListDto<ReferenceDto>>> {
    let items = svc.list_user_categories().await.map_err(problem(&uri))?;
    Ok(Json(ListDto::from_items(items)))
}

pub async fn list_roles(
    Extension(svc): Extension<Arc<UsersService>>,
    uri: Uri,
) -> ApiResult<Json<ListDto<ReferenceDto>>> {
    let items = svc.list_roles().await.map_err(problem(&uri))?;
    Ok(Json(ListDto::from_items(items)))
}

// ---- users ----

pub async fn create_user(
    Extension(svc): Extension<Arc<UsersService>>,
    uri: Uri,
    ValidJson(req): ValidJson<CreateUserReq>,
) -> ApiResult<(StatusCode, Json<UserDto>)> {
    let user = svc.create_user(req.into()).await.map_err(problem(&uri))?;
    info!(user_id = user.id, "Created user");
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn list_users(
    Extension(svc): Extension<Arc<UsersService>>,
    ValidQuery(query): ValidQuery<ListQuery>,
    uri: Uri,
) -> ApiResult<Json<ListDto<UserDto>>> {
    let page = svc.list_users(query.into()).await.map_err(problem(&uri))?;
    Ok(Json(ListDto::from_page(page)))
}

pub async fn get_user(
    Extension(svc): Extension<Arc<UsersService>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> ApiResult<Json<UserDetailsDto>> {
    let details = svc.get_user_details(id).await.map_err(problem(&uri))?;
    Ok(Json(details.into()))
}

pub async fn update_user(
    Extension(svc): Extension<Arc<UsersService>>,
    Path(id): Path<i32>,
    uri: Uri,
    ValidJson(req): ValidJson<UpdateUserReq>,
) -> ApiResult<Json<UserDto>> {
    let user = svc.update_user(id, req.into()).await.map_err(problem(&uri))?;
    Ok(Json(user.into()))
}

pub async fn delete_user(
    Extension(svc): Extension<Arc<UsersService>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    svc.delete_user(id).await.map_err(problem(&uri))?;
    info!(user_id = id, "Deleted user");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_roles(
    Extension(svc): Extension<Arc<UsersService>>,
    Path(id): Path<i32>,
    uri: Uri,
    ValidJson(req): ValidJson<AssignRolesReq>,
) -> ApiResult<Json<Vec<ReferenceDto>>> {
    let roles = svc
        .assign_roles(id, &req.role_ids)
        .await
        .map_err(problem(&uri))?;
    Ok(Json(roles.into_iter().map(Into::into).collect()))
}

// ---- educations ----

pub async fn add_education(
    Extension(svc): Extension<Arc<UsersService>>,
    Path(user_id): Path<i32>,
    uri: Uri,
    ValidJson(req): ValidJson<CreateEducationReq>,
) -> ApiResult<(StatusCode, Json<EducationDto>)> {
    let education = svc
        .add_education(req.into_new(user_id))
        .await
        .map_err(problem(&uri))?;
    Ok((StatusCode::CREATED, Json(education.into())))
}

pub async fn list_educations(
    Extension(svc): Extension<Arc<UsersService>>,
    Path(user_id): Path<i32>,
    ValidQuery(query): ValidQuery<ListQuery>,
    uri: Uri,
) -> ApiResult<Json<ListDto<EducationDto>>> {
    let page = svc
        .list_educations(user_id, query.into())
        .await
        .map_err(problem(&uri))?;
    Ok(Json(ListDto::from_page(page)))
}

pub async fn delete_educations(
    Extension(svc): Extension<Arc<UsersService>>,
    Path(user_id): Path<i32>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    let removed = svc.delete_educations(user_id).await.map_err(problem(&uri))?;
    info!(user_id, removed, "Deleted educations");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_education(
    Extension(svc): Extension<Arc<UsersService>>,
    Path((user_id, id)): Path<(i32, i32)>,
    uri: Uri,
) -> ApiResult<Json<EducationDto>> {
    let education = svc.get_education(user_id, id).await.map_err(problem(&uri))?;
    Ok(Json(education.into()))
}

pub async fn update_education(
    Extension(svc): Extension<Arc<UsersService>>,
    Path((user_id, id)): Path<(i32, i32)>,
    uri: Uri,
    ValidJson(req): ValidJson<UpdateEducationReq>,
) -> ApiResult<Json<EducationDto>> {
    let education = svc
        .update_education(user_id, id, req.into())
        .await
        .map_err(problem(&uri))?;
    Ok(Json(education.into()))
}

pub async fn delete_education(
    Extension(svc): Extension<Arc<UsersService>>,
    Path((user_id, id)): Path<(i32, i32)>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    svc.delete_education(user_id, id)
        .await
        .map_err(problem(&uri))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- skill categories ----

pub async fn create_skill_categories(
    Extension(svc): Extension<Arc<SkillsService>>,
    uri: Uri,
    ValidJson(req): ValidJson<CreateSkillCategoriesReq>,
) -> ApiResult<(StatusCode, Json<Vec<ReferenceDto>>)> {
    let created = svc
        .create_categories(req.name)
        .await
        .map_err(problem(&uri))?;
    Ok((
        StatusCode::CREATED,
        Json(created.into_iter().map(Into::into).collect()),
    ))
}

pub async fn list_skill_categories(
    Extension(svc): Extension<Arc<SkillsService>>,
    ValidQuery(query): ValidQuery<ListQuery>,
    uri: Uri,
) -> ApiResult<Json<ListDto<ReferenceDto>>> {
    let page = svc
        .list_categories(query.into())
        .await
        .map_err(problem(&uri))?;
    Ok(Json(ListDto::from_page(page)))
}

pub async fn get_skill_category(
    Extension(svc): Extension<Arc<SkillsService>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> ApiResult<Json<ReferenceDto>> {
    let category = svc.get_category(id).await.map_err(problem(&uri))?;
    Ok(Json(category.into()))
}

pub async fn update_skill_category(
    Extension(svc): Extension<Arc<SkillsService>>,
    Path(id): Path<i32>,
    uri: Uri,
    ValidJson(req): ValidJson<UpdateSkillCategoryReq>,
) -> ApiResult<Json<ReferenceDto>> {
    let category = svc
        .rename_category(id, req.name)
        .await
        .map_err(problem(&uri))?;
    Ok(Json(category.into()))
}

pub async fn delete_skill_category(
    Extension(svc): Extension<Arc<SkillsService>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    svc.delete_category(id).await.map_err(problem(&uri))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- skills ----

pub async fn create_skill(
    Extension(svc): Extension<Arc<SkillsService>>,
    uri: Uri,
    ValidJson(req): ValidJson<CreateSkillReq>,
) -> ApiResult<(StatusCode, Json<SkillDto>)> {
    let skill = svc.create_skill(req.into()).await.map_err(problem(&uri))?;
    Ok((StatusCode::CREATED, Json(skill.into())))
}

pub async fn list_skills(
    Extension(svc): Extension<Arc<SkillsService>>,
    ValidQuery(query): ValidQuery<ListQuery>,
    uri: Uri,
) -> ApiResult<Json<ListDto<SkillDto>>> {
    let page = svc.list_skills(query.into()).await.map_err(problem(&uri))?;
    Ok(Json(ListDto::from_page(page)))
}

pub async fn get_skill(
    Extension(svc): Extension<Arc<SkillsService>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> ApiResult<Json<SkillDto>> {
    let skill = svc.get_skill(id).await.map_err(problem(&uri))?;
    Ok(Json(skill.into()))
}

pub async fn update_skill(
    Extension(svc): Extension<Arc<SkillsService>>,
    Path(id): Path<i32>,
    uri: Uri,
    ValidJson(req): ValidJson<UpdateSkillReq>,
) -> ApiResult<Json<SkillDto>> {
    let skill = svc
        .update_skill(id, req.into())
        .await
        .map_err(problem(&uri))?;
    Ok(Json(skill.into()))
}

pub async fn delete_skill(
    Extension(svc): Extension<Arc<SkillsService>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    svc.delete_skill(id).await.map_err(problem(&uri))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- experience ----

pub async fn add_experience(
    Extension(svc): Extension<Arc<ExperienceService>>,
    uri: Uri,
    ValidJson(req): ValidJson<CreateExperienceReq>,
) -> ApiResult<(StatusCode, Json<ExperienceDto>)> {
    let created = svc
        .add_experience(req.user_id, req.skill_id, req.experience.into())
        .await
        .map_err(problem(&uri))?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn list_experiences(
    Extension(svc): Extension<Arc<ExperienceService>>,
    Path(user_id): Path<i32>,
    ValidQuery(query): ValidQuery<ListQuery>,
    uri: Uri,
) -> ApiResult<Json<ListDto<ExperienceDto>>> {
    let page = svc
        .list_experiences(user_id, query.into())
        .await
        .map_err(problem(&uri))?;
    Ok(Json(ListDto::from_page(page)))
}

pub async fn delete_experiences(
    Extension(svc): Extension<Arc<ExperienceService>>,
    Path(user_id): Path<i32>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    let removed = svc
        .delete_experiences(user_id)
        .await
        .map_err(problem(&uri))?;
    info!(user_id, removed, "Deleted experiences");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_experience(
    Extension(svc): Extension<Arc<ExperienceService>>,
    Path((user_id, id)): Path<(i32, i32)>,
    uri: Uri,
) -> ApiResult<Json<ExperienceDto>> {
    let experience = svc
        .get_experience(user_id, id)
        .await
        .map_err(problem(&uri))?;
    Ok(Json(experience.into()))
}

pub async fn update_experience(
    Extension(svc): Extension<Arc<ExperienceService>>,
    Path(id): Path<i32>,
    uri: Uri,
    ValidJson(req): ValidJson<UpdateExperienceReq>,
) -> ApiResult<Json<ExperienceDto>> {
    let experience = svc
        .update_experience(id, req.into())
        .await
        .map_err(problem(&uri))?;
    Ok(Json(experience.into()))
}

pub async fn delete_experience(
    Extension(svc): Extension<Arc<ExperienceService>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    svc.delete_experience(id).await.map_err(problem(&uri))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- projects ----

pub async fn add_project(
    Extension(svc): Extension<Arc<ProjectsService>>,
    Path(user_id): Path<i32>,
    uri: Uri,
    ValidJson(req): ValidJson<CreateProjectReq>,
) -> ApiResult<(StatusCode, Json<ProjectDto>)> {
    let project = svc
        .add_project(user_id, req.into())
        .await
        .map_err(problem(&uri))?;
    Ok((StatusCode::CREATED, Json(project.into())))
}

pub async fn list_projects(
    Extension(svc): Extension<Arc<ProjectsService>>,
    Path(user_id): Path<i32>,
    ValidQuery(query): ValidQuery<ListQuery>,
    uri: Uri,
) -> ApiResult<Json<ListDto<ProjectDto>>> {
    let page = svc
        .list_projects(user_id, query.into())
        .await
        .map_err(problem(&uri))?;
    Ok(Json(ListDto::from_page(page)))
}

pub async fn delete_projects(
    Extension(svc): Extension<Arc<ProjectsService>>,
    Path(user_id): Path<i32>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    let removed = svc.delete_projects(user_id).await.map_err(problem(&uri))?;
    info!(user_id, removed, "Deleted projects");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_project(
    Extension(svc): Extension<Arc<ProjectsService>>,
    Path((user_id, id)): Path<(i32, i32)>,
    uri: Uri,
) -> ApiResult<Json<ProjectDto>> {
    let project = svc.get_project(user_id, id).await.map_err(problem(&uri))?;
    Ok(Json(project.into()))
}

pub async fn update_project(
    Extension(svc): Extension<Arc<ProjectsService>>,
    Path(id): Path<i32>,
    uri: Uri,
    ValidJson(req): ValidJson<UpdateProjectReq>,
) -> ApiResult<Json<ProjectDto>> {
    let project = svc
        .update_project(id, req.into())
        .await
        .map_err(problem(&uri))?;
    Ok(Json(project.into()))
}

pub async fn delete_project(
    Extension(svc): Extension<Arc<ProjectsService>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    svc.delete_project(id).await.map_err(problem(&uri))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- bookings ----

pub async fn create_booking(
    Extension(svc): Extension<Arc<BookingsService>>,
    uri: Uri,
    ValidJson(req): ValidJson<CreateBookingReq>,
) -> ApiResult<(StatusCode, Json<BookingDto>)> {
    let booking = svc.create_booking(req.into()).await.map_err(problem(&uri))?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

pub async fn get_booking(
    Extension(svc): Extension<Arc<BookingsService>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> ApiResult<Json<BookingDto>> {
    let booking = svc.get_booking(id).await.map_err(problem(&uri))?;
    Ok(Json(booking.into()))
}

pub async fn delete_booking(
    Extension(svc): Extension<Arc<BookingsService>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    svc.delete_booking(id).await.map_err(problem(&uri))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_bookings(
    Extension(svc): Extension<Arc<BookingsService>>,
    Path(user_id): Path<i32>,
    ValidQuery(query): ValidQuery<ListQuery>,
    uri: Uri,
) -> ApiResult<Json<ListDto<BookingDto>>> {
    let page = svc
        .list_bookings(user_id, query.into())
        .await
        .map_err(problem(&uri))?;
    Ok(Json(ListDto::from_page(page)))
}

// ---- questions ----

pub async fn create_question(
    Extension(svc): Extension<Arc<QuestionsService>>,
    uri: Uri,
    ValidJson(req): ValidJson<CreateQuestionReq>,
) -> ApiResult<(StatusCode, Json<QuestionDto>)> {
    let question = svc
        .create_question(req.into())
        .await
        .map_err(problem(&uri))?;
    Ok((StatusCode::CREATED, Json(question.into())))
}

pub async fn list_questions(
    Extension(svc): Extension<Arc<QuestionsService>>,
    ValidQuery(query): ValidQuery<ListQuery>,
    uri: Uri,
) -> ApiResult<Json<ListDto<QuestionDto>>> {
    let page = svc
        .list_questions(query.into())
        .await
        .map_err(problem(&uri))?;
    Ok(Json(ListDto::from_page(page)))
}

pub async fn get_question(
    Extension(svc): Extension<Arc<QuestionsService>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> ApiResult<Json<QuestionDto>> {
    let question = svc.get_question(id).await.map_err(problem(&uri))?;
    Ok(Json(question.into()))
}

pub async fn delete_question(
    Extension(svc): Extension<Arc<QuestionsService>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> ApiResult<StatusCode> {
    svc.delete_question(id).await.map_err(problem(&uri))?;
    Ok(StatusCode::NO_CONTENT)
}
