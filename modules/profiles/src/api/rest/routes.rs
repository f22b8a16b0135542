use axum::{
    routing::{get, patch, post, put},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::module::Services;

/// All profile routes, with the services injected as extensions.
pub fn router(services: Services) -> Router {
    Router::new()
        // lookups
        .route("/user-categories", get(handlers::list_user_categories))
        .route("/roles", get(handlers::list_roles))
        // users
        .route(
            "/users",
            post(handlers::create_user).get(handlers::list_users),
        )
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/users/{id}/roles", put(handlers::assign_roles))
        // educations
        .route(
            "/users/{id}/educations",
            post(handlers::add_education)
                .get(handlers::list_educations)
                .delete(handlers::delete_educations),
        )
        .route(
            "/users/{id}/educations/{edu_id}",
            get(handlers::get_education)
                .patch(handlers::update_education)
                .delete(handlers::delete_education),
        )
        // skill categories
        .route(
            "/skills/categories",
            post(handlers::create_skill_categories).get(handlers::list_skill_categories),
        )
        .route(
            "/skills/categories/{id}",
            get(handlers::get_skill_category)
                .patch(handlers::update_skill_category)
                .delete(handlers::delete_skill_category),
        )
        // skills
        .route(
            "/skills",
            post(handlers::create_skill).get(handlers::list_skills),
        )
        .route(
            "/skills/{id}",
            get(handlers::get_skill)
                .patch(handlers::update_skill)
                .delete(handlers::delete_skill),
        )
        // experience
        .route("/experience", post(handlers::add_experience))
        .route(
            "/experience/{id}",
            patch(handlers::update_experience).delete(handlers::delete_experience),
        )
        .route(
            "/users/{id}/experience",
            get(handlers::list_experiences).delete(handlers::delete_experiences),
        )
        .route(
            "/users/{id}/experience/{exp_id}",
            get(handlers::get_experience),
        )
        // projects
        .route(
            "/users/{id}/projects",
            post(handlers::add_project)
                .get(handlers::list_projects)
                .delete(handlers::delete_projects),
        )
        .route(
            "/users/{id}/projects/{proj_id}",
            get(handlers::get_project),
        )
        .route(
            "/projects/{id}",
            patch(handlers::update_project).delete(handlers::delete_project),
        )
        // bookings
        .route("/bookings", post(handlers::create_booking))
        .route(
            "/bookings/{id}",
            get(handlers::get_booking).delete(handlers::delete_booking),
        )
        .route("/users/{id}/bookings", get(handlers::list_bookings))
        // questions
        .route(
            "/questions",
            post(handlers::create_question).get(handlers::list_questions),
        )
        .route(
            "/questions/{id}",
            get(handlers::get_question).delete(handlers::delete_question),
        )
        .layer(Extension(services.users))
        .layer(Extension(services.skills))
        .layer(Extension(services.experience))
        .layer(Extension(services.projects))
        .layer(Extension(services.bookings))
        .layer(Extension(services.questions))
}
