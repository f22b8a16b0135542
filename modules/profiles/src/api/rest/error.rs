use axum::http::StatusCode;
use problem_details::{Problem, ProblemResponse, ValidationError};

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{code}"))
        .with_code(code)
        .with_instance(instance);
    ProblemResponse(problem)
}

/// 400 with one `errors[]` entry per failing field.
pub fn validation_problem(
    detail: impl Into<String>,
    errors: Vec<ValidationError>,
    instance: &str,
) -> ProblemResponse {
    let ProblemResponse(problem) = from_parts(
        StatusCode::BAD_REQUEST,
        "PROFILES_VALIDATION",
        "Validation error",
        detail,
        instance,
    );
    ProblemResponse(problem.with_errors(errors))
}

/// `options[1].name` → `/options/1/name`
fn field_pointer(field: &str) -> String {
    let mut pointer = String::with_capacity(field.len() + 1);
    for part in field.split(['.', '[']) {
        let part = part.trim_end_matches(']');
        if !part.is_empty() {
            pointer.push('/');
            pointer.push_str(part);
        }
    }
    pointer
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::NotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "PROFILES_NOT_FOUND",
            "Not found",
            e.to_string(),
            instance,
        ),
        DomainError::Validation { field, message } => validation_problem(
            e.to_string(),
            vec![ValidationError {
                detail: message.clone(),
                pointer: field_pointer(field),
            }],
            instance,
        ),
        DomainError::InvalidDateRange { .. } => validation_problem(
            e.to_string(),
            vec![ValidationError {
                detail: e.to_string(),
                pointer: "/end_date".to_string(),
            }],
            instance,
        ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let p = map_domain_error(&DomainError::not_found("User", 7), "/users/7").0;
        assert_eq!(p.status, 404);
        assert_eq!(p.code, "PROFILES_NOT_FOUND");
        assert_eq!(p.detail, "User not found: 7");
        assert_eq!(p.instance, "/users/7");
    }

    #[test]
    fn validation_carries_a_pointer() {
        let e = DomainError::validation("options[1].name", "must not be empty");
        let p = map_domain_error(&e, "/questions").0;
        assert_eq!(p.status, 400);
        let errors = p.errors.unwrap();
        assert_eq!(errors[0].pointer, "/options/1/name");
        assert_eq!(errors[0].detail, "must not be empty");
    }

    #[test]
    fn database_detail_is_hidden() {
        let p = map_domain_error(&DomainError::database("disk I/O error at page 3"), "/users").0;
        assert_eq!(p.status, 500);
        assert_eq!(p.code, "INTERNAL_DB");
        assert!(!p.detail.contains("disk"));
    }

    #[test]
    fn pointers_from_plain_and_indexed_fields() {
        assert_eq!(field_pointer("email"), "/email");
        assert_eq!(field_pointer("name[0]"), "/name/0");
    }
}
