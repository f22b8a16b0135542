//! RFC 9457 Problem Details for the HTTP surface, plus static catalog entries
//! (`ErrDef`) that turn into problems with a stable `code` and `type`.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// RFC 9457 Problem Details for HTTP APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    /// A short, human-readable summary of the problem type.
    pub title: String,
    /// The HTTP status code for this occurrence of the problem.
    pub status: u16,
    /// A human-readable explanation specific to this occurrence.
    pub detail: String,
    /// A URI reference that identifies the specific occurrence.
    pub instance: String,
    /// Machine-readable error code defined by the application.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Field-level failures for 4xx problems.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub detail: String,
    /// JSON Pointer to the invalid location (e.g., "/user/email").
    pub pointer: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            request_id: None,
            errors: None,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationError>) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Flatten `validator` errors into JSON-pointer entries, sorted by pointer.
/// Nested structs and lists extend the pointer (`/experience/position`, `/items/0/name`).
pub fn validation_errors(errors: &validator::ValidationErrors) -> Vec<ValidationError> {
    let mut out = Vec::new();
    collect_validation_errors(errors, "", &mut out);
    out.sort_by(|a, b| a.pointer.cmp(&b.pointer));
    out
}

fn collect_validation_errors(
    errors: &validator::ValidationErrors,
    prefix: &str,
    out: &mut Vec<ValidationError>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let pointer = format!("{prefix}/{field}");
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| ValidationError {
                    detail: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field}: {}", e.code)),
                    pointer: pointer.clone(),
                }));
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_validation_errors(inner, &pointer, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_errors(inner, &format!("{pointer}/{index}"), out);
                }
            }
        }
    }
}

/// Axum response wrapper that renders `Problem` with correct status & content type.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut resp = axum::Json(self.0).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

/// Static error definition from a module's error catalog.
#[derive(Debug, Clone, Copy)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        Problem::new(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            self.title,
            detail.into(),
        )
        .with_code(self.code)
        .with_type(self.type_url)
    }

    /// Problem response bound to the request path.
    pub fn respond(&self, detail: impl Into<String>, instance: &str) -> ProblemResponse {
        ProblemResponse(self.to_problem(detail).with_instance(instance))
    }
}

pub fn bad_request(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::BAD_REQUEST, "Bad Request", detail).into()
}

pub fn not_found(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::NOT_FOUND, "Not Found", detail).into()
}

pub fn internal_error(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        detail,
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn problem_into_response_sets_status_and_content_type() {
        let p = Problem::new(StatusCode::BAD_REQUEST, "Bad Request", "invalid payload");
        let resp = ProblemResponse(p).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let ct = resp
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert_eq!(ct, APPLICATION_PROBLEM_JSON);
    }

    #[tokio::test]
    async fn problem_body_uses_rfc_field_names() {
        let p = Problem::new(StatusCode::NOT_FOUND, "Not Found", "user 7 missing")
            .with_code("PROFILES_NOT_FOUND")
            .with_instance("/users/7");
        let resp = ProblemResponse(p).into_response();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["type"], "about:blank");
        assert_eq!(json["status"], 404);
        assert_eq!(json["instance"], "/users/7");
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn err_def_to_problem_works() {
        let def = ErrDef {
            status: 404,
            title: "Not Found",
            code: "TEST_NOT_FOUND",
            type_url: "https://errors.example.com/TEST_NOT_FOUND",
        };

        let problem = def.respond("Resource missing", "/things/1").0;
        assert_eq!(problem.status, 404);
        assert_eq!(problem.detail, "Resource missing");
        assert_eq!(problem.code, "TEST_NOT_FOUND");
        assert_eq!(problem.instance, "/things/1");
        assert_eq!(problem.type_url, "https://errors.example.com/TEST_NOT_FOUND");
    }

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn validator_errors_become_pointers() {
        let signup = Signup {
            name: String::new(),
            email: "nope".into(),
        };
        let errs = signup.validate().unwrap_err();
        let mapped = validation_errors(&errs);

        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped[0].pointer, "/email");
        assert_eq!(mapped[0].detail, "email: email");
        assert_eq!(mapped[1].pointer, "/name");
        assert_eq!(mapped[1].detail, "name is required");
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(nested)]
        inner: Signup,
    }

    #[test]
    fn nested_errors_extend_the_pointer() {
        let outer = Outer {
            inner: Signup {
                name: String::new(),
                email: "a@b.io".into(),
            },
        };
        let mapped = validation_errors(&outer.validate().unwrap_err());
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].pointer, "/inner/name");
    }

    #[test]
    fn convenience_constructors() {
        assert_eq!(bad_request("x").0.status, 400);
        assert_eq!(not_found("x").0.status, 404);
        assert_eq!(internal_error("x").0.title, "Internal Server Error");
    }
}
