use axum::{http::Uri, response::Json};
use problem_details::{ErrDef, ProblemResponse};
use serde_json::{json, Value};

const ROUTE_NOT_FOUND: ErrDef = ErrDef {
    status: 404,
    title: "Not Found",
    code: "ROUTE_NOT_FOUND",
    type_url: "about:blank",
};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Fallback for unmatched paths, rendered as a problem document.
pub async fn route_not_found(uri: Uri) -> ProblemResponse {
    ROUTE_NOT_FOUND.respond(
        format!("No route for path '{}'", uri.path()),
        uri.path(),
    )
}
