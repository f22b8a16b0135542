//! Extractors that reject with Problem Details instead of axum's plain-text bodies.

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use problem_details::{validation_errors, ProblemResponse};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::api::rest::error::{from_parts, validation_problem};

/// JSON body that must deserialize and pass `Validate`.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_string();
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                // Missing content type keeps its 415; every other body problem is a 400.
                let status = match rejection.status() {
                    StatusCode::UNSUPPORTED_MEDIA_TYPE => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    _ => StatusCode::BAD_REQUEST,
                };
                from_parts(
                    status,
                    "PROFILES_BAD_REQUEST",
                    "Invalid request body",
                    rejection.body_text(),
                    &instance,
                )
            })?;
        if let Err(errors) = value.validate() {
            return Err(validation_problem(
                "Request body failed validation",
                validation_errors(&errors),
                &instance,
            ));
        }
        Ok(ValidJson(value))
    }
}

/// Query string; malformed values (e.g. `limit=abc`) become a 400 problem.
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                from_parts(
                    rejection.status(),
                    "PROFILES_BAD_REQUEST",
                    "Invalid query parameters",
                    rejection.body_text(),
                    parts.uri.path(),
                )
            })?;
        Ok(ValidQuery(value))
    }
}
