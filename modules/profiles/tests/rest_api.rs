use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use profile_db::{ConnectOpts, DbHandle};
use profiles::infra::seed::{SeedData, SeedEntry};
use profiles::{ProfilesConfig, ProfilesModule};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

async fn app() -> Router {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("connect");
    let module = ProfilesModule::init(db.sea(), ProfilesConfig::default());
    module.migrate().await.expect("migrate");
    module
        .seed(&SeedData {
            categories: vec![],
            roles: vec![
                SeedEntry { id: 1, name: "Admin".into() },
                SeedEntry { id: 2, name: "Mentor".into() },
            ],
            skill_categories: vec![SeedEntry { id: 1, name: "Backend".into() }],
        })
        .await;
    module.router()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Option<String>, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, content_type, json)
}

async fn create_user(app: &Router, email: &str) -> i64 {
    let (status, _, body) = send(
        app,
        Method::POST,
        "/users",
        Some(json!({"first_name": "Ada", "last_name": "Lovelace", "email": email})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn user_crud_over_http() {
    let app = app().await;
    let id = create_user(&app, "ada@example.com").await;

    let (status, _, body) = send(&app, Method::GET, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["roles"], json!([]));

    let (status, _, body) = send(
        &app,
        Method::PATCH,
        &format!("/users/{id}"),
        Some(json!({"location": "London"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "London");

    let (status, _, body) = send(&app, Method::GET, "/users?limit=1&order_by=email%20desc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["records_filtered"], 1);
    assert_eq!(body["limit"], 1);

    let (status, _, _) = send(&app, Method::DELETE, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, content_type, body) = send(&app, Method::GET, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    assert_eq!(body["code"], "PROFILES_NOT_FOUND");
    assert_eq!(body["instance"], format!("/users/{id}"));
}

#[tokio::test]
async fn invalid_body_reports_field_pointers() {
    let app = app().await;

    let (status, content_type, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"first_name": "Ada", "last_name": "L", "email": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    assert_eq!(body["code"], "PROFILES_VALIDATION");
    assert_eq!(body["errors"][0]["pointer"], "/email");

    let (status, _, body) = send(&app, Method::POST, "/users", Some(json!({"first_name": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PROFILES_BAD_REQUEST");
}

#[tokio::test]
async fn patching_an_invalid_email_is_rejected() {
    let app = app().await;
    let id = create_user(&app, "ada@example.com").await;

    let (status, _, body) = send(
        &app,
        Method::PATCH,
        &format!("/users/{id}"),
        Some(json!({"email": "  not an email@x.y  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PROFILES_VALIDATION");
    assert_eq!(body["errors"][0]["pointer"], "/email");

    // Blank leaves the stored address alone
    let (status, _, body) = send(
        &app,
        Method::PATCH,
        &format!("/users/{id}"),
        Some(json!({"email": " "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn bad_list_parameters_are_rejected() {
    let app = app().await;

    let (status, _, body) = send(&app, Method::GET, "/users?limit=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PROFILES_BAD_REQUEST");

    let (status, _, body) = send(&app, Method::GET, "/users?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PROFILES_VALIDATION");

    let (status, _, body) = send(&app, Method::GET, "/skills?order_by=password", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["pointer"], "/order_by");
}

#[tokio::test]
async fn roles_and_lookups() {
    let app = app().await;
    let id = create_user(&app, "grace@example.com").await;

    let (status, _, body) = send(&app, Method::GET, "/roles", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, _, body) = send(
        &app,
        Method::PUT,
        &format!("/users/{id}/roles"),
        Some(json!({"role_ids": [2]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Mentor");

    let (status, _, body) = send(
        &app,
        Method::PUT,
        &format!("/users/{id}/roles"),
        Some(json!({"role_ids": [9]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PROFILES_NOT_FOUND");
}

#[tokio::test]
async fn education_date_range_is_checked() {
    let app = app().await;
    let id = create_user(&app, "edu@example.com").await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        &format!("/users/{id}/educations"),
        Some(json!({
            "institution_name": "ETH",
            "start_date": "2020-09-01",
            "end_date": "2019-06-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["pointer"], "/end_date");

    let (status, _, _) = send(
        &app,
        Method::POST,
        &format!("/users/{id}/educations"),
        Some(json!({
            "institution_name": "ETH",
            "start_date": "2015-09-01",
            "end_date": "2019-06-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = send(&app, Method::GET, &format!("/users/{id}/educations"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["institution_name"], "ETH");
}

#[tokio::test]
async fn skills_and_questions_over_http() {
    let app = app().await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/skills/categories",
        Some(json!({"name": ["Cloud", "Mobile"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/skills",
        Some(json!({"name": "Rust", "skill_category_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["skill_category"]["name"], "Backend");
    let skill_id = body["id"].as_i64().unwrap();

    let (status, _, _) = send(&app, Method::DELETE, &format!("/skills/{skill_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, Method::GET, &format!("/skills/{skill_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/questions",
        Some(json!({"question": "Level?", "question_type": "choice", "options": ["Junior", " "]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["pointer"], "/options/1/name");

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/questions",
        Some(json!({"question": "Level?", "question_type": "choice", "options": ["Junior", "Senior"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["options"][1]["name"], "Senior");
}
