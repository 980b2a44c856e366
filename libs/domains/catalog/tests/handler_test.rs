//! Handler tests for the catalog domain
//!
//! These tests verify that HTTP handlers work correctly:
//! - Query string deserialization (filters, pagination)
//! - Response serialization
//! - HTTP status codes
//! - Error responses
//!
//! They run against the in-memory repository, so no database is needed.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::ShutdownSignal;
use domain_catalog::*;
use http_body_util::BodyExt;
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn seeded_app() -> Router {
    let service = CatalogService::new(InMemoryCourseRepository::new());
    service
        .seed(&seed::catalog(), 5, &ShutdownSignal::never())
        .await
        .unwrap();
    handlers::router(service)
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_list_courses_returns_seeded_catalog() {
    let response = get(seeded_app().await, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let courses: Vec<Course> = json_body(response.into_body()).await;
    assert_eq!(courses.len(), seed::catalog().len());

    // Ordered by slug
    let slugs: Vec<_> = courses.iter().map(|c| c.slug.clone()).collect();
    let mut sorted = slugs.clone();
    sorted.sort();
    assert_eq!(slugs, sorted);
}

#[tokio::test]
async fn test_list_courses_applies_filters() {
    let response = get(seeded_app().await, "/?category=data&level=advanced").await;
    assert_eq!(response.status(), StatusCode::OK);

    let courses: Vec<Course> = json_body(response.into_body()).await;
    assert!(!courses.is_empty());
    assert!(
        courses
            .iter()
            .all(|c| c.category == "data" && c.level == CourseLevel::Advanced)
    );
}

#[tokio::test]
async fn test_list_courses_paginates() {
    let response = get(seeded_app().await, "/?limit=2&offset=1").await;
    let courses: Vec<Course> = json_body(response.into_body()).await;
    assert_eq!(courses.len(), 2);
}

#[tokio::test]
async fn test_list_courses_rejects_unknown_level() {
    let response = get(seeded_app().await, "/?level=expert").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_course_by_id() {
    let id = course_id("rust-fundamentals");
    let response = get(seeded_app().await, &format!("/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let course: Course = json_body(response.into_body()).await;
    assert_eq!(course.slug, "rust-fundamentals");
}

#[tokio::test]
async fn test_get_course_by_slug() {
    let response = get(seeded_app().await, "/by-slug/sql-from-zero").await;
    assert_eq!(response.status(), StatusCode::OK);

    let course: Course = json_body(response.into_body()).await;
    assert_eq!(course.id, course_id("sql-from-zero"));
}

#[tokio::test]
async fn test_unknown_course_returns_json_404() {
    let response = get(seeded_app().await, "/by-slug/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], 1004);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_id_returns_400() {
    let response = get(seeded_app().await, "/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "BAD_REQUEST");
}
