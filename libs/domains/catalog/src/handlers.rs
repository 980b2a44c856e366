use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Course, CourseFilter};
use crate::repository::CourseRepository;
use crate::service::CatalogService;

/// Create the course router with all HTTP endpoints
pub fn router<R: CourseRepository + 'static>(service: CatalogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_courses))
        .route("/{id}", get(get_course))
        .route("/by-slug/{slug}", get(get_course_by_slug))
        .with_state(shared_service)
}

/// List courses with optional filters
async fn list_courses<R: CourseRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(filter): Query<CourseFilter>,
) -> CatalogResult<Json<Vec<Course>>> {
    let courses = service.list_courses(filter).await?;
    Ok(Json(courses))
}

/// Get a course by ID
async fn get_course<R: CourseRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<Course>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| CatalogError::Validation(format!("'{}' is not a valid course id", id)))?;
    let course = service.get_course(id).await?;
    Ok(Json(course))
}

/// Get a course by slug
async fn get_course_by_slug<R: CourseRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(slug): Path<String>,
) -> CatalogResult<Json<Course>> {
    let course = service.get_course_by_slug(&slug).await?;
    Ok(Json(course))
}
