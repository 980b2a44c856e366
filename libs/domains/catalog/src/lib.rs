//! Catalog Domain
//!
//! Courses offered by the marketplace: read APIs for the HTTP server and the
//! idempotent seeding used by `course server seed`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌─────────┐
//! │   Service   │ ──► │  Cache  │  ← read-through, optional
//! └──────┬──────┘     └─────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{handlers, repository::InMemoryCourseRepository, service::CatalogService};
//!
//! let service = CatalogService::new(InMemoryCourseRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod cache;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod seed;
pub mod service;

// Re-export commonly used types
pub use cache::{CourseCache, RedisCourseCache};
pub use error::{CatalogError, CatalogResult};
pub use models::{Course, CourseFilter, CourseLevel, NewCourse, course_id};
pub use postgres::PgCourseRepository;
pub use repository::{CourseRepository, InMemoryCourseRepository};
pub use service::{CatalogService, SeedReport};
