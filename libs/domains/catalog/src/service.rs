use axum_helpers::ShutdownSignal;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::cache::CourseCache;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{Course, CourseFilter, NewCourse};
use crate::repository::CourseRepository;

/// Outcome of a seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub courses_total: usize,
    pub batches_total: usize,
    pub batches_applied: usize,
    /// Rows inserted or changed; zero when the catalog was already current
    pub rows_written: u64,
    /// Shutdown was requested before every batch was written
    pub interrupted: bool,
}

/// Service layer for catalog reads and seeding
#[derive(Clone)]
pub struct CatalogService<R: CourseRepository> {
    repository: Arc<R>,
    cache: Option<Arc<dyn CourseCache>>,
}

impl<R: CourseRepository> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            cache: None,
        }
    }

    /// Serve single-course reads through `cache`
    pub fn with_cache(mut self, cache: Arc<dyn CourseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// List courses with filters, page size clamped
    pub async fn list_courses(&self, filter: CourseFilter) -> CatalogResult<Vec<Course>> {
        self.repository.list(filter.normalized()).await
    }

    /// Get a course by ID. Cache failures fall back to the repository.
    pub async fn get_course(&self, id: Uuid) -> CatalogResult<Course> {
        if let Some(cache) = &self.cache {
            match cache.get(id).await {
                Ok(Some(course)) => return Ok(course),
                Ok(None) => {}
                Err(e) => tracing::warn!(course_id = %id, error = %e, "Cache read failed"),
            }
        }

        let course = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&course).await {
                tracing::warn!(course_id = %id, error = %e, "Cache write failed");
            }
        }

        Ok(course)
    }

    pub async fn get_course_by_slug(&self, slug: &str) -> CatalogResult<Course> {
        self.repository
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| CatalogError::SlugNotFound(slug.to_string()))
    }

    pub async fn count(&self) -> CatalogResult<u64> {
        self.repository.count().await
    }

    /// Write `courses` in batches of `batch_size`, one atomic upsert each.
    ///
    /// Everything is validated before the first write. `signal` is checked
    /// before every batch; once it fires no further batch starts and the
    /// report comes back with `interrupted` set. Batches already written stay
    /// written, and rerunning converges to the same state.
    pub async fn seed(
        &self,
        courses: &[NewCourse],
        batch_size: usize,
        signal: &ShutdownSignal,
    ) -> CatalogResult<SeedReport> {
        validate_all(courses)?;

        let batch_size = batch_size.max(1);
        let mut report = SeedReport {
            courses_total: courses.len(),
            batches_total: courses.len().div_ceil(batch_size),
            ..Default::default()
        };

        for (index, batch) in courses.chunks(batch_size).enumerate() {
            if signal.is_triggered() {
                tracing::info!(
                    batch = index,
                    remaining = report.batches_total - index,
                    "Shutdown requested, stopping seed"
                );
                report.interrupted = true;
                break;
            }

            let written = self.repository.upsert_batch(batch).await?;
            report.batches_applied += 1;
            report.rows_written += written;
            tracing::debug!(batch = index, size = batch.len(), written, "Seeded batch");

            if written > 0 {
                self.invalidate(batch).await;
            }
        }

        Ok(report)
    }

    async fn invalidate(&self, batch: &[NewCourse]) {
        let Some(cache) = &self.cache else {
            return;
        };

        for course in batch {
            if let Err(e) = cache.invalidate(course.id()).await {
                tracing::warn!(slug = %course.slug, error = %e, "Cache invalidation failed");
            }
        }
    }
}

fn validate_all(courses: &[NewCourse]) -> CatalogResult<()> {
    let mut seen = HashSet::with_capacity(courses.len());

    for course in courses {
        course
            .validate()
            .map_err(|e| CatalogError::Validation(format!("{}: {}", course.slug, e)))?;

        if !seen.insert(course.slug.as_str()) {
            return Err(CatalogError::Validation(format!(
                "duplicate slug '{}'",
                course.slug
            )));
        }
    }

    Ok(())
}
