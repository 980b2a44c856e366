use async_trait::async_trait;
use axum_helpers::ShutdownSignal;
use domain_catalog::{CatalogService, CourseRepository, NewCourse, PgCourseRepository, seed};
use tracing::info;

use crate::clients::Clients;
use crate::config::AppConfig;
use crate::runnable::{Completion, RunError, Runnable};

/// One-shot unit that writes the reference catalog and exits
pub struct Seeder<R: CourseRepository> {
    catalog: CatalogService<R>,
    courses: Vec<NewCourse>,
    batch_size: usize,
}

impl Seeder<PgCourseRepository> {
    pub fn from_clients(config: &AppConfig, clients: &Clients) -> Self {
        let repository = PgCourseRepository::new(clients.db.clone());
        Self::new(CatalogService::new(repository), config.seed.batch_size)
    }
}

impl<R: CourseRepository> Seeder<R> {
    pub fn new(catalog: CatalogService<R>, batch_size: usize) -> Self {
        Self {
            catalog,
            courses: seed::catalog(),
            batch_size,
        }
    }

    /// Seed `courses` instead of the reference catalog
    pub fn with_courses(mut self, courses: Vec<NewCourse>) -> Self {
        self.courses = courses;
        self
    }
}

#[async_trait]
impl<R: CourseRepository + 'static> Runnable for Seeder<R> {
    fn name(&self) -> &'static str {
        "seeder"
    }

    async fn run(self: Box<Self>, signal: ShutdownSignal) -> Result<Completion, RunError> {
        info!(
            courses = self.courses.len(),
            batch_size = self.batch_size,
            "Seeding course catalog"
        );

        let report = self
            .catalog
            .seed(&self.courses, self.batch_size, &signal)
            .await?;

        info!(
            batches = report.batches_applied,
            of = report.batches_total,
            rows_written = report.rows_written,
            interrupted = report.interrupted,
            "Seeding finished"
        );

        Ok(if report.interrupted {
            Completion::Interrupted
        } else {
            Completion::Finished
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_helpers::ShutdownCoordinator;
    use domain_catalog::{CourseFilter, InMemoryCourseRepository};

    #[tokio::test]
    async fn test_seeder_writes_catalog_once() {
        let repo = InMemoryCourseRepository::new();

        let first = Box::new(Seeder::new(CatalogService::new(repo.clone()), 5));
        assert_eq!(
            first.run(ShutdownSignal::never()).await.unwrap(),
            Completion::Finished
        );
        let after_first = repo.list(CourseFilter::default()).await.unwrap();

        let second = Box::new(Seeder::new(CatalogService::new(repo.clone()), 5));
        assert_eq!(
            second.run(ShutdownSignal::never()).await.unwrap(),
            Completion::Finished
        );
        let after_second = repo.list(CourseFilter::default()).await.unwrap();

        assert_eq!(after_first.len(), seed::catalog().len());
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn test_seeder_interrupted_before_start_writes_nothing() {
        let repo = InMemoryCourseRepository::new();
        let coordinator = ShutdownCoordinator::new();
        coordinator.shutdown("test");

        let seeder = Box::new(Seeder::new(CatalogService::new(repo.clone()), 5));
        assert_eq!(
            seeder.run(coordinator.signal()).await.unwrap(),
            Completion::Interrupted
        );
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seeder_invalid_course_is_run_error() {
        let mut course = seed::catalog().remove(0);
        course.capacity = 0;

        let seeder = Box::new(
            Seeder::new(CatalogService::new(InMemoryCourseRepository::new()), 5)
                .with_courses(vec![course]),
        );
        let result = seeder.run(ShutdownSignal::never()).await;
        assert!(matches!(result, Err(RunError::Seed(_))));
    }
}
