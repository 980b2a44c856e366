use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::{Course, CourseFilter, NewCourse};

/// Repository trait for course persistence
///
/// Implementations must make `upsert_batch` atomic per call and idempotent:
/// writing content a course already has leaves it untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Insert or update courses by slug. Returns the number of rows that
    /// were inserted or actually changed.
    async fn upsert_batch(&self, courses: &[NewCourse]) -> CatalogResult<u64>;

    /// Get a course by ID
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Course>>;

    /// Get a course by slug
    async fn get_by_slug(&self, slug: &str) -> CatalogResult<Option<Course>>;

    /// List courses ordered by slug
    async fn list(&self, filter: CourseFilter) -> CatalogResult<Vec<Course>>;

    /// Count all courses
    async fn count(&self) -> CatalogResult<u64>;
}

/// In-memory implementation of CourseRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCourseRepository {
    courses: Arc<RwLock<BTreeMap<String, Course>>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn upsert_batch(&self, courses: &[NewCourse]) -> CatalogResult<u64> {
        let mut stored = self.courses.write().await;
        let now = Utc::now();
        let mut written = 0;

        for input in courses {
            match stored.get_mut(&input.slug) {
                Some(existing) if existing.differs_from(input) => {
                    existing.apply(input, now);
                    written += 1;
                }
                Some(_) => {}
                None => {
                    stored.insert(input.slug.clone(), Course::new(input.clone(), now));
                    written += 1;
                }
            }
        }

        Ok(written)
    }

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.values().find(|c| c.id == id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> CatalogResult<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.get(slug).cloned())
    }

    async fn list(&self, filter: CourseFilter) -> CatalogResult<Vec<Course>> {
        let courses = self.courses.read().await;

        Ok(courses
            .values()
            .filter(|c| filter.matches(c))
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> CatalogResult<u64> {
        Ok(self.courses.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseLevel;

    fn course(slug: &str, category: &str) -> NewCourse {
        NewCourse {
            slug: slug.to_string(),
            title: slug.replace('-', " "),
            description: String::new(),
            category: category.to_string(),
            level: CourseLevel::Beginner,
            price_cents: 1000,
            currency: "USD".to_string(),
            capacity: 10,
            published: true,
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_skips_unchanged() {
        let repo = InMemoryCourseRepository::new();
        let batch = vec![course("a-course", "x"), course("b-course", "y")];

        assert_eq!(repo.upsert_batch(&batch).await.unwrap(), 2);
        let before = repo.get_by_slug("a-course").await.unwrap().unwrap();

        assert_eq!(repo.upsert_batch(&batch).await.unwrap(), 0);
        let after = repo.get_by_slug("a-course").await.unwrap().unwrap();

        assert_eq!(before, after);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_upsert_updates_changed_content() {
        let repo = InMemoryCourseRepository::new();
        repo.upsert_batch(&[course("a-course", "x")]).await.unwrap();

        let mut changed = course("a-course", "x");
        changed.price_cents = 2500;
        assert_eq!(repo.upsert_batch(&[changed]).await.unwrap(), 1);

        let stored = repo.get_by_id(course("a-course", "x").id()).await.unwrap().unwrap();
        assert_eq!(stored.price_cents, 2500);
        assert!(stored.updated_at >= stored.created_at);
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let repo = InMemoryCourseRepository::new();
        repo.upsert_batch(&[
            course("c-course", "data"),
            course("a-course", "data"),
            course("b-course", "design"),
        ])
        .await
        .unwrap();

        let data = repo
            .list(CourseFilter {
                category: Some("data".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let slugs: Vec<_> = data.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a-course", "c-course"]);

        let page = repo
            .list(CourseFilter {
                limit: 1,
                offset: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].slug, "b-course");
    }
}
