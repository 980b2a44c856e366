use async_trait::async_trait;
use database::redis::{AsyncCommands, ConnectionManager};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::Course;

/// Read-through cache for single courses
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseCache: Send + Sync {
    async fn get(&self, id: Uuid) -> CatalogResult<Option<Course>>;

    async fn put(&self, course: &Course) -> CatalogResult<()>;

    async fn invalidate(&self, id: Uuid) -> CatalogResult<()>;
}

/// Redis-backed [`CourseCache`] storing JSON values with a TTL
#[derive(Clone)]
pub struct RedisCourseCache {
    conn: ConnectionManager,
    ttl: Duration,
    key_prefix: String,
}

impl RedisCourseCache {
    pub fn new(conn: ConnectionManager, ttl: Duration, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            ttl,
            key_prefix: key_prefix.into(),
        }
    }

    fn key(&self, id: Uuid) -> String {
        course_key(&self.key_prefix, id)
    }
}

fn course_key(prefix: &str, id: Uuid) -> String {
    format!("{prefix}:course:{id}")
}

fn cache_error(e: impl std::fmt::Display) -> CatalogError {
    CatalogError::Cache(e.to_string())
}

#[async_trait]
impl CourseCache for RedisCourseCache {
    async fn get(&self, id: Uuid) -> CatalogResult<Option<Course>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.key(id)).await.map_err(cache_error)?;

        raw.map(|json| serde_json::from_str(&json).map_err(cache_error))
            .transpose()
    }

    async fn put(&self, course: &Course) -> CatalogResult<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(course).map_err(cache_error)?;

        let _: () = conn
            .set_ex(self.key(course.id), json, self.ttl.as_secs().max(1))
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn invalidate(&self, id: Uuid) -> CatalogResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.key(id)).await.map_err(cache_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_key_is_namespaced() {
        let id = Uuid::nil();
        assert_eq!(
            course_key("course", id),
            "course:course:00000000-0000-0000-0000-000000000000"
        );
    }
}
