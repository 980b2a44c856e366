use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait, Value,
};
use uuid::Uuid;

use crate::{
    entity,
    error::CatalogResult,
    models::{Course, CourseFilter, NewCourse},
    repository::CourseRepository,
};

/// Upsert keyed on the slug. The `WHERE` makes unchanged rows a no-op so
/// `updated_at` only moves when content does.
const UPSERT_COURSE: &str = r#"
INSERT INTO courses (
    id, slug, title, description, category, level,
    price_cents, currency, capacity, published, created_at, updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now(), now())
ON CONFLICT (slug) DO UPDATE SET
    title = EXCLUDED.title,
    description = EXCLUDED.description,
    category = EXCLUDED.category,
    level = EXCLUDED.level,
    price_cents = EXCLUDED.price_cents,
    currency = EXCLUDED.currency,
    capacity = EXCLUDED.capacity,
    published = EXCLUDED.published,
    updated_at = now()
WHERE (
    courses.title, courses.description, courses.category, courses.level,
    courses.price_cents, courses.currency, courses.capacity, courses.published
) IS DISTINCT FROM (
    EXCLUDED.title, EXCLUDED.description, EXCLUDED.category, EXCLUDED.level,
    EXCLUDED.price_cents, EXCLUDED.currency, EXCLUDED.capacity, EXCLUDED.published
)
"#;

fn upsert_statement(input: &NewCourse) -> Statement {
    let values: Vec<Value> = vec![
        input.id().into(),
        input.slug.clone().into(),
        input.title.clone().into(),
        input.description.clone().into(),
        input.category.clone().into(),
        input.level.to_string().into(),
        input.price_cents.into(),
        input.currency.clone().into(),
        input.capacity.into(),
        input.published.into(),
    ];
    Statement::from_sql_and_values(DbBackend::Postgres, UPSERT_COURSE, values)
}

pub struct PgCourseRepository {
    db: DatabaseConnection,
}

impl PgCourseRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseRepository for PgCourseRepository {
    async fn upsert_batch(&self, courses: &[NewCourse]) -> CatalogResult<u64> {
        let txn = self.db.begin().await?;
        let mut written = 0;

        for input in courses {
            // An early return drops the transaction, which rolls it back
            let result = txn.execute_raw(upsert_statement(input)).await?;
            written += result.rows_affected();
        }

        txn.commit().await?;
        tracing::debug!(batch = courses.len(), written, "Upserted course batch");
        Ok(written)
    }

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Course>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn get_by_slug(&self, slug: &str) -> CatalogResult<Option<Course>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, filter: CourseFilter) -> CatalogResult<Vec<Course>> {
        let mut query = entity::Entity::find();

        if let Some(category) = filter.category {
            query = query.filter(entity::Column::Category.eq(category));
        }

        if let Some(level) = filter.level {
            query = query.filter(entity::Column::Level.eq(level.to_string()));
        }

        if let Some(published) = filter.published {
            query = query.filter(entity::Column::Published.eq(published));
        }

        let models = query
            .order_by_asc(entity::Column::Slug)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> CatalogResult<u64> {
        Ok(entity::Entity::find().count(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::models::CourseLevel;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    fn course(slug: &str) -> NewCourse {
        NewCourse {
            slug: slug.to_string(),
            title: "Title".to_string(),
            description: String::new(),
            category: "data".to_string(),
            level: CourseLevel::Advanced,
            price_cents: 0,
            currency: "USD".to_string(),
            capacity: 5,
            published: false,
        }
    }

    fn rows(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[test]
    fn test_upsert_statement_binds_all_columns() {
        let statement = upsert_statement(&course("sql-basics"));
        let values = statement.values.expect("statement has values");
        assert_eq!(values.0.len(), 10);
        assert!(statement.sql.contains("ON CONFLICT (slug)"));
        assert!(statement.sql.contains("IS DISTINCT FROM"));
    }

    #[tokio::test]
    async fn test_upsert_batch_sums_changed_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([rows(1), rows(0), rows(1)])
            .into_connection();
        let repo = PgCourseRepository::new(db);

        let written = repo
            .upsert_batch(&[course("a"), course("b"), course("c")])
            .await
            .unwrap();
        assert_eq!(written, 2);
    }

    #[tokio::test]
    async fn test_upsert_batch_propagates_database_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([rows(1)])
            .append_exec_errors([DbErr::Custom("unique violation".to_string())])
            .into_connection();
        let repo = PgCourseRepository::new(db);

        let result = repo.upsert_batch(&[course("a"), course("b")]).await;
        assert!(matches!(result, Err(CatalogError::Database(_))));
    }

    #[tokio::test]
    async fn test_get_by_slug_maps_model() {
        let now = Utc::now();
        let model = entity::Model {
            id: course("sql-basics").id(),
            slug: "sql-basics".to_string(),
            title: "SQL Basics".to_string(),
            description: "Joins and friends".to_string(),
            category: "data".to_string(),
            level: CourseLevel::Beginner,
            price_cents: 1500,
            currency: "USD".to_string(),
            capacity: 30,
            published: true,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model]])
            .into_connection();
        let repo = PgCourseRepository::new(db);

        let found = repo.get_by_slug("sql-basics").await.unwrap().unwrap();
        assert_eq!(found.id, course("sql-basics").id());
        assert_eq!(found.level, CourseLevel::Beginner);
        assert_eq!(found.price_cents, 1500);
    }
}
