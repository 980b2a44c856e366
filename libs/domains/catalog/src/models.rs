use chrono::{DateTime, Utc};
use regex::Regex;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Namespace for deterministic course ids (UUIDv5 of the slug)
pub const COURSE_ID_NAMESPACE: Uuid = Uuid::from_u128(0x5f0c_2a4e_8d3b_4c1a_9e77_1b2d_3c4e_5f60);

/// Largest page a single list request may return
pub const MAX_PAGE_SIZE: u64 = 200;

/// Lowercase words separated by single hyphens
static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug pattern"));

fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if !SLUG.is_match(slug) {
        return Err(validator::ValidationError::new("invalid_slug"));
    }
    Ok(())
}

fn validate_currency(currency: &str) -> Result<(), validator::ValidationError> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(validator::ValidationError::new("invalid_currency"));
    }
    Ok(())
}

/// Course difficulty
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    #[sea_orm(string_value = "beginner")]
    Beginner,
    #[sea_orm(string_value = "intermediate")]
    Intermediate,
    #[sea_orm(string_value = "advanced")]
    Advanced,
}

/// A course listed in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    /// Stable natural key, also used in URLs
    pub slug: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: CourseLevel,
    /// Price in minor units of `currency`
    pub price_cents: i64,
    /// ISO 4217 code
    pub currency: String,
    /// Seats per session
    pub capacity: i32,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Course content as written by the seeder
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct NewCourse {
    #[validate(length(min = 1, max = 100), custom(function = "validate_slug"))]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[serde(default)]
    pub level: CourseLevel,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    #[validate(custom(function = "validate_currency"))]
    pub currency: String,
    #[validate(range(min = 1))]
    pub capacity: i32,
    #[serde(default)]
    pub published: bool,
}

impl NewCourse {
    /// Deterministic id derived from the slug, identical across runs
    pub fn id(&self) -> Uuid {
        course_id(&self.slug)
    }
}

/// Id a course with `slug` gets in every environment
pub fn course_id(slug: &str) -> Uuid {
    Uuid::new_v5(&COURSE_ID_NAMESPACE, slug.as_bytes())
}

/// Query filters for listing courses
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourseFilter {
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub published: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    50
}

impl Default for CourseFilter {
    fn default() -> Self {
        Self {
            category: None,
            level: None,
            published: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl CourseFilter {
    /// Clamp the page size into `1..=MAX_PAGE_SIZE`
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn matches(&self, course: &Course) -> bool {
        if let Some(category) = &self.category {
            if &course.category != category {
                return false;
            }
        }
        if let Some(level) = self.level {
            if course.level != level {
                return false;
            }
        }
        if let Some(published) = self.published {
            if course.published != published {
                return false;
            }
        }
        true
    }
}

impl Course {
    pub fn new(input: NewCourse, now: DateTime<Utc>) -> Self {
        Self {
            id: input.id(),
            slug: input.slug,
            title: input.title,
            description: input.description,
            category: input.category,
            level: input.level,
            price_cents: input.price_cents,
            currency: input.currency,
            capacity: input.capacity,
            published: input.published,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether writing `input` over this course would change anything
    pub fn differs_from(&self, input: &NewCourse) -> bool {
        self.title != input.title
            || self.description != input.description
            || self.category != input.category
            || self.level != input.level
            || self.price_cents != input.price_cents
            || self.currency != input.currency
            || self.capacity != input.capacity
            || self.published != input.published
    }

    /// Overwrite content fields, keeping identity and `created_at`
    pub fn apply(&mut self, input: &NewCourse, now: DateTime<Utc>) {
        self.title = input.title.clone();
        self.description = input.description.clone();
        self.category = input.category.clone();
        self.level = input.level;
        self.price_cents = input.price_cents;
        self.currency = input.currency.clone();
        self.capacity = input.capacity;
        self.published = input.published;
        self.updated_at = now;
    }
}
