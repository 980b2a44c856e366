//! Test fixtures for the course workspace.
//!
//! - [`TestDatabase`]: throwaway Postgres migrated with the workspace
//!   `migrations/` directory (feature `postgres`, default)
//! - [`TestRedis`]: throwaway Redis (feature `redis`)
//! - [`TestDataBuilder`]: names derived from the test name, so tests sharing
//!   a container do not collide
//!
//! Container fixtures need Docker; tests using them are `#[ignore]`d and run
//! with `cargo test -- --ignored`.
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["all"] }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

#[cfg(feature = "redis")]
pub use redis::TestRedis;

/// Deterministic, collision-free names for test fixtures
///
/// ```
/// use test_utils::TestDataBuilder;
///
/// let builder = TestDataBuilder::from_test_name("seed_updates_changed");
/// assert_eq!(builder.slug("a"), builder.slug("a"));
/// assert_ne!(builder.slug("a"), builder.slug("b"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from a hash of `name`, normally the test function name
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Course slug; always matches the slug format (lowercase, digits, dashes)
    pub fn slug(&self, suffix: &str) -> String {
        format!("test-{:x}-{}", self.seed, suffix.to_lowercase())
    }

    /// Category name shared by every course of this builder
    pub fn category(&self) -> String {
        format!("test-{:x}", self.seed)
    }

    /// Cache key prefix, so cached entries of parallel tests stay apart
    pub fn key_prefix(&self) -> String {
        format!("test:{:x}", self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_is_deterministic() {
        let first = TestDataBuilder::from_test_name("my_test");
        let second = TestDataBuilder::from_test_name("my_test");

        assert_eq!(first, second);
        assert_eq!(first.slug("intro"), second.slug("intro"));
        assert_eq!(first.key_prefix(), second.key_prefix());
    }

    #[test]
    fn test_different_tests_do_not_collide() {
        let first = TestDataBuilder::from_test_name("test1");
        let second = TestDataBuilder::from_test_name("test2");

        assert_ne!(first.slug("a"), second.slug("a"));
        assert_ne!(first.category(), second.category());
    }

    #[test]
    fn test_slug_shape() {
        let slug = TestDataBuilder::new(0xbeef).slug("Intro");
        assert_eq!(slug, "test-beef-intro");
        assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        );
    }
}
