//! Reference catalog loaded by `course server seed`.

use crate::models::{CourseLevel, NewCourse};

struct Entry {
    slug: &'static str,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    level: CourseLevel,
    price_cents: i64,
    capacity: i32,
}

const CATALOG: &[Entry] = &[
    Entry {
        slug: "rust-fundamentals",
        title: "Rust Fundamentals",
        description: "Ownership, borrowing and the type system from first principles.",
        category: "programming",
        level: CourseLevel::Beginner,
        price_cents: 14_900,
        capacity: 24,
    },
    Entry {
        slug: "async-rust-in-production",
        title: "Async Rust in Production",
        description: "Tokio, cancellation and backpressure in long-running services.",
        category: "programming",
        level: CourseLevel::Advanced,
        price_cents: 29_900,
        capacity: 16,
    },
    Entry {
        slug: "go-for-backend-developers",
        title: "Go for Backend Developers",
        description: "HTTP services, context propagation and testing in Go.",
        category: "programming",
        level: CourseLevel::Intermediate,
        price_cents: 19_900,
        capacity: 20,
    },
    Entry {
        slug: "sql-from-zero",
        title: "SQL from Zero",
        description: "Tables, joins and aggregates with PostgreSQL.",
        category: "data",
        level: CourseLevel::Beginner,
        price_cents: 9_900,
        capacity: 30,
    },
    Entry {
        slug: "postgres-performance-tuning",
        title: "PostgreSQL Performance Tuning",
        description: "Query plans, indexes and vacuum for busy databases.",
        category: "data",
        level: CourseLevel::Advanced,
        price_cents: 34_900,
        capacity: 12,
    },
    Entry {
        slug: "data-modeling-essentials",
        title: "Data Modeling Essentials",
        description: "Normalization, keys and schema evolution.",
        category: "data",
        level: CourseLevel::Intermediate,
        price_cents: 17_900,
        capacity: 20,
    },
    Entry {
        slug: "kubernetes-for-developers",
        title: "Kubernetes for Developers",
        description: "Deployments, probes and graceful termination.",
        category: "devops",
        level: CourseLevel::Intermediate,
        price_cents: 24_900,
        capacity: 18,
    },
    Entry {
        slug: "observability-with-opentelemetry",
        title: "Observability with OpenTelemetry",
        description: "Traces, metrics and logs that answer real questions.",
        category: "devops",
        level: CourseLevel::Advanced,
        price_cents: 27_900,
        capacity: 15,
    },
    Entry {
        slug: "linux-command-line-basics",
        title: "Linux Command Line Basics",
        description: "Shells, pipes and processes.",
        category: "devops",
        level: CourseLevel::Beginner,
        price_cents: 0,
        capacity: 50,
    },
    Entry {
        slug: "ux-research-methods",
        title: "UX Research Methods",
        description: "Interviews, usability tests and synthesis.",
        category: "design",
        level: CourseLevel::Beginner,
        price_cents: 12_900,
        capacity: 25,
    },
    Entry {
        slug: "design-systems-at-scale",
        title: "Design Systems at Scale",
        description: "Tokens, components and governance across teams.",
        category: "design",
        level: CourseLevel::Advanced,
        price_cents: 21_900,
        capacity: 14,
    },
    Entry {
        slug: "product-discovery-workshop",
        title: "Product Discovery Workshop",
        description: "Framing problems and testing ideas before building them.",
        category: "product",
        level: CourseLevel::Intermediate,
        price_cents: 15_900,
        capacity: 20,
    },
];

/// The reference catalog. Same content and order on every call, so seeding
/// is reproducible across runs and environments.
pub fn catalog() -> Vec<NewCourse> {
    CATALOG
        .iter()
        .map(|entry| NewCourse {
            slug: entry.slug.to_string(),
            title: entry.title.to_string(),
            description: entry.description.to_string(),
            category: entry.category.to_string(),
            level: entry.level,
            price_cents: entry.price_cents,
            currency: "USD".to_string(),
            capacity: entry.capacity,
            published: true,
        })
        .collect()
}
