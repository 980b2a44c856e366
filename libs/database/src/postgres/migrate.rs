//! SQL file migration gate
//!
//! Applies the `.sql` files of a directory that have not been recorded in the
//! `schema_migrations` table yet, in ascending version order.
//!
//! File names follow `<version>_<name>.sql` or `<version>_<name>.up.sql`, where
//! `<version>` is a run of digits (`0001`, `20240105120000`, ...). Down
//! migrations and non-SQL files in the directory are ignored.
//!
//! Each migration runs in its own transaction together with the insert of its
//! bookkeeping row, so a migration is either fully applied and recorded or not
//! applied at all. The first failure stops the run.
//!
//! Concurrent gates (several replicas starting at once) are serialized with a
//! session-level Postgres advisory lock held from before the history is read
//! until the last migration is recorded. A session lock belongs to one
//! connection, so the gate must run over a single-connection pool.
//!
//! In strict mode anything suspicious in the directory or the history
//! (unparseable names, empty files, edited or deleted migrations, a pending
//! migration older than the newest applied one) fails the run before any
//! migration is applied. Lenient mode logs the same findings and continues.

use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, Statement, TransactionTrait,
};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::connect;

/// Advisory lock key shared by every migration gate ("coursemi")
const MIGRATION_LOCK_KEY: i64 = 0x636f_7572_7365_6d69;

const HISTORY_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version BIGINT PRIMARY KEY,
    name TEXT NOT NULL,
    checksum TEXT NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

const SELECT_HISTORY: &str = "SELECT version, name, checksum FROM schema_migrations ORDER BY version";

const RECORD_MIGRATION: &str =
    "INSERT INTO schema_migrations (version, name, checksum) VALUES ($1, $2, $3)";

/// One migration file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub version: u64,
    pub name: String,
    pub path: PathBuf,
    pub sql: String,
    /// Hex encoded SHA-256 of the file content
    pub checksum: String,
}

/// Something the gate noticed that strict mode refuses and lenient mode tolerates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationWarning {
    /// A `.sql` file whose name has no `<version>_<name>` shape
    UnrecognizedFile(PathBuf),
    /// A migration that contains no statements
    EmptyMigration { version: u64, name: String },
    /// An applied migration whose file content changed since it ran
    ChecksumMismatch { version: u64, name: String },
    /// An applied migration that no longer exists in the directory
    MissingLocally { version: u64, name: String },
    /// A pending migration with a version below the newest applied one
    OutOfOrder { version: u64, latest_applied: u64 },
}

impl fmt::Display for MigrationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedFile(path) => {
                write!(f, "'{}' is not named <version>_<name>.sql", path.display())
            }
            Self::EmptyMigration { version, name } => {
                write!(f, "migration {version}_{name} contains no statements")
            }
            Self::ChecksumMismatch { version, name } => {
                write!(f, "migration {version}_{name} was modified after it was applied")
            }
            Self::MissingLocally { version, name } => {
                write!(f, "applied migration {version}_{name} is missing from the directory")
            }
            Self::OutOfOrder {
                version,
                latest_applied,
            } => write!(
                f,
                "pending migration {version} is older than applied migration {latest_applied}"
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("migration directory '{}' does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate migration version {version}: '{first}' and '{second}'")]
    DuplicateVersion {
        version: u64,
        first: String,
        second: String,
    },

    #[error("strict migration check failed: {0}")]
    Strict(MigrationWarning),

    #[error("failed to connect for migrations: {0}")]
    Connect(#[source] DbErr),

    #[error("failed to acquire the migration lock: {0}")]
    Lock(#[source] DbErr),

    #[error("failed to read migration history: {0}")]
    History(#[source] DbErr),

    #[error("migration {version}_{name} failed: {source}")]
    Apply {
        version: u64,
        name: String,
        #[source]
        source: DbErr,
    },
}

/// Outcome of a successful run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Versions applied by this run, in order
    pub applied: Vec<u64>,
    /// Migrations found on disk that were already recorded
    pub skipped: usize,
    /// Findings tolerated in lenient mode
    pub warnings: Vec<MigrationWarning>,
}

/// Migrations found on disk plus what looked wrong while reading them
#[derive(Debug, Default)]
pub struct MigrationSet {
    pub migrations: Vec<MigrationFile>,
    pub warnings: Vec<MigrationWarning>,
}

/// Connect to `database_url`, apply pending migrations from `dir`, disconnect.
///
/// The directory is read before connecting so a missing or malformed
/// directory fails without touching the database.
pub async fn migrate(
    dir: &Path,
    database_url: &str,
    strict: bool,
) -> Result<MigrationReport, MigrationError> {
    let set = discover(dir)?;

    let db = connect(database_url)
        .await
        .map_err(MigrationError::Connect)?;

    let result = apply_locked(&db, set, strict).await;

    if let Err(e) = db.close().await {
        warn!(error = %e, "Failed to close migration connection");
    }

    result
}

/// Apply pending migrations from `dir` over an existing connection.
///
/// `db` must be a single-connection pool (see [`connect`]): the advisory lock
/// is taken and released on whichever session runs the statement.
pub async fn run_migrations_from_dir(
    db: &DatabaseConnection,
    dir: &Path,
    strict: bool,
) -> Result<MigrationReport, MigrationError> {
    let set = discover(dir)?;
    apply_locked(db, set, strict).await
}

/// Read and order the migration files of `dir`
pub fn discover(dir: &Path) -> Result<MigrationSet, MigrationError> {
    if !dir.is_dir() {
        return Err(MigrationError::DirectoryNotFound(dir.to_path_buf()));
    }

    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| MigrationError::Io { path, source }
    };

    let mut set = MigrationSet::default();
    let mut by_version: BTreeMap<u64, MigrationFile> = BTreeMap::new();

    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let path = entry.map_err(io_err(dir))?.path();
        if !path.is_file() {
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !file_name.ends_with(".sql") || file_name.ends_with(".down.sql") {
            continue;
        }

        let Some((version, name)) = parse_file_name(file_name) else {
            set.warnings
                .push(MigrationWarning::UnrecognizedFile(path.clone()));
            continue;
        };

        let sql = fs::read_to_string(&path).map_err(io_err(&path))?;
        if split_sql_statements(&sql).is_empty() {
            set.warnings
                .push(MigrationWarning::EmptyMigration { version, name });
            continue;
        }

        let migration = MigrationFile {
            version,
            name,
            checksum: checksum(&sql),
            path,
            sql,
        };

        if let Some(existing) = by_version.get(&version) {
            return Err(MigrationError::DuplicateVersion {
                version,
                first: existing.path.display().to_string(),
                second: migration.path.display().to_string(),
            });
        }
        by_version.insert(version, migration);
    }

    set.migrations = by_version.into_values().collect();
    Ok(set)
}

/// Run [`apply`] while holding the migration advisory lock.
///
/// Blocks until any other gate finishes, so the history read below always
/// sees its recorded migrations. The lock is released whatever the outcome;
/// closing the session releases it too if the unlock fails.
async fn apply_locked(
    db: &DatabaseConnection,
    set: MigrationSet,
    strict: bool,
) -> Result<MigrationReport, MigrationError> {
    debug!(key = MIGRATION_LOCK_KEY, "Waiting for migration lock");
    db.execute_unprepared(&format!("SELECT pg_advisory_lock({MIGRATION_LOCK_KEY})"))
        .await
        .map_err(MigrationError::Lock)?;

    let result = apply(db, set, strict).await;

    if let Err(e) = db
        .execute_unprepared(&format!("SELECT pg_advisory_unlock({MIGRATION_LOCK_KEY})"))
        .await
    {
        warn!(error = %e, "Failed to release migration lock");
    }

    result
}

async fn apply(
    db: &DatabaseConnection,
    set: MigrationSet,
    strict: bool,
) -> Result<MigrationReport, MigrationError> {
    let MigrationSet {
        migrations,
        mut warnings,
    } = set;

    db.execute_unprepared(HISTORY_TABLE_DDL)
        .await
        .map_err(MigrationError::History)?;

    let history = applied_history(db).await?;

    for (version, (name, recorded)) in &history {
        match migrations.iter().find(|m| m.version == *version) {
            None => warnings.push(MigrationWarning::MissingLocally {
                version: *version,
                name: name.clone(),
            }),
            Some(local) if &local.checksum != recorded => {
                warnings.push(MigrationWarning::ChecksumMismatch {
                    version: *version,
                    name: name.clone(),
                })
            }
            Some(_) => {}
        }
    }

    let latest_applied = history.keys().next_back().copied();
    let pending: Vec<&MigrationFile> = migrations
        .iter()
        .filter(|m| !history.contains_key(&m.version))
        .collect();

    if let Some(latest_applied) = latest_applied {
        for migration in pending.iter().filter(|m| m.version < latest_applied) {
            warnings.push(MigrationWarning::OutOfOrder {
                version: migration.version,
                latest_applied,
            });
        }
    }

    if strict {
        if let Some(first) = warnings.first() {
            return Err(MigrationError::Strict(first.clone()));
        }
    }
    for warning in &warnings {
        warn!(%warning, "Migration check");
    }

    let mut report = MigrationReport {
        applied: Vec::with_capacity(pending.len()),
        skipped: migrations.len() - pending.len(),
        warnings,
    };

    if pending.is_empty() {
        info!(skipped = report.skipped, "Database schema is up to date");
        return Ok(report);
    }

    for migration in pending {
        apply_one(db, migration).await?;
        info!(
            version = migration.version,
            name = %migration.name,
            "Applied migration"
        );
        report.applied.push(migration.version);
    }

    info!(
        applied = report.applied.len(),
        skipped = report.skipped,
        "Migrations complete"
    );
    Ok(report)
}

async fn applied_history(
    db: &DatabaseConnection,
) -> Result<BTreeMap<u64, (String, String)>, MigrationError> {
    let rows = db
        .query_all_raw(Statement::from_string(
            DatabaseBackend::Postgres,
            SELECT_HISTORY.to_owned(),
        ))
        .await
        .map_err(MigrationError::History)?;

    let mut history = BTreeMap::new();
    for row in rows {
        let version: i64 = row.try_get("", "version").map_err(MigrationError::History)?;
        let name: String = row.try_get("", "name").map_err(MigrationError::History)?;
        let checksum: String = row
            .try_get("", "checksum")
            .map_err(MigrationError::History)?;
        let version = u64::try_from(version).map_err(|_| {
            MigrationError::History(DbErr::Custom(format!(
                "negative version {version} in schema_migrations"
            )))
        })?;
        history.insert(version, (name, checksum));
    }
    Ok(history)
}

async fn apply_one(db: &DatabaseConnection, migration: &MigrationFile) -> Result<(), MigrationError> {
    let failed = |source| MigrationError::Apply {
        version: migration.version,
        name: migration.name.clone(),
        source,
    };

    debug!(path = %migration.path.display(), "Running migration");

    let version = i64::try_from(migration.version)
        .map_err(|_| failed(DbErr::Custom("version does not fit in BIGINT".to_string())))?;

    // Rolled back on drop if anything below fails
    let txn = db.begin().await.map_err(failed)?;

    for statement in split_sql_statements(&migration.sql) {
        txn.execute_unprepared(&statement).await.map_err(failed)?;
    }

    txn.execute_raw(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        RECORD_MIGRATION,
        [
            version.into(),
            migration.name.clone().into(),
            migration.checksum.clone().into(),
        ],
    ))
    .await
    .map_err(failed)?;

    txn.commit().await.map_err(failed)
}

/// `0007_add_courses.up.sql` -> `(7, "add_courses")`
///
/// Versions are stored as `BIGINT`, so anything above `i64::MAX` is rejected.
fn parse_file_name(file_name: &str) -> Option<(u64, String)> {
    let stem = file_name
        .strip_suffix(".up.sql")
        .or_else(|| file_name.strip_suffix(".sql"))?;
    let (version, name) = stem.split_once('_')?;

    if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) || name.is_empty() {
        return None;
    }

    let version: u64 = version.parse().ok()?;
    i64::try_from(version).ok()?;

    Some((version, name.to_string()))
}

fn checksum(sql: &str) -> String {
    format!("{:x}", Sha256::digest(sql.as_bytes()))
}

#[derive(Clone, Copy)]
enum Lexer {
    Code,
    /// Inside `'...'`; `''` escapes are two adjacent strings
    Quoted,
    LineComment,
    /// Postgres block comments nest
    BlockComment(usize),
    /// Inside `$tag$ ... $tag$`, the tag being `sql[start..end]`
    Dollar { start: usize, end: usize },
}

/// Split SQL into statements on `;`.
///
/// Semicolons inside single-quoted strings, dollar-quoted bodies (`$$` or
/// `$tag$`), `--` line comments and `/* */` block comments do not split.
/// Comment-only chunks are dropped.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut state = Lexer::Code;
    let mut chunk_start = 0;
    let mut has_code = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        match state {
            Lexer::Code => match b {
                b'-' if next == Some(b'-') => {
                    state = Lexer::LineComment;
                    i += 1;
                }
                b'/' if next == Some(b'*') => {
                    state = Lexer::BlockComment(1);
                    i += 1;
                }
                b'\'' => {
                    state = Lexer::Quoted;
                    has_code = true;
                }
                b'$' => {
                    has_code = true;
                    if let Some(close) = dollar_tag_end(bytes, i) {
                        state = Lexer::Dollar { start: i, end: close + 1 };
                        i = close;
                    }
                }
                b';' => {
                    if has_code {
                        statements.push(sql[chunk_start..=i].trim().to_string());
                    }
                    chunk_start = i + 1;
                    has_code = false;
                }
                _ if !b.is_ascii_whitespace() => has_code = true,
                _ => {}
            },
            Lexer::Quoted => {
                if b == b'\'' {
                    state = Lexer::Code;
                }
            }
            Lexer::LineComment => {
                if b == b'\n' {
                    state = Lexer::Code;
                }
            }
            Lexer::BlockComment(depth) => {
                if b == b'*' && next == Some(b'/') {
                    state = if depth == 1 {
                        Lexer::Code
                    } else {
                        Lexer::BlockComment(depth - 1)
                    };
                    i += 1;
                } else if b == b'/' && next == Some(b'*') {
                    state = Lexer::BlockComment(depth + 1);
                    i += 1;
                }
            }
            Lexer::Dollar { start, end } => {
                let tag = &bytes[start..end];
                if bytes[i..].starts_with(tag) {
                    state = Lexer::Code;
                    i += tag.len() - 1;
                }
            }
        }
        i += 1;
    }

    if has_code {
        statements.push(sql[chunk_start..].trim().to_string());
    }
    statements
}

/// Index of the closing `$` when `bytes[start]` opens a dollar-quote tag
/// (`$$` or `$name$`). Positional parameters like `$1` are not tags.
fn dollar_tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if let Some(&first) = bytes.get(i) {
        if first == b'$' {
            return Some(i);
        }
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return None;
        }
    }
    while let Some(&b) = bytes.get(i) {
        match b {
            b'$' => return Some(i),
            b if b.is_ascii_alphanumeric() || b == b'_' => i += 1,
            _ => return None,
        }
    }
    None
}
