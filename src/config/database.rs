//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The attendance uniqueness key is
//! added separately as an expression index because two of its columns are nullable.

use crate::entities::{Attendance, Fee, Grade, Subject, SystemState};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://school_ledger.sqlite?mode=rwc";

/// Enforces one attendance record per (student, class, subject, date, period).
///
/// `SQLite` treats NULLs as distinct in plain unique indexes, so the nullable
/// columns are folded to 0 (never a valid id or period).
const ATTENDANCE_UNIQUE_KEY_INDEX: &str = r"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_unique_key
    ON attendance (student_id, class_id, COALESCE(subject_id, 0), date, COALESCE(period, 0));
";

const SECONDARY_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_grades_student_subject_date ON grades (student_id, subject_id, exam_date);",
    "CREATE INDEX IF NOT EXISTS idx_grades_class_date ON grades (class_id, exam_date);",
    "CREATE INDEX IF NOT EXISTS idx_attendance_student_date ON attendance (student_id, date);",
    "CREATE INDEX IF NOT EXISTS idx_attendance_class_date ON attendance (class_id, date);",
    "CREATE INDEX IF NOT EXISTS idx_fees_student_year ON fees (student_id, academic_year);",
    "CREATE INDEX IF NOT EXISTS idx_fees_due_date ON fees (due_date);",
];

/// Gets the database URL from the `DATABASE_URL` environment variable or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables and indexes if they do not exist yet.
///
/// Subjects are created first since grades and attendance reference them.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    create_table(db, Subject).await?;
    create_table(db, Grade).await?;
    create_table(db, Attendance).await?;
    create_table(db, Fee).await?;
    create_table(db, SystemState).await?;

    db.execute_unprepared(ATTENDANCE_UNIQUE_KEY_INDEX).await?;
    for statement in SECONDARY_INDEXES {
        db.execute_unprepared(statement).await?;
    }

    info!("Database schema is up to date");
    Ok(())
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;
    Ok(())
}
