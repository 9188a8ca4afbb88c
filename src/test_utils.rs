//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{
        fee::{FeeType, NewFee},
        grade::{ExamType, NewGrade},
        subject::{NewSubject, create_subject},
    },
    entities,
    errors::Result,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Student used by default in test records
pub const TEST_STUDENT_ID: i64 = 1000;
/// Class used by default in test records
pub const TEST_CLASS_ID: i64 = 10;
/// Teacher used by default in test records
pub const TEST_TEACHER_ID: i64 = 500;
/// Academic year used by default in test fees
pub const TEST_ACADEMIC_YEAR: &str = "2025-2026";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A fixed "current time" so that due-date comparisons are deterministic.
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 15, 10, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Builds a calendar date, falling back to the Unix epoch for invalid input.
#[must_use]
pub fn test_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Subject details with the given code and credits.
#[must_use]
pub fn test_new_subject(code: &str, credits: i32) -> NewSubject {
    NewSubject {
        name: format!("Subject {code}"),
        code: code.to_string(),
        description: None,
        credits,
        department: None,
        grade_level: "10".to_string(),
        is_core: true,
    }
}

/// Creates a subject with the given code and credits.
pub async fn create_test_subject(
    db: &DatabaseConnection,
    code: &str,
    credits: i32,
) -> Result<entities::subject::Model> {
    create_subject(db, test_new_subject(code, credits)).await
}

/// Sets up a test database with one 1-credit subject.
/// Returns (db, subject) for grade and attendance tests.
pub async fn setup_with_subject() -> Result<(DatabaseConnection, entities::subject::Model)> {
    let db = setup_test_db().await?;
    let subject = create_test_subject(&db, "TEST101", 1).await?;
    Ok((db, subject))
}

/// Grade details with sensible defaults.
///
/// # Defaults
/// * student, class and teacher: the `TEST_*` constants
/// * `exam_type`: midterm
/// * `is_published`: false
#[must_use]
pub fn test_new_grade(subject_id: i64, obtained_marks: f64, max_marks: f64) -> NewGrade {
    NewGrade {
        student_id: TEST_STUDENT_ID,
        subject_id,
        class_id: TEST_CLASS_ID,
        exam_type: ExamType::Midterm,
        exam_name: "Term 1 midterm".to_string(),
        max_marks,
        obtained_marks,
        exam_date: test_date(2025, 9, 10),
        submission_date: None,
        teacher_id: TEST_TEACHER_ID,
        remarks: None,
        is_published: false,
    }
}

/// An in-memory grade model (not stored) for pure-function tests.
#[must_use]
pub fn sample_grade_model(subject_id: i64) -> entities::grade::Model {
    let now = test_now();
    entities::grade::Model {
        id: 0,
        student_id: TEST_STUDENT_ID,
        subject_id,
        class_id: TEST_CLASS_ID,
        exam_type: ExamType::Quiz.as_str().to_string(),
        exam_name: "Sample".to_string(),
        max_marks: 100.0,
        obtained_marks: 100.0,
        percentage: 100.0,
        letter_grade: "A+".to_string(),
        gpa_point: 4.0,
        exam_date: test_date(2025, 9, 10),
        submission_date: None,
        teacher_id: TEST_TEACHER_ID,
        remarks: None,
        is_published: true,
        created_at: now,
        updated_at: now,
    }
}

/// Tuition fee details for the test student in the test academic year.
#[must_use]
pub fn test_new_fee(amount: f64, due_date: DateTime<Utc>) -> NewFee {
    NewFee {
        student_id: TEST_STUDENT_ID,
        academic_year: TEST_ACADEMIC_YEAR.to_string(),
        fee_type: FeeType::Tuition,
        amount,
        discount: 0.0,
        due_date,
        remarks: None,
        created_by: Some(1),
    }
}

/// An in-memory fee model (not stored) for pure-function tests, due in 30 days.
#[must_use]
pub fn sample_fee_model() -> entities::fee::Model {
    let now = test_now();
    entities::fee::Model {
        id: 0,
        student_id: TEST_STUDENT_ID,
        academic_year: TEST_ACADEMIC_YEAR.to_string(),
        fee_type: FeeType::Tuition.as_str().to_string(),
        amount: 0.0,
        discount: 0.0,
        due_date: now + chrono::Duration::days(30),
        paid_amount: 0.0,
        paid_date: None,
        status: "pending".to_string(),
        payment_method: None,
        transaction_id: None,
        receipt_number: None,
        remarks: None,
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}
