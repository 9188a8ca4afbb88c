//! Student report generation.
//!
//! Combines a student's GPA, attendance statistics and fee summary into one
//! structure, and provides the display formatting used when rendering it.
//! Stored percentages keep full precision; rounding happens only here.

use crate::{
    core::{
        attendance::{AttendanceFilter, AttendanceStats, get_student_attendance},
        fee::{FeeFilter, FeeSummary, get_fee_statement},
        grade::{GradeFilter, student_gpa},
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// One student's standing across grades, attendance and fees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    /// Student the report is for
    pub student_id: i64,
    /// Credit-weighted GPA over published grades
    pub gpa: f64,
    /// Number of published grades in the GPA
    pub graded_exams: usize,
    /// Attendance over all recorded dates
    pub attendance: AttendanceStats,
    /// Fee totals, limited to `academic_year` when one was given
    pub fees: FeeSummary,
    /// Academic year the fee totals cover, if limited
    pub academic_year: Option<String>,
}

/// Builds a [`StudentReport`].
pub async fn generate_student_report(
    db: &DatabaseConnection,
    student_id: i64,
    academic_year: Option<&str>,
) -> Result<StudentReport> {
    let gpa = student_gpa(db, student_id, GradeFilter::default()).await?;
    let attendance = get_student_attendance(db, student_id, AttendanceFilter::default()).await?;
    let fee_filter = FeeFilter {
        academic_year: academic_year.map(ToString::to_string),
        status: None,
    };
    let statement = get_fee_statement(db, student_id, &fee_filter).await?;

    Ok(StudentReport {
        student_id,
        gpa: gpa.gpa,
        graded_exams: gpa.grades.len(),
        attendance: attendance.stats,
        fees: statement.summary,
        academic_year: fee_filter.academic_year,
    })
}

/// Formats a percentage for display, e.g. `86.67%`.
#[must_use]
pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.2}%")
}

/// Formats a GPA for display, e.g. `3.58`.
#[must_use]
pub fn format_gpa(gpa: f64) -> String {
    format!("{gpa:.2}")
}

/// Formats a money amount with two decimals, e.g. `-50.00`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Renders a report as a short multi-line summary for logs.
#[must_use]
pub fn format_student_report(report: &StudentReport) -> String {
    let year = report.academic_year.as_deref().unwrap_or("all years");
    format!(
        "Student {}\n  GPA: {} over {} exams\n  Attendance: {} ({} of {} sessions attended)\n  Fees ({}): {} charged, {} paid, {} pending",
        report.student_id,
        format_gpa(report.gpa),
        report.graded_exams,
        format_percentage(report.attendance.attendance_percentage),
        report.attendance.present + report.attendance.late,
        report.attendance.total,
        year,
        format_amount(report.fees.total_amount),
        format_amount(report.fees.total_paid),
        format_amount(report.fees.total_pending),
    )
}
