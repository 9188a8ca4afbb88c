//! Attendance business logic - Conflict-replace marking and attendance statistics.
//!
//! Each (student, class, subject, date, period) tuple holds at most one record,
//! enforced by a unique index. Marking the same tuple twice replaces the status,
//! reason, remarks and marker of the existing record (last write wins).

use crate::{
    entities::{Attendance, attendance},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Select, Set, SqlErr, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Valid teaching periods, inclusive
pub const PERIOD_RANGE: std::ops::RangeInclusive<i32> = 1..=8;

/// Attendance status of a student for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    /// Attended
    Present,
    /// Did not attend
    Absent,
    /// Attended late; counts as attended
    Late,
    /// Absence excused; counts toward the total only
    Excused,
}

impl AttendanceStatus {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
            Self::Excused => "excused",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "late" => Ok(Self::Late),
            "excused" => Ok(Self::Excused),
            other => Err(Error::invalid(format!("Unknown attendance status '{other}'"))),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The uniqueness key of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttendanceKey {
    /// Student being marked
    pub student_id: i64,
    /// Class
    pub class_id: i64,
    /// Subject, or None for whole-day attendance
    pub subject_id: Option<i64>,
    /// Date of the mark
    pub date: NaiveDate,
    /// Period 1-8, or None when attendance is not taken per period
    pub period: Option<i32>,
}

impl fmt::Display for AttendanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "student {} in class {} on {}",
            self.student_id, self.class_id, self.date
        )?;
        if let Some(subject_id) = self.subject_id {
            write!(f, " (subject {subject_id})")?;
        }
        if let Some(period) = self.period {
            write!(f, " period {period}")?;
        }
        Ok(())
    }
}

fn validate_period(period: Option<i32>) -> Result<()> {
    match period {
        Some(period) if !PERIOD_RANGE.contains(&period) => Err(Error::invalid(format!(
            "Period must be between {} and {} (got {period})",
            PERIOD_RANGE.start(),
            PERIOD_RANGE.end()
        ))),
        _ => Ok(()),
    }
}

impl AttendanceKey {
    fn matching(&self) -> Select<Attendance> {
        let mut query = Attendance::find()
            .filter(attendance::Column::StudentId.eq(self.student_id))
            .filter(attendance::Column::ClassId.eq(self.class_id))
            .filter(attendance::Column::Date.eq(self.date));
        query = match self.subject_id {
            Some(subject_id) => query.filter(attendance::Column::SubjectId.eq(subject_id)),
            None => query.filter(attendance::Column::SubjectId.is_null()),
        };
        match self.period {
            Some(period) => query.filter(attendance::Column::Period.eq(period)),
            None => query.filter(attendance::Column::Period.is_null()),
        }
    }
}

/// The mark written for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceMark {
    /// Status
    pub status: AttendanceStatus,
    /// Reason for absence or lateness
    pub reason: Option<String>,
    /// Free-form remarks
    pub remarks: Option<String>,
}

impl AttendanceMark {
    /// A mark with no reason or remarks.
    #[must_use]
    pub const fn new(status: AttendanceStatus) -> Self {
        Self {
            status,
            reason: None,
            remarks: None,
        }
    }
}

/// Result of marking one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record existed; this one was inserted
    Created(attendance::Model),
    /// A record existed and was overwritten
    Replaced(attendance::Model),
}

impl UpsertOutcome {
    /// The stored record
    #[must_use]
    pub const fn record(&self) -> &attendance::Model {
        match self {
            Self::Created(record) | Self::Replaced(record) => record,
        }
    }

    /// Consumes the outcome, returning the stored record
    #[must_use]
    pub fn into_record(self) -> attendance::Model {
        match self {
            Self::Created(record) | Self::Replaced(record) => record,
        }
    }
}

enum InsertOutcome {
    Inserted(attendance::Model),
    KeyTaken,
}

async fn try_insert<C>(db: &C, record: attendance::ActiveModel) -> Result<InsertOutcome>
where
    C: ConnectionTrait,
{
    match record.insert(db).await {
        Ok(model) => Ok(InsertOutcome::Inserted(model)),
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Ok(InsertOutcome::KeyTaken),
            _ => Err(err.into()),
        },
    }
}

/// Marks attendance for one key, replacing any existing record for it.
///
/// The insert is attempted first. If the unique index reports the key as taken,
/// the existing record is updated in place with the new status, reason, remarks
/// and marker.
///
/// # Errors
/// [`Error::InvalidInput`] for a period outside 1-8, checked before any write.
/// [`Error::UniquenessConflict`] if the unique index reports the key as taken but no
/// record matches it: the row was deleted in between, or a row written outside this
/// module stores period or subject 0, which the index folds together with NULL.
pub async fn record_attendance<C>(
    db: &C,
    key: AttendanceKey,
    mark: AttendanceMark,
    marked_by: i64,
) -> Result<UpsertOutcome>
where
    C: ConnectionTrait,
{
    validate_period(key.period)?;

    let now = Utc::now();
    let record = attendance::ActiveModel {
        student_id: Set(key.student_id),
        class_id: Set(key.class_id),
        subject_id: Set(key.subject_id),
        date: Set(key.date),
        period: Set(key.period),
        status: Set(mark.status.as_str().to_string()),
        marked_by: Set(marked_by),
        reason: Set(mark.reason.clone()),
        remarks: Set(mark.remarks.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match try_insert(db, record).await? {
        InsertOutcome::Inserted(model) => Ok(UpsertOutcome::Created(model)),
        InsertOutcome::KeyTaken => {
            let existing = key
                .matching()
                .one(db)
                .await?
                .ok_or_else(|| Error::UniquenessConflict {
                    key: key.to_string(),
                })?;

            warn!(
                "Attendance already marked for {}; replacing record {} ({} -> {})",
                key, existing.id, existing.status, mark.status
            );

            let mut active_model: attendance::ActiveModel = existing.into();
            active_model.status = Set(mark.status.as_str().to_string());
            active_model.reason = Set(mark.reason);
            active_model.remarks = Set(mark.remarks);
            active_model.marked_by = Set(marked_by);
            active_model.updated_at = Set(now);

            Ok(UpsertOutcome::Replaced(active_model.update(db).await?))
        }
    }
}

/// One student's entry in a class roll call.
#[derive(Debug, Clone)]
pub struct StudentMark {
    /// Student being marked
    pub student_id: i64,
    /// Their mark
    pub mark: AttendanceMark,
}

/// Marks a whole class for one subject, date and period.
///
/// Each entry is upserted independently with [`record_attendance`]; the period is
/// validated once before anything is written.
pub async fn mark_class_attendance(
    db: &DatabaseConnection,
    class_id: i64,
    subject_id: Option<i64>,
    date: NaiveDate,
    period: Option<i32>,
    entries: Vec<StudentMark>,
    marked_by: i64,
) -> Result<Vec<UpsertOutcome>> {
    validate_period(period)?;

    let mut outcomes = Vec::with_capacity(entries.len());
    for entry in entries {
        let key = AttendanceKey {
            student_id: entry.student_id,
            class_id,
            subject_id,
            date,
            period,
        };
        outcomes.push(record_attendance(db, key, entry.mark, marked_by).await?);
    }

    let replaced = outcomes
        .iter()
        .filter(|o| matches!(o, UpsertOutcome::Replaced(_)))
        .count();
    info!(
        "Marked attendance for class {} on {}: {} records ({} replaced)",
        class_id,
        date,
        outcomes.len(),
        replaced
    );

    Ok(outcomes)
}

/// Presence counts over a set of attendance records.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    /// Number of records
    pub total: usize,
    /// Records marked present
    pub present: usize,
    /// Records marked absent
    pub absent: usize,
    /// Records marked late
    pub late: usize,
    /// Records marked excused
    pub excused: usize,
    /// `(present + late) / total * 100`, or 0 when there are no records
    pub attendance_percentage: f64,
}

/// Tallies statuses into [`AttendanceStats`].
#[must_use]
pub fn tally<I>(statuses: I) -> AttendanceStats
where
    I: IntoIterator<Item = Option<AttendanceStatus>>,
{
    let mut stats = AttendanceStats::default();
    for status in statuses {
        stats.total += 1;
        match status {
            Some(AttendanceStatus::Present) => stats.present += 1,
            Some(AttendanceStatus::Absent) => stats.absent += 1,
            Some(AttendanceStatus::Late) => stats.late += 1,
            Some(AttendanceStatus::Excused) => stats.excused += 1,
            None => {}
        }
    }

    if stats.total > 0 {
        // Cast safety: record counts are far below 2^52
        #[allow(clippy::cast_precision_loss)]
        let percentage = (stats.present + stats.late) as f64 / stats.total as f64 * 100.0;
        stats.attendance_percentage = percentage;
    }
    stats
}

/// Computes presence statistics for stored records.
///
/// A record whose status string is not recognised counts toward the total only.
#[must_use]
pub fn compute_stats(records: &[attendance::Model]) -> AttendanceStats {
    tally(records.iter().map(|r| r.status.parse().ok()))
}

/// Optional filters for attendance listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceFilter {
    /// Only this subject
    pub subject_id: Option<i64>,
    /// Only this exact date; takes precedence over `date_range`
    pub date: Option<NaiveDate>,
    /// Only dates within this inclusive range
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl AttendanceFilter {
    fn apply(self, mut query: Select<Attendance>) -> Select<Attendance> {
        if let Some(date) = self.date {
            query = query.filter(attendance::Column::Date.eq(date));
        } else if let Some((start, end)) = self.date_range {
            query = query.filter(attendance::Column::Date.between(start, end));
        }
        if let Some(subject_id) = self.subject_id {
            query = query.filter(attendance::Column::SubjectId.eq(subject_id));
        }
        query
    }
}

/// A student's attendance records, newest first, with their statistics.
#[derive(Debug, Clone)]
pub struct StudentAttendance {
    /// Matching records
    pub records: Vec<attendance::Model>,
    /// Statistics over `records`
    pub stats: AttendanceStats,
}

/// Attendance of one student, newest date first.
pub async fn get_student_attendance(
    db: &DatabaseConnection,
    student_id: i64,
    filter: AttendanceFilter,
) -> Result<StudentAttendance> {
    let query = Attendance::find().filter(attendance::Column::StudentId.eq(student_id));
    let records = filter
        .apply(query)
        .order_by_desc(attendance::Column::Date)
        .order_by_asc(attendance::Column::Period)
        .all(db)
        .await?;
    let stats = compute_stats(&records);
    Ok(StudentAttendance { records, stats })
}

/// Attendance of a class, newest date first, then by period.
pub async fn get_class_attendance(
    db: &DatabaseConnection,
    class_id: i64,
    filter: AttendanceFilter,
) -> Result<Vec<attendance::Model>> {
    let query = Attendance::find().filter(attendance::Column::ClassId.eq(class_id));
    filter
        .apply(query)
        .order_by_desc(attendance::Column::Date)
        .order_by_asc(attendance::Column::Period)
        .order_by_asc(attendance::Column::StudentId)
        .all(db)
        .await
        .map_err(Into::into)
}
