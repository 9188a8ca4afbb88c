//! Attendance entity - One attendance mark per student, class, subject, date and period.
//!
//! The uniqueness of that tuple is enforced by an expression index created in
//! `config::database`, since `subject_id` and `period` are nullable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attendance database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student being marked
    pub student_id: i64,
    /// Class the student was marked in
    pub class_id: i64,
    /// Subject, for per-lesson attendance; None for whole-day attendance
    pub subject_id: Option<i64>,
    /// Calendar date of the mark
    pub date: Date,
    /// Teaching period 1-8, if attendance is taken per period
    pub period: Option<i32>,
    /// One of `present`, `absent`, `late`, `excused`
    pub status: String,
    /// User id of whoever last marked this record
    pub marked_by: i64,
    /// Reason given for an absence or lateness
    pub reason: Option<String>,
    /// Free-form remarks
    pub remarks: Option<String>,
    /// When the record was created
    pub created_at: DateTimeUtc,
    /// When the record was last overwritten
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Attendance and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Per-lesson attendance belongs to a subject
    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id"
    )]
    Subject,
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
