//! Grade entity - One exam result for one student.
//!
//! `percentage`, `letter_grade` and `gpa_point` are derived from the marks and
//! are written by `core::grade` on every insert and every marks change.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Grade database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grades")]
pub struct Model {
    /// Unique identifier for the grade
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student the grade belongs to
    pub student_id: i64,
    /// Subject the exam was for
    pub subject_id: i64,
    /// Class the student sat the exam in
    pub class_id: i64,
    /// One of `quiz`, `assignment`, `midterm`, `final`, `project`, `practical`
    pub exam_type: String,
    /// Name of the exam (e.g., "Unit 3 quiz")
    pub exam_name: String,
    /// Maximum attainable marks, always positive
    pub max_marks: f64,
    /// Marks obtained, between 0 and `max_marks`
    pub obtained_marks: f64,
    /// Derived: `obtained_marks / max_marks * 100`, full precision
    pub percentage: f64,
    /// Derived: letter band for `percentage` (e.g., `"B+"`)
    pub letter_grade: String,
    /// Derived: grade point for `letter_grade`
    pub gpa_point: f64,
    /// Date the exam was held
    pub exam_date: Date,
    /// Date the work was handed in, for assignments and projects
    pub submission_date: Option<Date>,
    /// User id of the grading teacher
    pub teacher_id: i64,
    /// Teacher remarks
    pub remarks: Option<String>,
    /// Students only see published grades
    pub is_published: bool,
    /// When the grade was created
    pub created_at: DateTimeUtc,
    /// When the grade was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Grade and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each grade belongs to one subject
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
