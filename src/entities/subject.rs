//! Subject entity - The subject catalogue.
//!
//! Subjects carry the credit weight used when grade points are averaged
//! into a GPA. Codes are stored upper-cased and are unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subject database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subjects")]
pub struct Model {
    /// Unique identifier for the subject
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Mathematics")
    pub name: String,
    /// Short upper-case code (e.g., "MATH101")
    #[sea_orm(unique)]
    pub code: String,
    /// Free-form description
    pub description: Option<String>,
    /// Credit weight for GPA aggregation
    pub credits: i32,
    /// Owning department, if any
    pub department: Option<String>,
    /// Grade level the subject is taught at (e.g., "10")
    pub grade_level: String,
    /// Core subject (true) or elective (false)
    pub is_core: bool,
    /// Inactive subjects are kept for history but not offered
    pub is_active: bool,
}

/// Defines relationships between Subject and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One subject has many grades
    #[sea_orm(has_many = "super::grade::Entity")]
    Grades,
    /// One subject has many attendance records
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
}

impl Related<super::grade::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grades.def()
    }
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
