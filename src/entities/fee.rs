//! Fee entity - One fee line item owed by a student.
//!
//! `status` is derived from `amount`, `discount`, `paid_amount` and `due_date`
//! by `core::fee::derive_status` and rewritten whenever any of them changes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fee database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fees")]
pub struct Model {
    /// Unique identifier for the fee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student who owes the fee
    pub student_id: i64,
    /// Academic year label (e.g., "2025-2026")
    pub academic_year: String,
    /// One of `tuition`, `library`, `lab`, `sports`, `transport`, `exam`, `admission`, `other`
    pub fee_type: String,
    /// Full amount before discount
    pub amount: f64,
    /// Discount subtracted from `amount`
    pub discount: f64,
    /// Payment deadline
    pub due_date: DateTimeUtc,
    /// Sum of all payments so far; may exceed `amount - discount`
    pub paid_amount: f64,
    /// When the latest payment was recorded
    pub paid_date: Option<DateTimeUtc>,
    /// Derived: `pending`, `partial`, `paid` or `overdue`
    pub status: String,
    /// Method of the latest payment
    pub payment_method: Option<String>,
    /// Gateway or bank reference of the latest payment
    pub transaction_id: Option<String>,
    /// Receipt issued for the latest payment
    pub receipt_number: Option<String>,
    /// Free-form remarks
    pub remarks: Option<String>,
    /// User id of the administrator who raised the fee
    pub created_by: Option<i64>,
    /// When the fee was created
    pub created_at: DateTimeUtc,
    /// When the fee was last modified
    pub updated_at: DateTimeUtc,
}

/// Fees have no modelled relationships; students live outside this crate
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
