//! Fee ledger business logic - Status derivation, payments, and fee summaries.
//!
//! A fee's status is never assigned directly. It is re-derived from the amount,
//! discount, paid amount and due date every time one of them changes, and by the
//! maintenance sweep when the passage of time alone makes a fee overdue.
//! Payments accumulate; an overpayment is kept in `paid_amount` as credit.

use crate::{
    entities::{Fee, fee},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Derived lifecycle label of a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeStatus {
    /// Nothing paid, not yet due
    Pending,
    /// Something paid, less than the amount due
    Partial,
    /// Paid in full (or more)
    Paid,
    /// Nothing paid and past the due date
    Overdue,
}

impl FeeStatus {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }
}

impl FromStr for FeeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "partial" => Ok(Self::Partial),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            other => Err(Error::invalid(format!("Unknown fee status '{other}'"))),
        }
    }
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a fee is charged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    /// Tuition
    Tuition,
    /// Library membership
    Library,
    /// Laboratory usage
    Lab,
    /// Sports activities
    Sports,
    /// School transport
    Transport,
    /// Examination fee
    Exam,
    /// One-off admission fee
    Admission,
    /// Anything else
    Other,
}

impl FeeType {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tuition => "tuition",
            Self::Library => "library",
            Self::Lab => "lab",
            Self::Sports => "sports",
            Self::Transport => "transport",
            Self::Exam => "exam",
            Self::Admission => "admission",
            Self::Other => "other",
        }
    }
}

impl FromStr for FeeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tuition" => Ok(Self::Tuition),
            "library" => Ok(Self::Library),
            "lab" => Ok(Self::Lab),
            "sports" => Ok(Self::Sports),
            "transport" => Ok(Self::Transport),
            "exam" => Ok(Self::Exam),
            "admission" => Ok(Self::Admission),
            "other" => Ok(Self::Other),
            other => Err(Error::invalid(format!("Unknown fee type '{other}'"))),
        }
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash at the office
    Cash,
    /// Debit or credit card
    Card,
    /// Bank transfer
    BankTransfer,
    /// Cheque
    Cheque,
    /// Online payment gateway
    Online,
}

impl PaymentMethod {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
            Self::Cheque => "cheque",
            Self::Online => "online",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "bank_transfer" => Ok(Self::BankTransfer),
            "cheque" => Ok(Self::Cheque),
            "online" => Ok(Self::Online),
            other => Err(Error::invalid(format!("Unknown payment method '{other}'"))),
        }
    }
}

/// Rounds a money amount to whole cents.
fn cents(amount: f64) -> f64 {
    (amount * 100.0).round()
}

/// Derives the status of a fee.
///
/// Amounts are compared in whole cents.
///
/// - `Paid` when `paid_amount >= amount - discount`
/// - otherwise `Overdue` when nothing is paid and `now` is past `due_date`
/// - otherwise `Pending` when nothing is paid
/// - otherwise `Partial`
#[must_use]
pub fn derive_status(
    amount: f64,
    discount: f64,
    paid_amount: f64,
    due_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> FeeStatus {
    let amount_due = cents(amount - discount);
    let paid = cents(paid_amount);

    if paid >= amount_due {
        FeeStatus::Paid
    } else if paid <= 0.0 {
        if now > due_date {
            FeeStatus::Overdue
        } else {
            FeeStatus::Pending
        }
    } else {
        FeeStatus::Partial
    }
}

/// Derives the status of a stored fee at `now`.
#[must_use]
pub fn status_of(fee: &fee::Model, now: DateTime<Utc>) -> FeeStatus {
    derive_status(fee.amount, fee.discount, fee.paid_amount, fee.due_date, now)
}

/// A single payment against a fee.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    /// Amount paid; must be positive
    pub amount: f64,
    /// Payment method
    pub method: Option<PaymentMethod>,
    /// Gateway or bank reference
    pub transaction_id: Option<String>,
    /// Receipt issued
    pub receipt_number: Option<String>,
}

impl Payment {
    /// A payment with no method or references.
    #[must_use]
    pub const fn of(amount: f64) -> Self {
        Self {
            amount,
            method: None,
            transaction_id: None,
            receipt_number: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.amount.is_finite() && self.amount > 0.0 {
            Ok(())
        } else {
            Err(Error::InvalidPayment {
                amount: self.amount,
            })
        }
    }
}

/// Applies a payment to a fee, returning the updated record.
///
/// `paid_amount` accumulates without being capped, `paid_date` becomes `now`,
/// the payment details replace the previous ones, and the status is re-derived.
///
/// # Errors
/// [`Error::InvalidPayment`] when the amount is not a positive finite number.
pub fn apply_payment(
    mut fee: fee::Model,
    payment: &Payment,
    now: DateTime<Utc>,
) -> Result<fee::Model> {
    payment.validate()?;

    fee.paid_amount += payment.amount;
    fee.paid_date = Some(now);
    fee.payment_method = payment.method.map(|m| m.as_str().to_string());
    fee.transaction_id.clone_from(&payment.transaction_id);
    fee.receipt_number.clone_from(&payment.receipt_number);
    fee.status = status_of(&fee, now).as_str().to_string();
    fee.updated_at = now;

    Ok(fee)
}

/// Totals over a set of fees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSummary {
    /// Sum of fee amounts
    pub total_amount: f64,
    /// Sum of paid amounts
    pub total_paid: f64,
    /// `total_amount - total_paid`; negative when fees are overpaid
    pub total_pending: f64,
}

/// Sums amounts and payments over `fees`.
///
/// Discounts are not subtracted from `total_amount`.
#[must_use]
pub fn summarize(fees: &[fee::Model]) -> FeeSummary {
    let (total_amount, total_paid) = fees
        .iter()
        .fold((0.0, 0.0), |(amount, paid), f| (amount + f.amount, paid + f.paid_amount));

    FeeSummary {
        total_amount,
        total_paid,
        total_pending: total_amount - total_paid,
    }
}

/// Details for a new fee.
#[derive(Debug, Clone)]
pub struct NewFee {
    /// Student who owes the fee
    pub student_id: i64,
    /// Academic year label
    pub academic_year: String,
    /// Kind of fee
    pub fee_type: FeeType,
    /// Full amount
    pub amount: f64,
    /// Discount off the full amount
    pub discount: f64,
    /// Payment deadline
    pub due_date: DateTime<Utc>,
    /// Free-form remarks
    pub remarks: Option<String>,
    /// Administrator raising the fee
    pub created_by: Option<i64>,
}

/// Edits to the terms of a fee. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct FeeTermsUpdate {
    /// New full amount
    pub amount: Option<f64>,
    /// New discount
    pub discount: Option<f64>,
    /// New deadline
    pub due_date: Option<DateTime<Utc>>,
    /// New remarks
    pub remarks: Option<String>,
}

fn validate_money(label: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "{label} must be a non-negative number (got {value})"
        )))
    }
}

fn validate_terms(amount: f64, discount: f64) -> Result<()> {
    validate_money("Amount", amount)?;
    validate_money("Discount", discount)?;
    if discount > amount {
        return Err(Error::invalid(format!(
            "Discount {discount} exceeds amount {amount}"
        )));
    }
    Ok(())
}

/// Raises a new fee with nothing paid; its initial status is derived at `now`.
pub async fn create_fee(
    db: &DatabaseConnection,
    new: NewFee,
    now: DateTime<Utc>,
) -> Result<fee::Model> {
    let academic_year = new.academic_year.trim().to_string();
    if academic_year.is_empty() {
        return Err(Error::invalid("Academic year cannot be empty"));
    }
    validate_terms(new.amount, new.discount)?;

    let status = derive_status(new.amount, new.discount, 0.0, new.due_date, now);
    let fee = fee::ActiveModel {
        student_id: Set(new.student_id),
        academic_year: Set(academic_year),
        fee_type: Set(new.fee_type.as_str().to_string()),
        amount: Set(new.amount),
        discount: Set(new.discount),
        due_date: Set(new.due_date),
        paid_amount: Set(0.0),
        paid_date: Set(None),
        status: Set(status.as_str().to_string()),
        payment_method: Set(None),
        transaction_id: Set(None),
        receipt_number: Set(None),
        remarks: Set(new.remarks),
        created_by: Set(new.created_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(fee.insert(db).await?)
}

/// Retrieves a fee by id.
pub async fn get_fee_by_id(db: &DatabaseConnection, fee_id: i64) -> Result<Option<fee::Model>> {
    Fee::find_by_id(fee_id).one(db).await.map_err(Into::into)
}

/// Records a payment against a stored fee.
///
/// The read, [`apply_payment`] and write happen in one database transaction.
pub async fn record_payment(
    db: &DatabaseConnection,
    fee_id: i64,
    payment: Payment,
    now: DateTime<Utc>,
) -> Result<fee::Model> {
    payment.validate()?;

    let txn = db.begin().await?;

    let existing = Fee::find_by_id(fee_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "fee",
            id: fee_id,
        })?;
    let old_status = existing.status.clone();
    let updated = apply_payment(existing.clone(), &payment, now)?;

    let mut active_model: fee::ActiveModel = existing.into();
    active_model.paid_amount = Set(updated.paid_amount);
    active_model.paid_date = Set(updated.paid_date);
    active_model.payment_method = Set(updated.payment_method);
    active_model.transaction_id = Set(updated.transaction_id);
    active_model.receipt_number = Set(updated.receipt_number);
    active_model.status = Set(updated.status);
    active_model.updated_at = Set(updated.updated_at);
    let result = active_model.update(&txn).await?;

    txn.commit().await?;

    info!(
        "Recorded payment of {:.2} on fee {}: paid {:.2} of {:.2}, {} -> {}",
        payment.amount,
        fee_id,
        result.paid_amount,
        result.amount - result.discount,
        old_status,
        result.status
    );
    Ok(result)
}

/// Changes the amount, discount or due date of a fee and re-derives its status.
///
/// A paid fee whose amount is raised goes back to partial (or pending/overdue if
/// nothing was ever paid).
pub async fn update_fee_terms(
    db: &DatabaseConnection,
    fee_id: i64,
    update: FeeTermsUpdate,
    now: DateTime<Utc>,
) -> Result<fee::Model> {
    if let Some(amount) = update.amount {
        validate_money("Amount", amount)?;
    }
    if let Some(discount) = update.discount {
        validate_money("Discount", discount)?;
    }

    let txn = db.begin().await?;

    let existing = Fee::find_by_id(fee_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "fee",
            id: fee_id,
        })?;

    let amount = update.amount.unwrap_or(existing.amount);
    let discount = update.discount.unwrap_or(existing.discount);
    let due_date = update.due_date.unwrap_or(existing.due_date);
    validate_terms(amount, discount)?;
    let status = derive_status(amount, discount, existing.paid_amount, due_date, now);

    let old_status = existing.status.clone();
    let mut active_model: fee::ActiveModel = existing.into();
    active_model.amount = Set(amount);
    active_model.discount = Set(discount);
    active_model.due_date = Set(due_date);
    active_model.status = Set(status.as_str().to_string());
    if let Some(remarks) = update.remarks {
        active_model.remarks = Set(Some(remarks));
    }
    active_model.updated_at = Set(now);
    let result = active_model.update(&txn).await?;

    txn.commit().await?;

    if old_status != result.status {
        info!("Fee {} status {} -> {}", fee_id, old_status, result.status);
    }
    Ok(result)
}

/// Optional filters for fee listings.
#[derive(Debug, Clone, Default)]
pub struct FeeFilter {
    /// Only this academic year
    pub academic_year: Option<String>,
    /// Only fees whose stored status is this
    pub status: Option<FeeStatus>,
}

/// A student's fees with their totals.
#[derive(Debug, Clone)]
pub struct FeeStatement {
    /// Matching fees, latest due date first
    pub fees: Vec<fee::Model>,
    /// Totals over `fees`
    pub summary: FeeSummary,
}

/// Fees of one student, latest due date first.
pub async fn get_fees_for_student(
    db: &DatabaseConnection,
    student_id: i64,
    filter: &FeeFilter,
) -> Result<Vec<fee::Model>> {
    let mut query = Fee::find().filter(fee::Column::StudentId.eq(student_id));
    if let Some(year) = &filter.academic_year {
        query = query.filter(fee::Column::AcademicYear.eq(year.as_str()));
    }
    if let Some(status) = filter.status {
        query = query.filter(fee::Column::Status.eq(status.as_str()));
    }

    query
        .order_by_desc(fee::Column::DueDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fees of one student together with their [`FeeSummary`].
pub async fn get_fee_statement(
    db: &DatabaseConnection,
    student_id: i64,
    filter: &FeeFilter,
) -> Result<FeeStatement> {
    let fees = get_fees_for_student(db, student_id, filter).await?;
    let summary = summarize(&fees);
    Ok(FeeStatement { fees, summary })
}
