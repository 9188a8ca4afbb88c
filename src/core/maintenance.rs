//! Fee status sweep
//!
//! A fee with nothing paid turns overdue when its due date passes, without any
//! write touching it. The sweep re-derives every stored status at a given time
//! and rewrites the ones that changed. It records the date it last ran in the
//! `system_state` table so that it runs at most once per day.

use crate::{
    core::fee::status_of,
    entities::{Fee, SystemState, fee, system_state},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{debug, info};

const LAST_FEE_SWEEP_KEY: &str = "last_fee_status_sweep";

/// A fee whose stored status changed during a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Fee id
    pub fee_id: i64,
    /// Student owing the fee
    pub student_id: i64,
    /// Status before the sweep
    pub old_status: String,
    /// Status after the sweep
    pub new_status: String,
}

/// Result of one sweep.
#[derive(Debug, Clone)]
pub struct SweepResult {
    /// Number of fees examined
    pub examined: usize,
    /// Fees whose status was rewritten
    pub changes: Vec<StatusChange>,
    /// Date the sweep ran for
    pub sweep_date: NaiveDate,
}

/// Retrieves the date of the last sweep, if any.
pub async fn get_last_sweep_date<C>(db: &C) -> Result<Option<NaiveDate>>
where
    C: ConnectionTrait,
{
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_FEE_SWEEP_KEY))
        .one(db)
        .await?;

    match state {
        Some(s) => NaiveDate::parse_from_str(&s.value, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| {
                Error::invalid(format!(
                    "Stored sweep date '{}' is not a valid date: {e}",
                    s.value
                ))
            }),
        None => Ok(None),
    }
}

async fn set_last_sweep_date<C>(db: &C, date: NaiveDate, now: DateTime<Utc>) -> Result<()>
where
    C: ConnectionTrait,
{
    let date_str = date.format("%Y-%m-%d").to_string();

    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_FEE_SWEEP_KEY))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set(date_str);
        active_model.updated_at = Set(now.naive_utc());
        active_model.update(db).await?;
    } else {
        let new_state = system_state::ActiveModel {
            key: Set(LAST_FEE_SWEEP_KEY.to_string()),
            value: Set(date_str),
            updated_at: Set(now.naive_utc()),
            ..Default::default()
        };
        new_state.insert(db).await?;
    }

    Ok(())
}

/// Returns true if no sweep has run yet on `now`'s calendar day.
pub async fn is_sweep_needed(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<bool> {
    let today = now.date_naive();
    Ok(get_last_sweep_date(db)
        .await?
        .is_none_or(|last| last < today))
}

/// Re-derives the status of every fee at `now` and rewrites those that changed.
///
/// All rewrites and the sweep date are committed in one transaction.
pub async fn refresh_fee_statuses(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<SweepResult> {
    let txn = db.begin().await?;

    let fees = Fee::find().all(&txn).await?;
    let examined = fees.len();
    let mut changes = Vec::new();

    for existing in fees {
        let derived = status_of(&existing, now);
        if existing.status == derived.as_str() {
            continue;
        }

        debug!(
            "Fee {} status {} -> {}",
            existing.id, existing.status, derived
        );
        let change = StatusChange {
            fee_id: existing.id,
            student_id: existing.student_id,
            old_status: existing.status.clone(),
            new_status: derived.as_str().to_string(),
        };

        let mut active_model: fee::ActiveModel = existing.into();
        active_model.status = Set(change.new_status.clone());
        active_model.updated_at = Set(now);
        active_model.update(&txn).await?;

        changes.push(change);
    }

    let sweep_date = now.date_naive();
    set_last_sweep_date(&txn, sweep_date, now).await?;
    txn.commit().await?;

    info!(
        "Fee status sweep for {}: examined {}, updated {}",
        sweep_date,
        examined,
        changes.len()
    );

    Ok(SweepResult {
        examined,
        changes,
        sweep_date,
    })
}

/// Runs [`refresh_fee_statuses`] unless it already ran today.
pub async fn run_daily_sweep(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<Option<SweepResult>> {
    if !is_sweep_needed(db, now).await? {
        debug!("Fee status sweep already ran today");
        return Ok(None);
    }
    refresh_fee_statuses(db, now).await.map(Some)
}
