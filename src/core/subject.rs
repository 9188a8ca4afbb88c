//! Subject catalogue - Subject lookups, credit weights, and seeding from config.toml.
//!
//! The catalogue doubles as the credit-lookup service used by GPA aggregation:
//! a subject's credit count weights every grade recorded against it.

use crate::{
    config::school::Config,
    entities::{Subject, subject},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info};

/// Maps subject ids to credit weights.
///
/// Unknown subjects and non-positive credit counts weigh 1.
pub trait CreditLookup {
    /// Returns the raw credit count recorded for a subject, if any.
    fn credits_for(&self, subject_id: i64) -> Option<i32>;

    /// Returns the weight to apply to a grade in this subject.
    fn weight_for(&self, subject_id: i64) -> f64 {
        match self.credits_for(subject_id) {
            Some(credits) if credits > 0 => f64::from(credits),
            _ => 1.0,
        }
    }
}

impl CreditLookup for HashMap<i64, i32> {
    fn credits_for(&self, subject_id: i64) -> Option<i32> {
        self.get(&subject_id).copied()
    }
}

/// Credit weights for every subject in the catalogue.
#[derive(Debug, Clone, Default)]
pub struct SubjectCredits {
    credits: HashMap<i64, i32>,
}

impl SubjectCredits {
    /// Loads the credit count of every subject, active or not, so that
    /// historical grades keep their weight.
    pub async fn load<C>(db: &C) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        let credits = Subject::find()
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s.credits))
            .collect();
        Ok(Self { credits })
    }
}

impl CreditLookup for SubjectCredits {
    fn credits_for(&self, subject_id: i64) -> Option<i32> {
        self.credits.get(&subject_id).copied()
    }
}

/// Details for a new subject.
#[derive(Debug, Clone)]
pub struct NewSubject {
    /// Display name
    pub name: String,
    /// Subject code, upper-cased before insert
    pub code: String,
    /// Free-form description
    pub description: Option<String>,
    /// Credit weight
    pub credits: i32,
    /// Owning department
    pub department: Option<String>,
    /// Grade level taught at
    pub grade_level: String,
    /// Core (true) or elective (false)
    pub is_core: bool,
}

/// Creates a subject after trimming the name and upper-casing the code.
pub async fn create_subject(db: &DatabaseConnection, new: NewSubject) -> Result<subject::Model> {
    let name = new.name.trim().to_string();
    let code = new.code.trim().to_uppercase();

    if name.is_empty() {
        return Err(Error::invalid("Subject name cannot be empty"));
    }
    if code.is_empty() {
        return Err(Error::invalid("Subject code cannot be empty"));
    }
    if new.credits < 0 {
        return Err(Error::invalid(format!(
            "Subject credits cannot be negative (got {})",
            new.credits
        )));
    }

    let subject = subject::ActiveModel {
        name: Set(name),
        code: Set(code),
        description: Set(new.description),
        credits: Set(new.credits),
        department: Set(new.department),
        grade_level: Set(new.grade_level),
        is_core: Set(new.is_core),
        is_active: Set(true),
        ..Default::default()
    };

    Ok(subject.insert(db).await?)
}

/// Finds a subject by code; the lookup is case-insensitive because codes are stored upper-cased.
pub async fn get_subject_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<subject::Model>> {
    Subject::find()
        .filter(subject::Column::Code.eq(code.trim().to_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists active subjects ordered by code.
pub async fn get_active_subjects(db: &DatabaseConnection) -> Result<Vec<subject::Model>> {
    Subject::find()
        .filter(subject::Column::IsActive.eq(true))
        .order_by_asc(subject::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts every subject from the configuration whose code is not yet in the catalogue.
///
/// Returns the number of subjects inserted. Existing subjects are left untouched,
/// so re-running against the same config is a no-op.
pub async fn seed_subjects(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    info!(
        "Seeding subjects. Found {} configurations.",
        config.subjects.len()
    );
    let mut inserted = 0;

    for cfg in &config.subjects {
        if get_subject_by_code(db, &cfg.code).await?.is_some() {
            debug!("Subject '{}' already exists, skipping", cfg.code);
            continue;
        }

        create_subject(
            db,
            NewSubject {
                name: cfg.name.clone(),
                code: cfg.code.clone(),
                description: None,
                credits: cfg.credits,
                department: cfg.department.clone(),
                grade_level: cfg.grade_level.clone(),
                is_core: cfg.is_core,
            },
        )
        .await?;
        inserted += 1;
    }

    info!("Seeded {} new subjects", inserted);
    Ok(inserted)
}
