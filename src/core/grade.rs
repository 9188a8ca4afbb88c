//! Grade business logic - Marks evaluation, GPA aggregation, and grade persistence.
//!
//! The evaluator is a pure function from marks to percentage, letter grade and
//! grade point. Every write path calls it before touching the database, so the
//! derived columns of a stored grade always agree with its marks.

use crate::{
    core::subject::{CreditLookup, SubjectCredits},
    entities::{Grade, grade},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Select, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Kind of assessment a grade was recorded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    /// Short in-class quiz
    Quiz,
    /// Take-home assignment
    Assignment,
    /// Mid-term exam
    Midterm,
    /// End-of-term exam
    Final,
    /// Project work
    Project,
    /// Lab or practical exam
    Practical,
}

impl ExamType {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Assignment => "assignment",
            Self::Midterm => "midterm",
            Self::Final => "final",
            Self::Project => "project",
            Self::Practical => "practical",
        }
    }
}

impl FromStr for ExamType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "quiz" => Ok(Self::Quiz),
            "assignment" => Ok(Self::Assignment),
            "midterm" => Ok(Self::Midterm),
            "final" => Ok(Self::Final),
            "project" => Ok(Self::Project),
            "practical" => Ok(Self::Practical),
            other => Err(Error::invalid(format!("Unknown exam type '{other}'"))),
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Letter grade bands, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    /// 95% and above
    #[serde(rename = "A+")]
    APlus,
    /// 90% to below 95%
    A,
    /// 85% to below 90%
    #[serde(rename = "B+")]
    BPlus,
    /// 80% to below 85%
    B,
    /// 75% to below 80%
    #[serde(rename = "C+")]
    CPlus,
    /// 70% to below 75%
    C,
    /// 60% to below 70%
    D,
    /// Below 60%
    F,
}

/// Inclusive lower bound of every passing band, descending. Anything below the last bound is an F.
pub const GRADE_BANDS: [(f64, LetterGrade); 7] = [
    (95.0, LetterGrade::APlus),
    (90.0, LetterGrade::A),
    (85.0, LetterGrade::BPlus),
    (80.0, LetterGrade::B),
    (75.0, LetterGrade::CPlus),
    (70.0, LetterGrade::C),
    (60.0, LetterGrade::D),
];

impl LetterGrade {
    /// Maps a percentage to its band.
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        GRADE_BANDS
            .iter()
            .find(|(lower, _)| percentage >= *lower)
            .map_or(Self::F, |(_, grade)| *grade)
    }

    /// Fixed grade-point value of the band.
    #[must_use]
    pub const fn grade_point(self) -> f64 {
        match self {
            Self::APlus => 4.0,
            Self::A => 3.7,
            Self::BPlus => 3.3,
            Self::B => 3.0,
            Self::CPlus => 2.7,
            Self::C => 2.3,
            Self::D => 2.0,
            Self::F => 0.0,
        }
    }

    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl FromStr for LetterGrade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A+" => Ok(Self::APlus),
            "A" => Ok(Self::A),
            "B+" => Ok(Self::BPlus),
            "B" => Ok(Self::B),
            "C+" => Ok(Self::CPlus),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "F" => Ok(Self::F),
            other => Err(Error::invalid(format!("Unknown letter grade '{other}'"))),
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived fields of a grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeEvaluation {
    /// Obtained marks as a percentage of max marks, full precision
    pub percentage: f64,
    /// Band the percentage falls in
    pub letter_grade: LetterGrade,
    /// Grade point of the band
    pub gpa_point: f64,
}

/// Evaluates a pair of marks.
///
/// # Errors
/// [`Error::InvalidInput`] when either value is not finite, `max_marks <= 0`,
/// `obtained_marks < 0`, or `obtained_marks > max_marks`.
pub fn evaluate(obtained_marks: f64, max_marks: f64) -> Result<GradeEvaluation> {
    if !obtained_marks.is_finite() || !max_marks.is_finite() {
        return Err(Error::invalid("Marks must be finite numbers"));
    }
    if max_marks <= 0.0 {
        return Err(Error::invalid(format!(
            "Max marks must be positive (got {max_marks})"
        )));
    }
    if obtained_marks < 0.0 {
        return Err(Error::invalid(format!(
            "Obtained marks cannot be negative (got {obtained_marks})"
        )));
    }
    if obtained_marks > max_marks {
        return Err(Error::invalid(format!(
            "Obtained marks {obtained_marks} exceed max marks {max_marks}"
        )));
    }

    // Multiplying first keeps exact band edges exact (e.g. 19/20 is 95, not 94.999...)
    let percentage = if obtained_marks > f64::MAX / 100.0 {
        obtained_marks / max_marks * 100.0
    } else {
        obtained_marks * 100.0 / max_marks
    };
    let letter_grade = LetterGrade::from_percentage(percentage);

    Ok(GradeEvaluation {
        percentage,
        letter_grade,
        gpa_point: letter_grade.grade_point(),
    })
}

/// Credit-weighted GPA over the published grades in `records`.
///
/// Unpublished grades are skipped. Returns 0.0 when nothing is left to average.
#[must_use]
pub fn aggregate_gpa<L>(records: &[grade::Model], credits: &L) -> f64
where
    L: CreditLookup + ?Sized,
{
    let (weighted_points, total_credits) = records
        .iter()
        .filter(|g| g.is_published)
        .fold((0.0, 0.0), |(points, total), g| {
            let weight = credits.weight_for(g.subject_id);
            (points + g.gpa_point * weight, total + weight)
        });

    if total_credits > 0.0 {
        weighted_points / total_credits
    } else {
        0.0
    }
}

/// Role of the user editing a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorRole {
    /// May edit any grade
    Admin,
    /// May only edit grades they recorded
    Teacher,
}

/// The user performing an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Editor {
    /// User id of the editor
    pub user_id: i64,
    /// Their role
    pub role: EditorRole,
}

/// Details for a new grade. Derived fields are computed on insert.
#[derive(Debug, Clone)]
pub struct NewGrade {
    /// Student being graded
    pub student_id: i64,
    /// Subject of the exam
    pub subject_id: i64,
    /// Class the exam was sat in
    pub class_id: i64,
    /// Kind of exam
    pub exam_type: ExamType,
    /// Exam name
    pub exam_name: String,
    /// Maximum marks
    pub max_marks: f64,
    /// Marks obtained
    pub obtained_marks: f64,
    /// Date of the exam
    pub exam_date: NaiveDate,
    /// Hand-in date, if applicable
    pub submission_date: Option<NaiveDate>,
    /// Grading teacher
    pub teacher_id: i64,
    /// Teacher remarks
    pub remarks: Option<String>,
    /// Publish immediately
    pub is_published: bool,
}

/// Partial update of a grade. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct GradeUpdate {
    /// New obtained marks
    pub obtained_marks: Option<f64>,
    /// New max marks
    pub max_marks: Option<f64>,
    /// New exam type
    pub exam_type: Option<ExamType>,
    /// New exam name
    pub exam_name: Option<String>,
    /// New exam date
    pub exam_date: Option<NaiveDate>,
    /// New remarks
    pub remarks: Option<String>,
    /// New publication flag
    pub is_published: Option<bool>,
}

/// Optional filters for grade listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradeFilter {
    /// Only grades for this subject
    pub subject_id: Option<i64>,
    /// Only grades of this exam type
    pub exam_type: Option<ExamType>,
}

impl GradeFilter {
    fn apply(self, mut query: Select<Grade>) -> Select<Grade> {
        if let Some(subject_id) = self.subject_id {
            query = query.filter(grade::Column::SubjectId.eq(subject_id));
        }
        if let Some(exam_type) = self.exam_type {
            query = query.filter(grade::Column::ExamType.eq(exam_type.as_str()));
        }
        query.order_by_desc(grade::Column::ExamDate)
    }
}

/// A student's published grades with their overall GPA.
#[derive(Debug, Clone)]
pub struct StudentGpa {
    /// Published grades, newest exam first
    pub grades: Vec<grade::Model>,
    /// Credit-weighted GPA across `grades`
    pub gpa: f64,
}

fn validate_exam_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid("Exam name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Records a new grade. Marks are validated and evaluated before anything is written.
pub async fn create_grade(db: &DatabaseConnection, new: NewGrade) -> Result<grade::Model> {
    let exam_name = validate_exam_name(&new.exam_name)?;
    let evaluation = evaluate(new.obtained_marks, new.max_marks)?;

    let now = Utc::now();
    let grade = grade::ActiveModel {
        student_id: Set(new.student_id),
        subject_id: Set(new.subject_id),
        class_id: Set(new.class_id),
        exam_type: Set(new.exam_type.as_str().to_string()),
        exam_name: Set(exam_name),
        max_marks: Set(new.max_marks),
        obtained_marks: Set(new.obtained_marks),
        percentage: Set(evaluation.percentage),
        letter_grade: Set(evaluation.letter_grade.as_str().to_string()),
        gpa_point: Set(evaluation.gpa_point),
        exam_date: Set(new.exam_date),
        submission_date: Set(new.submission_date),
        teacher_id: Set(new.teacher_id),
        remarks: Set(new.remarks),
        is_published: Set(new.is_published),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = grade.insert(db).await?;
    debug!(
        "Recorded grade {} for student {}: {} ({:.2}%)",
        result.id, result.student_id, result.letter_grade, result.percentage
    );
    Ok(result)
}

/// Retrieves a grade by id.
pub async fn get_grade_by_id(db: &DatabaseConnection, grade_id: i64) -> Result<Option<grade::Model>> {
    Grade::find_by_id(grade_id).one(db).await.map_err(Into::into)
}

/// Applies a partial update to a grade and re-evaluates its derived fields.
///
/// Teachers may only edit grades they recorded; admins may edit any grade.
/// Nothing is written if access is denied or the resulting marks are invalid.
pub async fn update_grade(
    db: &DatabaseConnection,
    grade_id: i64,
    editor: Editor,
    update: GradeUpdate,
) -> Result<grade::Model> {
    let existing = get_grade_by_id(db, grade_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "grade",
            id: grade_id,
        })?;

    if editor.role == EditorRole::Teacher && existing.teacher_id != editor.user_id {
        return Err(Error::AccessDenied {
            message: format!(
                "Teacher {} cannot edit grade {} recorded by teacher {}",
                editor.user_id, grade_id, existing.teacher_id
            ),
        });
    }

    let obtained_marks = update.obtained_marks.unwrap_or(existing.obtained_marks);
    let max_marks = update.max_marks.unwrap_or(existing.max_marks);
    let evaluation = evaluate(obtained_marks, max_marks)?;
    let exam_name = update
        .exam_name
        .as_deref()
        .map(validate_exam_name)
        .transpose()?;

    let mut active_model: grade::ActiveModel = existing.into();
    active_model.obtained_marks = Set(obtained_marks);
    active_model.max_marks = Set(max_marks);
    active_model.percentage = Set(evaluation.percentage);
    active_model.letter_grade = Set(evaluation.letter_grade.as_str().to_string());
    active_model.gpa_point = Set(evaluation.gpa_point);
    if let Some(exam_type) = update.exam_type {
        active_model.exam_type = Set(exam_type.as_str().to_string());
    }
    if let Some(exam_name) = exam_name {
        active_model.exam_name = Set(exam_name);
    }
    if let Some(exam_date) = update.exam_date {
        active_model.exam_date = Set(exam_date);
    }
    if let Some(remarks) = update.remarks {
        active_model.remarks = Set(Some(remarks));
    }
    if let Some(is_published) = update.is_published {
        active_model.is_published = Set(is_published);
    }
    active_model.updated_at = Set(Utc::now());

    Ok(active_model.update(db).await?)
}

/// Makes a grade visible to its student.
pub async fn publish_grade(db: &DatabaseConnection, grade_id: i64) -> Result<grade::Model> {
    let existing = get_grade_by_id(db, grade_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "grade",
            id: grade_id,
        })?;

    let mut active_model: grade::ActiveModel = existing.into();
    active_model.is_published = Set(true);
    active_model.updated_at = Set(Utc::now());
    Ok(active_model.update(db).await?)
}

/// Published grades of one student, newest exam first.
pub async fn get_published_grades_for_student(
    db: &DatabaseConnection,
    student_id: i64,
    filter: GradeFilter,
) -> Result<Vec<grade::Model>> {
    let query = Grade::find()
        .filter(grade::Column::StudentId.eq(student_id))
        .filter(grade::Column::IsPublished.eq(true));

    filter.apply(query).all(db).await.map_err(Into::into)
}

/// All grades recorded in a class, published or not, newest exam first.
pub async fn get_grades_for_class(
    db: &DatabaseConnection,
    class_id: i64,
    filter: GradeFilter,
) -> Result<Vec<grade::Model>> {
    let query = Grade::find().filter(grade::Column::ClassId.eq(class_id));
    filter.apply(query).all(db).await.map_err(Into::into)
}

/// A student's published grades and their GPA, weighted by the subject catalogue's credits.
pub async fn student_gpa(
    db: &DatabaseConnection,
    student_id: i64,
    filter: GradeFilter,
) -> Result<StudentGpa> {
    let grades = get_published_grades_for_student(db, student_id, filter).await?;
    let credits = SubjectCredits::load(db).await?;
    let gpa = aggregate_gpa(&grades, &credits);
    Ok(StudentGpa { grades, gpa })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::HashMap;

    fn graded(subject_id: i64, gpa_point: f64, is_published: bool) -> grade::Model {
        let mut model = sample_grade_model(subject_id);
        model.gpa_point = gpa_point;
        model.is_published = is_published;
        model
    }

    #[test]
    fn test_evaluate_examples() -> Result<()> {
        let top = evaluate(95.0, 100.0)?;
        assert_eq!(top.percentage, 95.0);
        assert_eq!(top.letter_grade, LetterGrade::APlus);
        assert_eq!(top.gpa_point, 4.0);

        let fail = evaluate(59.0, 100.0)?;
        assert_eq!(fail.letter_grade, LetterGrade::F);
        assert_eq!(fail.gpa_point, 0.0);

        Ok(())
    }

    #[test]
    fn test_evaluate_band_edges() -> Result<()> {
        let cases = [
            (100.0, LetterGrade::APlus, 4.0),
            (94.99, LetterGrade::A, 3.7),
            (90.0, LetterGrade::A, 3.7),
            (85.0, LetterGrade::BPlus, 3.3),
            (84.9, LetterGrade::B, 3.0),
            (80.0, LetterGrade::B, 3.0),
            (75.0, LetterGrade::CPlus, 2.7),
            (70.0, LetterGrade::C, 2.3),
            (69.5, LetterGrade::D, 2.0),
            (60.0, LetterGrade::D, 2.0),
            (0.0, LetterGrade::F, 0.0),
        ];

        for (obtained, letter, point) in cases {
            let evaluation = evaluate(obtained, 100.0)?;
            assert_eq!(evaluation.letter_grade, letter, "marks {obtained}");
            assert_eq!(evaluation.gpa_point, point, "marks {obtained}");
        }

        // Non-100 max marks landing exactly on a band edge
        assert_eq!(evaluate(19.0, 20.0)?.letter_grade, LetterGrade::APlus);
        assert_eq!(evaluate(3.0, 5.0)?.letter_grade, LetterGrade::D);

        Ok(())
    }

    #[test]
    fn test_evaluate_huge_marks_stay_finite() -> Result<()> {
        let full = evaluate(1e307, 1e307)?;
        assert_eq!(full.percentage, 100.0);
        assert_eq!(full.letter_grade, LetterGrade::APlus);

        let half = evaluate(f64::MAX / 2.0, f64::MAX)?;
        assert!(half.percentage.is_finite());
        assert_eq!(half.percentage, 50.0);
        assert_eq!(half.letter_grade, LetterGrade::F);

        Ok(())
    }

    #[test]
    fn test_evaluate_rejects_invalid_marks() {
        for (obtained, max) in [
            (10.0, 0.0),
            (10.0, -5.0),
            (-1.0, 100.0),
            (101.0, 100.0),
            (f64::NAN, 100.0),
            (50.0, f64::INFINITY),
        ] {
            assert!(
                matches!(evaluate(obtained, max), Err(Error::InvalidInput { .. })),
                "({obtained}, {max}) should be rejected"
            );
        }
    }

    #[test]
    fn test_letter_grade_round_trips_through_storage() -> Result<()> {
        for (_, letter) in GRADE_BANDS {
            assert_eq!(letter.as_str().parse::<LetterGrade>()?, letter);
        }
        assert!("E".parse::<LetterGrade>().is_err());
        assert_eq!("midterm".parse::<ExamType>()?, ExamType::Midterm);
        assert!("homework".parse::<ExamType>().is_err());
        Ok(())
    }

    #[test]
    fn test_aggregate_gpa_empty_is_zero() {
        let credits: HashMap<i64, i32> = HashMap::new();
        assert_eq!(aggregate_gpa(&[], &credits), 0.0);
    }

    #[test]
    fn test_aggregate_gpa_weights_by_credits() {
        let mut credits: HashMap<i64, i32> = HashMap::new();
        credits.insert(1, 3);
        credits.insert(2, 1);

        let records = vec![graded(1, 4.0, true), graded(2, 2.0, true)];
        // (4.0*3 + 2.0*1) / 4
        assert!((aggregate_gpa(&records, &credits) - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_gpa_ignores_unpublished_and_defaults_credit() {
        let credits: HashMap<i64, i32> = HashMap::new();
        let records = vec![
            graded(7, 3.0, true),
            graded(8, 2.0, true),
            graded(9, 4.0, false),
        ];
        assert!((aggregate_gpa(&records, &credits) - 2.5).abs() < 1e-9);

        let only_unpublished = vec![graded(9, 4.0, false)];
        assert_eq!(aggregate_gpa(&only_unpublished, &credits), 0.0);
    }

    #[tokio::test]
    async fn test_create_grade_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut new = test_new_grade(1, 120.0, 100.0);
        let result = create_grade(&db, new.clone()).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        new.obtained_marks = 50.0;
        new.exam_name = "   ".to_string();
        let result = create_grade(&db, new).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_grade_materializes_derived_fields() -> Result<()> {
        let (db, subject) = setup_with_subject().await?;

        let grade = create_grade(&db, test_new_grade(subject.id, 43.0, 50.0)).await?;
        assert_eq!(grade.percentage, 86.0);
        assert_eq!(grade.letter_grade, "B+");
        assert_eq!(grade.gpa_point, 3.3);
        assert_eq!(grade.exam_type, "midterm");
        assert!(!grade.is_published);

        let stored = get_grade_by_id(&db, grade.id).await?.unwrap();
        assert_eq!(stored, grade);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_grade_recomputes() -> Result<()> {
        let (db, subject) = setup_with_subject().await?;
        let grade = create_grade(&db, test_new_grade(subject.id, 43.0, 50.0)).await?;

        let owner = Editor {
            user_id: TEST_TEACHER_ID,
            role: EditorRole::Teacher,
        };
        let updated = update_grade(
            &db,
            grade.id,
            owner,
            GradeUpdate {
                obtained_marks: Some(25.0),
                remarks: Some("Re-marked".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.obtained_marks, 25.0);
        assert_eq!(updated.max_marks, 50.0);
        assert_eq!(updated.percentage, 50.0);
        assert_eq!(updated.letter_grade, "F");
        assert_eq!(updated.gpa_point, 0.0);
        assert_eq!(updated.remarks.as_deref(), Some("Re-marked"));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_grade_invalid_marks_writes_nothing() -> Result<()> {
        let (db, subject) = setup_with_subject().await?;
        let grade = create_grade(&db, test_new_grade(subject.id, 43.0, 50.0)).await?;

        let admin = Editor {
            user_id: 1,
            role: EditorRole::Admin,
        };
        let result = update_grade(
            &db,
            grade.id,
            admin,
            GradeUpdate {
                max_marks: Some(40.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        let stored = get_grade_by_id(&db, grade.id).await?.unwrap();
        assert_eq!(stored, grade);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_grade_access_rules() -> Result<()> {
        let (db, subject) = setup_with_subject().await?;
        let grade = create_grade(&db, test_new_grade(subject.id, 43.0, 50.0)).await?;

        let other_teacher = Editor {
            user_id: TEST_TEACHER_ID + 1,
            role: EditorRole::Teacher,
        };
        let result = update_grade(&db, grade.id, other_teacher, GradeUpdate::default()).await;
        assert!(matches!(result.unwrap_err(), Error::AccessDenied { .. }));

        let admin = Editor {
            user_id: 1,
            role: EditorRole::Admin,
        };
        let updated = update_grade(
            &db,
            grade.id,
            admin,
            GradeUpdate {
                is_published: Some(true),
                ..Default::default()
            },
        )
        .await?;
        assert!(updated.is_published);

        let result = update_grade(&db, 999, admin, GradeUpdate::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "grade",
                id: 999
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_published_grades_and_gpa() -> Result<()> {
        let db = setup_test_db().await?;
        let math = create_test_subject(&db, "MATH101", 3).await?;
        let art = create_test_subject(&db, "ART100", 1).await?;

        // A+ in math (3 credits), C in art (1 credit), unpublished A in art
        let mut first = test_new_grade(math.id, 96.0, 100.0);
        first.is_published = true;
        create_grade(&db, first).await?;

        let mut second = test_new_grade(art.id, 72.0, 100.0);
        second.is_published = true;
        second.exam_type = ExamType::Quiz;
        create_grade(&db, second).await?;

        let hidden = create_grade(&db, test_new_grade(art.id, 91.0, 100.0)).await?;

        let result = student_gpa(&db, TEST_STUDENT_ID, GradeFilter::default()).await?;
        assert_eq!(result.grades.len(), 2);
        // (4.0*3 + 2.3*1) / 4
        assert!((result.gpa - 3.575).abs() < 1e-9);

        let quizzes = get_published_grades_for_student(
            &db,
            TEST_STUDENT_ID,
            GradeFilter {
                exam_type: Some(ExamType::Quiz),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].subject_id, art.id);

        let class_grades = get_grades_for_class(&db, TEST_CLASS_ID, GradeFilter::default()).await?;
        assert_eq!(class_grades.len(), 3);

        publish_grade(&db, hidden.id).await?;
        let result = student_gpa(&db, TEST_STUDENT_ID, GradeFilter::default()).await?;
        assert_eq!(result.grades.len(), 3);
        // (4.0*3 + 2.3*1 + 3.7*1) / 5
        assert!((result.gpa - 3.6).abs() < 1e-9);

        Ok(())
    }

    #[tokio::test]
    async fn test_student_gpa_without_grades_is_zero() -> Result<()> {
        let db = setup_test_db().await?;
        let result = student_gpa(&db, TEST_STUDENT_ID, GradeFilter::default()).await?;
        assert!(result.grades.is_empty());
        assert_eq!(result.gpa, 0.0);
        Ok(())
    }
}
